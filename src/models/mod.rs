pub mod submission;

pub use submission::{Created, NewSubmission, Submission, SubmissionId};
