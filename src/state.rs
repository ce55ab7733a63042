use std::sync::Arc;

use crate::auth::AdminKey;
use crate::config::Config;
use crate::db::SharedStore;
use crate::rate_limit::SubmissionRateLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: SharedStore,
    pub config: Config,
    pub admin_key: AdminKey,
    pub submission_limiter: SubmissionRateLimiter,
}
