pub mod extractor;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub use extractor::AdminAccess;

/// The admin shared secret, held as a SHA-256 digest.
///
/// Candidates are hashed before comparison so the check runs in constant time
/// with respect to both the content and the length of the secret.
#[derive(Clone)]
pub struct AdminKey {
    digest: [u8; 32],
}

impl AdminKey {
    pub fn new(secret: &str) -> Self {
        Self {
            digest: Sha256::digest(secret.as_bytes()).into(),
        }
    }

    pub fn verify(&self, candidate: &str) -> bool {
        let candidate: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        self.digest[..].ct_eq(&candidate[..]).into()
    }
}

impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminKey(..)")
    }
}
