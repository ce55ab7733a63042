use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::audit::{self, AdminOutcome};
use crate::client_ip::ClientIp;
use crate::error::AppError;
use crate::state::SharedState;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";
pub const ADMIN_KEY_QUERY: &str = "clave";

/// Proof that the caller presented the admin shared secret.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

impl FromRequestParts<SharedState> for AdminAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(ClientIp(ip)) = ClientIp::from_request_parts(parts, state).await;

        let outcome = match credential(parts) {
            None => AdminOutcome::MissingCredential,
            Some(candidate) if state.admin_key.verify(&candidate) => AdminOutcome::Granted,
            Some(_) => AdminOutcome::InvalidCredential,
        };

        audit::log_admin_access(ip, outcome);

        match outcome {
            AdminOutcome::Granted => Ok(AdminAccess),
            _ => Err(AppError::Forbidden),
        }
    }
}

/// Header first, then the `clave` query parameter. Empty values count as absent.
fn credential(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(ADMIN_KEY_HEADER) {
        return value
            .to_str()
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string());
    }

    let query = parts.uri.query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == ADMIN_KEY_QUERY)
        .map(|(_, value)| value.into_owned())
        .filter(|v| !v.is_empty())
}
