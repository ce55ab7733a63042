use std::net::IpAddr;

/// Outcome of an attempt to read the admin listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    Granted,
    MissingCredential,
    InvalidCredential,
}

impl AdminOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            AdminOutcome::Granted => "granted",
            AdminOutcome::MissingCredential => "missing_credential",
            AdminOutcome::InvalidCredential => "invalid_credential",
        }
    }
}

/// Record an admin access attempt. The supplied credential is never logged.
pub fn log_admin_access(ip: IpAddr, outcome: AdminOutcome) {
    match outcome {
        AdminOutcome::Granted => {
            tracing::info!(target: "audit", client_ip = %ip, outcome = outcome.as_str(), "admin listing accessed");
        }
        AdminOutcome::MissingCredential | AdminOutcome::InvalidCredential => {
            tracing::warn!(target: "audit", client_ip = %ip, outcome = outcome.as_str(), "admin listing denied");
        }
    }
}
