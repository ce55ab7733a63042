use std::net::IpAddr;

use serde_json::Value;

use crate::db::StorageError;
use crate::error::AppError;
use crate::models::{Created, NewSubmission};
use crate::state::SharedState;

use super::honeypot;
use super::validation::{self, ContactForm};

#[derive(Debug)]
pub enum Outcome {
    Created(Created),
    /// Honeypot tripped: acknowledged to the client, nothing stored.
    Spam,
}

pub async fn run(state: &SharedState, client_ip: IpAddr, raw_data: Value) -> Result<Outcome, AppError> {
    if honeypot::is_spam(&raw_data, state.config.honeypot_field.as_deref()) {
        tracing::info!(%client_ip, "Honeypot triggered, submission discarded");
        return Ok(Outcome::Spam);
    }

    let form = ContactForm::from_value(&raw_data);
    let new = accept(&form)?;

    // Only submissions that would be stored count against the client's budget
    state
        .submission_limiter
        .check(client_ip)
        .map_err(AppError::RateLimited)?;

    // Run the insert on its own task so a client disconnect cannot cancel it
    // half way through.
    let store = state.store.clone();
    let created = tokio::spawn(async move { store.insert(&new).await })
        .await
        .map_err(|e| StorageError::Query(format!("Insert task failed: {e}")))??;

    tracing::info!(id = %created.id, "Submission stored");
    Ok(Outcome::Created(created))
}

/// Validate the form and produce the trimmed values to persist.
pub fn accept(form: &ContactForm) -> Result<NewSubmission, AppError> {
    let result = validation::validate(
        form.name.as_deref(),
        form.email.as_deref(),
        form.message.as_deref(),
    );
    if !result.is_valid() {
        return Err(AppError::Validation(result.errors));
    }

    let trimmed = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_string();

    Ok(NewSubmission {
        name: trimmed(&form.name),
        email: trimmed(&form.email),
        message: trimmed(&form.message),
    })
}
