use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;

use crate::auth::AdminAccess;
use crate::client_ip::ClientIp;
use crate::error::AppError;
use crate::state::SharedState;
use crate::submission::pipeline::{self, Outcome};
use crate::submission::parser;

pub async fn create(
    State(state): State<SharedState>,
    ClientIp(client_ip): ClientIp,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let raw_data = if content_type.is_some_and(|ct| ct.contains("multipart/form-data")) {
        parser::parse_multipart(&headers, body)
            .await
            .map_err(AppError::BadRequest)?
    } else {
        parser::parse_body(content_type, &body).map_err(AppError::BadRequest)?
    };

    let outcome = pipeline::run(&state, client_ip, raw_data).await?;

    // Plain HTML forms get sent back to the site instead of a JSON body
    if let Some(ref url) = state.config.redirect_url {
        if content_type.is_some_and(|ct| ct.contains("form")) {
            return Ok(Redirect::to(url).into_response());
        }
    }

    match outcome {
        Outcome::Spam => Ok((StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()),
        Outcome::Created(created) => Ok((
            StatusCode::CREATED,
            Json(json!({
                "status": "created",
                "id": created.id,
                "created_at": created.created_at,
            })),
        )
            .into_response()),
    }
}

pub async fn list(
    _admin: AdminAccess,
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let submissions = state.store.list_all().await?;

    Ok(Json(json!({
        "count": submissions.len(),
        "submissions": submissions,
    })))
}
