pub mod messages;

use axum::Router;
use axum::routing::get;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new().route(
        "/api/mensajes",
        get(messages::list).post(messages::create),
    )
}
