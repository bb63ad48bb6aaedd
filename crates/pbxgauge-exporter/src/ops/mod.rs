//! Operational HTTP endpoints.
//!
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::obs::{render_text, TEXT_CONTENT_TYPE};

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = render_text(&state.registry().snapshot());

    (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body).into_response()
}
