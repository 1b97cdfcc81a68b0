use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chatcore::{
    models::ui::UIMessage,
    protocol::decode_stream,
    reconcile::{StreamState, StreamingMessage},
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ReconcileResponse {
    message: UIMessage,
    state: StreamState,
    /// Lines that could not be decoded
    skipped: usize,
}

async fn reconcile_handler(State(state): State<AppState>, body: String) -> Response {
    let lines = body.lines().count();
    if lines > state.limits.max_stream_lines {
        tracing::warn!(
            lines,
            limit = state.limits.max_stream_lines,
            "stream body over line limit"
        );
        return StatusCode::PAYLOAD_TOO_LARGE.into_response();
    }

    let mut streaming = StreamingMessage::generate();
    let mut skipped = 0;

    for event in decode_stream(&body) {
        match event {
            Ok(event) => {
                streaming.apply(event);
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping undecodable stream line");
                skipped += 1;
            }
        }
    }

    let state = streaming.state();
    Json(ReconcileResponse {
        message: streaming.into_message(),
        state,
        skipped,
    })
    .into_response()
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/stream/reconcile", post(reconcile_handler))
        .with_state(state)
}
