//! HTTP endpoint handlers. Thin wrappers over the phase-gated state methods.
//!
//! A command that is illegal in the current phase gets a 409 with a message
//! and changes nothing; a failed generation is NOT an HTTP error — it shows up
//! as the `failed` phase in the returned snapshot, message intact.

use std::sync::Arc;

use axum::{
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info")]
pub async fn http_get_usage_types() -> impl IntoResponse {
  Json(usage_types_out())
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.snapshot().await)
}

#[instrument(level = "info", skip(state, body), fields(count = body.count, usage = %body.usage_type))]
pub async fn http_post_start(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartIn>,
) -> Response {
  if let Err(message) = state.start_quiz(body.count, body.usage_type, body.key.as_deref()).await {
    return rejected(message);
  }
  let snapshot = state.snapshot().await;
  info!(target: "quiz", count = body.count, usage = %body.usage_type, "HTTP quiz start handled");
  Json(snapshot).into_response()
}

#[instrument(level = "info", skip(state, body), fields(answer_len = body.option.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Response {
  match state.submit_answer(&body.option).await {
    Ok((record, score)) => Json(answer_out(record, score)).into_response(),
    Err(message) => rejected(message),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_next(State(state): State<Arc<AppState>>) -> Response {
  match state.advance().await {
    Ok(()) => Json(state.snapshot().await).into_response(),
    Err(message) => rejected(message),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_restart(State(state): State<Arc<AppState>>) -> Response {
  match state.restart().await {
    Ok(()) => Json(state.snapshot().await).into_response(),
    Err(message) => rejected(message),
  }
}

fn rejected(message: String) -> Response {
  (StatusCode::CONFLICT, Json(ErrorOut { message })).into_response()
}
