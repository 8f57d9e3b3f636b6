//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to the phase-gated state methods. One JSON reply per request.

use std::sync::Arc;

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::protocol::{answer_out, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "grammar_master", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "grammar_master", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target = "grammar_master", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "grammar_master", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "grammar_master", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::GetState => ServerWsMessage::State { state: state.snapshot().await },

    ClientWsMessage::StartQuiz { count, usage_type, key } => {
      match state.start_quiz(count, usage_type, key.as_deref()).await {
        Ok(()) => {
          tracing::info!(target: "quiz", count, usage = %usage_type, "WS quiz start handled");
          ServerWsMessage::State { state: state.snapshot().await }
        }
        Err(message) => ServerWsMessage::Error { message },
      }
    }

    ClientWsMessage::SubmitAnswer { option } => match state.submit_answer(&option).await {
      Ok((record, score)) => {
        tracing::info!(target: "quiz", question = %record.question_id, correct = record.correct, "WS answer evaluated");
        ServerWsMessage::AnswerResult { result: answer_out(record, score) }
      }
      Err(message) => ServerWsMessage::Error { message },
    },

    ClientWsMessage::Next => match state.advance().await {
      Ok(()) => ServerWsMessage::State { state: state.snapshot().await },
      Err(message) => ServerWsMessage::Error { message },
    },

    ClientWsMessage::Restart => match state.restart().await {
      Ok(()) => ServerWsMessage::State { state: state.snapshot().await },
      Err(message) => ServerWsMessage::Error { message },
    },
  }
}
