//! Application state: the phase-gated quiz flow, prompts, and Gemini client.
//!
//! This module owns:
//!   - the quiz phase (single session, behind a tokio RwLock)
//!   - the prompts struct (from TOML or defaults)
//!   - the Gemini client
//!
//! Commands arriving in a phase where they are not legal are rejected with a
//! message and leave the phase untouched. That gating is also what keeps at
//! most one generation request in flight: a new quiz can only start from the
//! Start phase, and restart is only accepted from Finished or Failed.

use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::config::{load_quiz_config_from_env, Prompts};
use crate::gemini::Gemini;
use crate::protocol::{snapshot_of, StateOut};
use crate::session::{AnswerRecord, QuizPhase, QuizSession};
use crate::domain::UsageType;

pub struct AppState {
    pub phase: RwLock<QuizPhase>,
    pub gemini: Gemini,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load config (or defaults), init the Gemini client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let prompts = load_quiz_config_from_env().map(|c| c.prompts).unwrap_or_default();
        let gemini = Gemini::from_env();
        info!(target: "grammar_master", base_url = %gemini.base_url, model = %gemini.model, "Gemini client ready");
        Self { phase: RwLock::new(QuizPhase::Start), gemini, prompts }
    }

    /// Public snapshot of the current phase.
    pub async fn snapshot(&self) -> StateOut {
        snapshot_of(&*self.phase.read().await)
    }

    /// Start a quiz: Start -> Loading -> (Active | Failed).
    ///
    /// The phase lock is not held across the provider call; the Loading phase
    /// itself blocks every other command until the outcome is written, and the
    /// generation future is always awaited to completion first.
    #[instrument(level = "info", skip(self, usage, url_key), fields(%usage))]
    pub async fn start_quiz(
        &self,
        count: u32,
        usage: UsageType,
        url_key: Option<&str>,
    ) -> Result<(), String> {
        {
            let mut phase = self.phase.write().await;
            match &*phase {
                QuizPhase::Start => {}
                other => return Err(format!("cannot start a quiz while {}", other.tag())),
            }
            *phase = QuizPhase::Loading { count, usage };
        }

        let outcome = self.gemini.generate_questions(&self.prompts, count, usage, url_key).await;

        let mut phase = self.phase.write().await;
        match outcome {
            Ok(questions) => {
                info!(target: "quiz", n = questions.len(), %usage, "Quiz session started");
                *phase = QuizPhase::Active(QuizSession::new(questions));
            }
            Err(e) => {
                // Every error kind lands here; the message is surfaced verbatim.
                error!(target: "quiz", error = %e, "Question generation failed");
                *phase = QuizPhase::Failed { message: e.to_string() };
            }
        }
        Ok(())
    }

    /// Record an answer for the current question (idempotent per question).
    /// Returns the standing record plus the score after the call.
    #[instrument(level = "info", skip(self, selected), fields(answer_len = selected.len()))]
    pub async fn submit_answer(&self, selected: &str) -> Result<(AnswerRecord, u32), String> {
        let mut phase = self.phase.write().await;
        match &mut *phase {
            QuizPhase::Active(session) => {
                let record = session.submit_answer(selected);
                info!(target: "quiz", question = %record.question_id, correct = record.correct, score = session.score(), "Answer recorded");
                Ok((record, session.score()))
            }
            other => Err(format!("cannot answer while {}", other.tag())),
        }
    }

    /// Advance to the next question, or finish the quiz after the last one.
    #[instrument(level = "info", skip(self))]
    pub async fn advance(&self) -> Result<(), String> {
        let mut phase = self.phase.write().await;
        let finished = match &mut *phase {
            QuizPhase::Active(session) => {
                if session.advance() {
                    return Ok(());
                }
                session.clone()
            }
            other => return Err(format!("cannot advance while {}", other.tag())),
        };
        info!(target: "quiz", score = finished.score(), total = finished.total(), "Quiz finished");
        *phase = QuizPhase::Finished(finished);
        Ok(())
    }

    /// Discard all session state. Only legal from a terminal phase.
    #[instrument(level = "info", skip(self))]
    pub async fn restart(&self) -> Result<(), String> {
        let mut phase = self.phase.write().await;
        match &*phase {
            QuizPhase::Finished(_) | QuizPhase::Failed { .. } => {
                info!(target: "quiz", from = phase.tag(), "Session reset");
                *phase = QuizPhase::Start;
                Ok(())
            }
            other => Err(format!("cannot restart while {}", other.tag())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample_question;

    fn active_state(n: usize) -> AppState {
        let state = AppState::new();
        let questions = (0..n).map(|i| sample_question(&format!("q{i}"))).collect();
        *state.phase.try_write().expect("fresh lock") = QuizPhase::Active(QuizSession::new(questions));
        state
    }

    #[tokio::test]
    async fn commands_are_rejected_outside_their_phase() {
        let state = AppState::new();
        assert!(state.submit_answer("x").await.is_err());
        assert!(state.advance().await.is_err());
        assert!(state.restart().await.is_err());
        assert!(matches!(state.snapshot().await, StateOut::Start));
    }

    #[tokio::test]
    async fn start_is_refused_mid_quiz_and_leaves_the_phase_alone() {
        let state = active_state(2);
        let err = state.start_quiz(5, UsageType::Mixed, None).await.unwrap_err();
        assert!(err.contains("active"));
        assert!(matches!(&*state.phase.read().await, QuizPhase::Active(_)));
    }

    #[tokio::test]
    async fn advancing_past_the_last_question_finishes() {
        let state = active_state(2);
        state.submit_answer(&sample_question("x").correct_answer).await.expect("answer");
        state.advance().await.expect("advance");
        state.submit_answer("wrong").await.expect("answer");
        state.advance().await.expect("advance");
        match state.snapshot().await {
            StateOut::Finished { score, total, percentage, .. } => {
                assert_eq!((score, total), (1, 2));
                assert_eq!(percentage, 50.0);
            }
            other => panic!("expected finished, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_generation_maps_into_failed_phase() {
        // No credential in any source: generation fails before any network
        // call, and the error message surfaces verbatim in the failed phase.
        for name in ["GEMINI_API_KEY", "API_KEY", "VITE_GEMINI_API_KEY", "VITE_API_KEY"] {
            std::env::remove_var(name);
        }
        let state = AppState::new();
        state.start_quiz(5, UsageType::Mixed, None).await.expect("start accepted");
        match state.snapshot().await {
            StateOut::Failed { message } => assert!(message.contains("Gemini API key not found")),
            other => panic!("expected failed, got {other:?}"),
        }
        state.restart().await.expect("restart from failed");
    }

    #[tokio::test]
    async fn restart_resets_terminal_phases_to_start() {
        let state = active_state(1);
        state.advance().await.expect("finish");
        state.restart().await.expect("restart from finished");
        assert!(matches!(state.snapshot().await, StateOut::Start));

        *state.phase.write().await = QuizPhase::Failed { message: "boom".into() };
        state.restart().await.expect("restart from failed");
        assert!(matches!(state.snapshot().await, StateOut::Start));
    }
}
