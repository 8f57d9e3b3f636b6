//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Question, UsageType};
use crate::session::{feedback_for, AnswerRecord, QuizPhase};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    GetState,
    StartQuiz {
        #[serde(default = "default_count")]
        count: u32,
        #[serde(rename = "usageType")]
        usage_type: UsageType,
        /// `key`/`apiKey` forwarded from the page URL; last credential source.
        #[serde(default, alias = "apiKey")]
        key: Option<String>,
    },
    SubmitAnswer {
        option: String,
    },
    Next,
    Restart,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    State {
        state: StateOut,
    },
    AnswerResult {
        result: AnswerOut,
    },
    Error {
        message: String,
    },
}

/// Phase snapshot DTO shared by WS and HTTP. Tagged union mirroring the
/// internal phase machine, with payload only where the phase has one.
#[derive(Debug, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum StateOut {
    Start,
    #[serde(rename_all = "camelCase")]
    Loading { count: u32, usage_type: UsageType },
    #[serde(rename_all = "camelCase")]
    Active {
        question: QuestionOut,
        current_index: usize,
        total: usize,
        score: u32,
        answered: bool,
    },
    #[serde(rename_all = "camelCase")]
    Finished {
        score: u32,
        total: usize,
        percentage: f64,
        feedback: &'static str,
    },
    Failed { message: String },
}

/// Current question as shown before answering. The correct answer and the
/// explanation are withheld until the answer endpoint reveals them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOut {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub usage_type: String,
    pub korean_translation: String,
}

/// Reveal payload returned on (idempotent) answer submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOut {
    pub question_id: String,
    pub selected: String,
    pub correct: bool,
    pub correct_answer: String,
    pub explanation: String,
    pub score: u32,
}

pub fn question_out(q: &Question) -> QuestionOut {
    QuestionOut {
        id: q.id.clone(),
        text: q.text.clone(),
        options: q.options.clone(),
        usage_type: q.usage_type.clone(),
        korean_translation: q.korean_translation.clone(),
    }
}

pub fn answer_out(record: AnswerRecord, score: u32) -> AnswerOut {
    AnswerOut {
        question_id: record.question_id,
        selected: record.selected,
        correct: record.correct,
        correct_answer: record.correct_answer,
        explanation: record.explanation,
        score,
    }
}

/// Convert the internal phase to the public snapshot DTO.
pub fn snapshot_of(phase: &QuizPhase) -> StateOut {
    match phase {
        QuizPhase::Start => StateOut::Start,
        QuizPhase::Loading { count, usage } => StateOut::Loading { count: *count, usage_type: *usage },
        QuizPhase::Active(session) => StateOut::Active {
            question: question_out(session.current_question()),
            current_index: session.current_index(),
            total: session.total(),
            score: session.score(),
            answered: session.current_answered(),
        },
        QuizPhase::Finished(session) => {
            let percentage = session.percentage();
            StateOut::Finished {
                score: session.score(),
                total: session.total(),
                percentage,
                feedback: feedback_for(percentage),
            }
        }
        QuizPhase::Failed { message } => StateOut::Failed { message: message.clone() },
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartIn {
    #[serde(default = "default_count")]
    pub count: u32,
    pub usage_type: UsageType,
    /// `key`/`apiKey` forwarded from the page URL; last credential source.
    #[serde(default, alias = "apiKey")]
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    pub option: String,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// One selectable usage type for the start screen.
#[derive(Serialize)]
pub struct UsageTypeOut {
    pub id: UsageType,
    pub label: &'static str,
}

pub fn usage_types_out() -> Vec<UsageTypeOut> {
    UsageType::ALL.iter().map(|u| UsageTypeOut { id: *u, label: u.label() }).collect()
}

pub fn default_count() -> u32 {
    5
}
