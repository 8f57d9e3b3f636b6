//! Minimal Gemini client for our use-case.
//!
//! We only call models.generateContent, always declaring the output as a strict
//! JSON array constrained by a response schema. Calls are instrumented and log
//! model name, latency, and response sizes (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::credentials::resolve_api_key;
use crate::domain::{validate_batch, Question, UsageType};
use crate::error::GenerationError;
use crate::util::{fill_template, strip_code_fence, trunc_for_log};

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub base_url: String,
  pub model: String,
}

impl Gemini {
  /// Build the client from env. The API key is deliberately NOT resolved here:
  /// it may arrive per-request via the page URL, so lookup happens on each
  /// `generate_questions` call instead.
  pub fn from_env() -> Self {
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .unwrap_or_else(|_| reqwest::Client::new());

    Self { client, base_url, model }
  }

  /// Generate `count` questions for `usage`. `url_key` is the `key`/`apiKey`
  /// URL parameter the client forwards, the last source in the credential
  /// chain. One request, no automatic retry: every failure surfaces.
  #[instrument(level = "info", skip(self, prompts, usage, url_key), fields(%usage, model = %self.model))]
  pub async fn generate_questions(
    &self,
    prompts: &Prompts,
    count: u32,
    usage: UsageType,
    url_key: Option<&str>,
  ) -> Result<Vec<Question>, GenerationError> {
    // Credential lookup must precede any network traffic.
    let api_key = resolve_api_key(url_key)?;

    let user = fill_template(
      &prompts.quiz_user_template,
      &[("count", &count.to_string()), ("usage", &usage.prompt_clause())],
    );

    let req = GenerateContentRequest {
      system_instruction: Some(ContentReq::text(&prompts.quiz_system)),
      contents: vec![ContentReq::text(&user)],
      generation_config: GenerationConfig {
        response_mime_type: "application/json".into(),
        response_schema: question_array_schema(),
      },
    };

    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
    let start = std::time::Instant::now();
    let res = self
      .client
      .post(&url)
      .query(&[("key", api_key.as_str())])
      .header(USER_AGENT, "grammar-master-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&req)
      .send()
      .await
      .map_err(|e| GenerationError::ProviderUnavailable(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_gemini_error(&body).unwrap_or(body);
      error!(%status, error = %trunc_for_log(&msg, 200), "Gemini call failed");
      if is_auth_failure(status, &msg) {
        return Err(GenerationError::InvalidCredential);
      }
      return Err(GenerationError::ProviderUnavailable(format!("Gemini HTTP {}: {}", status, msg)));
    }

    let body: GenerateContentResponse =
      res.json().await.map_err(|e| GenerationError::ProviderUnavailable(e.to_string()))?;
    if let Some(um) = &body.usage_metadata {
      info!(
        prompt_tokens = ?um.prompt_token_count,
        candidate_tokens = ?um.candidates_token_count,
        total_tokens = ?um.total_token_count,
        "Gemini usage"
      );
    }

    let text = body
      .candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .and_then(|c| c.parts.first())
      .and_then(|p| p.text.clone())
      .unwrap_or_default();

    let questions = parse_question_batch(&text)?;
    info!(elapsed = ?start.elapsed(), n = questions.len(), response_bytes = text.len(), "Question batch accepted");
    Ok(questions)
  }
}

/// Normalize raw model text and parse it as a question batch.
/// Kept separate from the network path so it can be unit-tested.
pub fn parse_question_batch(raw: &str) -> Result<Vec<Question>, GenerationError> {
  if raw.trim().is_empty() {
    return Err(GenerationError::EmptyResponse);
  }
  let inner = strip_code_fence(raw);
  let questions: Vec<Question> =
    serde_json::from_str(inner).map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
  validate_batch(&questions)?;
  Ok(questions)
}

/// Was the failure an authorization problem (rather than a generic outage)?
/// Gemini reports bad keys either via 401/403 or a 400 with an invalid-key body.
fn is_auth_failure(status: StatusCode, message: &str) -> bool {
  status == StatusCode::UNAUTHORIZED
    || status == StatusCode::FORBIDDEN
    || message.contains("API key not valid")
    || message.contains("API_KEY_INVALID")
}

/// Response schema biasing/constraining the model output: an array of 7-field
/// question objects with exactly 4 option strings.
fn question_array_schema() -> serde_json::Value {
  json!({
    "type": "ARRAY",
    "items": {
      "type": "OBJECT",
      "properties": {
        "id": { "type": "STRING" },
        "text": { "type": "STRING", "description": "The question sentence, often with a blank." },
        "options": {
          "type": "ARRAY",
          "items": { "type": "STRING" },
          "minItems": 4,
          "maxItems": 4,
          "description": "4 multiple choice options."
        },
        "correctAnswer": { "type": "STRING", "description": "The exact string of the correct option." },
        "explanation": { "type": "STRING", "description": "Explanation in Korean why the answer is correct." },
        "usageType": { "type": "STRING", "description": "One of: 경험, 계속, 완료, 결과" },
        "koreanTranslation": { "type": "STRING", "description": "Korean translation of the question sentence." }
      },
      "required": ["id", "text", "options", "correctAnswer", "explanation", "usageType", "koreanTranslation"]
    }
  })
}

// --- Gemini DTOs ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
  #[serde(skip_serializing_if = "Option::is_none")]
  system_instruction: Option<ContentReq>,
  contents: Vec<ContentReq>,
  generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct ContentReq {
  parts: Vec<PartReq>,
}
impl ContentReq {
  fn text(s: &str) -> Self {
    Self { parts: vec![PartReq { text: s.to_string() }] }
  }
}

#[derive(Serialize)]
struct PartReq {
  text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  response_mime_type: String,
  response_schema: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(default)]
  usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct Candidate {
  #[serde(default)]
  content: Option<ContentResp>,
}
#[derive(Deserialize)]
struct ContentResp {
  #[serde(default)]
  parts: Vec<PartResp>,
}
#[derive(Deserialize)]
struct PartResp {
  #[serde(default)]
  text: Option<String>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)]
  prompt_token_count: Option<u32>,
  #[serde(default)]
  candidates_token_count: Option<u32>,
  #[serde(default)]
  total_token_count: Option<u32>,
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::sample_question;

  fn batch_json() -> String {
    serde_json::to_string(&vec![sample_question("q1"), sample_question("q2")]).expect("serialize")
  }

  #[test]
  fn plain_json_batch_parses() {
    let qs = parse_question_batch(&batch_json()).expect("parse");
    assert_eq!(qs.len(), 2);
    assert_eq!(qs[0].id, "q1");
  }

  #[test]
  fn fenced_batch_parses_identically_to_plain() {
    let plain = parse_question_batch(&batch_json()).expect("plain");
    let fenced = parse_question_batch(&format!("```json\n{}\n```", batch_json())).expect("fenced");
    assert_eq!(plain.len(), fenced.len());
    assert_eq!(plain[1].text, fenced[1].text);
  }

  #[test]
  fn empty_text_is_empty_response() {
    assert!(matches!(parse_question_batch("   \n"), Err(GenerationError::EmptyResponse)));
  }

  #[test]
  fn non_json_text_is_malformed() {
    let err = parse_question_batch("Sure! Here are your questions:").unwrap_err();
    assert!(matches!(err, GenerationError::MalformedResponse(_)));
  }

  #[test]
  fn invariant_violations_are_malformed() {
    let mut q = sample_question("q1");
    q.correct_answer = "not an option".into();
    let raw = serde_json::to_string(&vec![q]).expect("serialize");
    let err = parse_question_batch(&raw).unwrap_err();
    assert!(err.to_string().contains("not one of the options"));
  }

  #[test]
  fn auth_failures_are_detected_from_status_and_body() {
    assert!(is_auth_failure(StatusCode::FORBIDDEN, ""));
    assert!(is_auth_failure(StatusCode::BAD_REQUEST, "API key not valid. Please pass a valid API key."));
    assert!(!is_auth_failure(StatusCode::INTERNAL_SERVER_ERROR, "backend overloaded"));
  }

  #[test]
  fn error_body_message_is_extracted() {
    let body = r#"{"error": {"code": 403, "message": "PERMISSION_DENIED", "status": "PERMISSION_DENIED"}}"#;
    assert_eq!(extract_gemini_error(body).as_deref(), Some("PERMISSION_DENIED"));
  }
}
