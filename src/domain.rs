//! Domain models: usage types, generated questions, and batch validation.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Present-perfect usage subcategory a quiz batch is generated for.
/// `Mixed` asks the generator to cover all four.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageType {
  Experience,
  Continuation,
  Completion,
  Result,
  Mixed,
}

impl UsageType {
  pub const ALL: [UsageType; 5] = [
    UsageType::Experience,
    UsageType::Continuation,
    UsageType::Completion,
    UsageType::Result,
    UsageType::Mixed,
  ];

  /// Label as shown to students (Korean + English), matching the controlled
  /// vocabulary the generator uses for the per-question `usageType` field.
  pub fn label(self) -> &'static str {
    match self {
      UsageType::Experience => "경험 (Experience)",
      UsageType::Continuation => "계속 (Continuation)",
      UsageType::Completion => "완료 (Completion)",
      UsageType::Result => "결과 (Result)",
      UsageType::Mixed => "종합 (Mixed)",
    }
  }

  /// Prompt-side expansion: a mixed batch must cover every subcategory.
  pub fn prompt_clause(self) -> String {
    match self {
      UsageType::Mixed => {
        "Mixed — include a mix of Experience (경험), Continuation (계속), \
         Completion (완료), and Result (결과)"
          .into()
      }
      other => other.label().to_string(),
    }
  }
}

impl fmt::Display for UsageType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// One generated quiz item. Wire format is camelCase, as produced by the
/// generator and consumed by the frontend. Immutable once accepted; the whole
/// batch is discarded when a new quiz starts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub id: String,
  /// The question sentence, often with a blank.
  pub text: String,
  /// Exactly 4 distinct candidate strings.
  pub options: Vec<String>,
  /// Must equal one of `options` (string equality).
  pub correct_answer: String,
  /// Rationale in Korean, shown after answering.
  pub explanation: String,
  /// One of: 경험, 계속, 완료, 결과.
  pub usage_type: String,
  pub korean_translation: String,
}

impl Question {
  /// Check the per-question invariants the schema asks of the model but the
  /// model does not always honor.
  pub fn validate(&self) -> Result<(), String> {
    if self.id.trim().is_empty() {
      return Err("missing id".into());
    }
    for (name, value) in [
      ("text", &self.text),
      ("correctAnswer", &self.correct_answer),
      ("explanation", &self.explanation),
      ("usageType", &self.usage_type),
      ("koreanTranslation", &self.korean_translation),
    ] {
      if value.trim().is_empty() {
        return Err(format!("empty field '{}'", name));
      }
    }
    if self.options.len() != 4 {
      return Err(format!("expected 4 options, got {}", self.options.len()));
    }
    if self.options.iter().any(|o| o.trim().is_empty()) {
      return Err("empty option".into());
    }
    let distinct: HashSet<&str> = self.options.iter().map(String::as_str).collect();
    if distinct.len() != self.options.len() {
      return Err("duplicate options".into());
    }
    if !self.options.contains(&self.correct_answer) {
      return Err("correctAnswer is not one of the options".into());
    }
    Ok(())
  }
}

/// Validate a parsed generation batch before it is accepted into a session.
/// A violation anywhere rejects the whole batch: better a clean failure than
/// scoring against a broken answer key.
pub fn validate_batch(questions: &[Question]) -> Result<(), GenerationError> {
  if questions.is_empty() {
    return Err(GenerationError::MalformedResponse("the model returned no questions".into()));
  }
  let mut seen_ids = HashSet::new();
  for (i, q) in questions.iter().enumerate() {
    q.validate()
      .map_err(|reason| GenerationError::MalformedResponse(format!("question {}: {}", i + 1, reason)))?;
    if !seen_ids.insert(q.id.as_str()) {
      return Err(GenerationError::MalformedResponse(format!("duplicate question id '{}'", q.id)));
    }
  }
  Ok(())
}

#[cfg(test)]
pub(crate) fn sample_question(id: &str) -> Question {
  Question {
    id: id.to_string(),
    text: "She ___ in Seoul since 2019.".into(),
    options: vec!["lives".into(), "has lived".into(), "lived".into(), "is living".into()],
    correct_answer: "has lived".into(),
    explanation: "'since 2019'는 계속 용법과 함께 쓰입니다.".into(),
    usage_type: "계속".into(),
    korean_translation: "그녀는 2019년부터 서울에 살고 있다.".into(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn well_formed_question_passes() {
    assert!(sample_question("q1").validate().is_ok());
  }

  #[test]
  fn wrong_option_count_is_rejected() {
    let mut q = sample_question("q1");
    q.options.pop();
    assert!(q.validate().unwrap_err().contains("4 options"));
  }

  #[test]
  fn answer_outside_options_is_rejected() {
    let mut q = sample_question("q1");
    q.correct_answer = "will live".into();
    assert!(q.validate().unwrap_err().contains("not one of the options"));
  }

  #[test]
  fn duplicate_options_are_rejected() {
    let mut q = sample_question("q1");
    q.options[3] = q.options[0].clone();
    assert!(q.validate().unwrap_err().contains("duplicate"));
  }

  #[test]
  fn empty_batch_is_malformed() {
    let err = validate_batch(&[]).unwrap_err();
    assert!(matches!(err, GenerationError::MalformedResponse(_)));
  }

  #[test]
  fn batch_with_repeated_ids_is_rejected() {
    let batch = vec![sample_question("q1"), sample_question("q1")];
    let err = validate_batch(&batch).unwrap_err();
    assert!(err.to_string().contains("duplicate question id"));
  }

  #[test]
  fn mixed_prompt_clause_names_all_subcategories() {
    let clause = UsageType::Mixed.prompt_clause();
    for tag in ["경험", "계속", "완료", "결과"] {
      assert!(clause.contains(tag), "missing {tag}");
    }
  }
}
