//! Quiz session state machine: phases, per-question records, scoring.
//!
//! A session is created fresh each time a generation batch is accepted and
//! replaced wholesale on restart. The machine itself permits advancing past an
//! unanswered question; keeping the "answer first" rule is a presentation-layer
//! concern, and the frontend disables its Next button accordingly.

use std::collections::HashMap;

use crate::domain::{Question, UsageType};

/// One quiz run over a fixed question batch.
///
/// Invariants:
///   - `answers` and `correctness` always share the same key set
///   - `score` equals the number of `true` entries in `correctness`
///   - `current_index` never leaves `0..questions.len()`
#[derive(Clone, Debug)]
pub struct QuizSession {
  questions: Vec<Question>,
  current_index: usize,
  score: u32,
  answers: HashMap<String, String>,
  correctness: HashMap<String, bool>,
}

/// What the first (and only effective) submission for a question recorded.
#[derive(Clone, Debug)]
pub struct AnswerRecord {
  pub question_id: String,
  pub selected: String,
  pub correct: bool,
  pub correct_answer: String,
  pub explanation: String,
}

impl QuizSession {
  /// `questions` must be non-empty; the provider's batch validation guarantees
  /// this before a session is built.
  pub fn new(questions: Vec<Question>) -> Self {
    debug_assert!(!questions.is_empty());
    Self {
      questions,
      current_index: 0,
      score: 0,
      answers: HashMap::new(),
      correctness: HashMap::new(),
    }
  }

  pub fn current_question(&self) -> &Question {
    &self.questions[self.current_index]
  }

  pub fn current_index(&self) -> usize {
    self.current_index
  }

  pub fn total(&self) -> usize {
    self.questions.len()
  }

  pub fn score(&self) -> u32 {
    self.score
  }

  /// Has the question at the current index been answered yet?
  pub fn current_answered(&self) -> bool {
    self.answers.contains_key(&self.current_question().id)
  }

  /// Number of `true` entries in the correctness map. Always equals `score`.
  #[allow(dead_code)]
  pub fn correct_count(&self) -> usize {
    self.correctness.values().filter(|c| **c).count()
  }

  #[allow(dead_code)]
  pub fn answered_count(&self) -> usize {
    self.answers.len()
  }

  /// Record `selected` for the current question and return what now stands.
  /// A question can only be answered once per session: repeat submissions,
  /// with the same option or another, are no-ops returning the first record.
  pub fn submit_answer(&mut self, selected: &str) -> AnswerRecord {
    let q = self.questions[self.current_index].clone();
    if !self.answers.contains_key(&q.id) {
      let correct = selected == q.correct_answer;
      self.answers.insert(q.id.clone(), selected.to_string());
      self.correctness.insert(q.id.clone(), correct);
      if correct {
        self.score += 1;
      }
    }
    AnswerRecord {
      question_id: q.id.clone(),
      selected: self.answers[&q.id].clone(),
      correct: self.correctness[&q.id],
      correct_answer: q.correct_answer,
      explanation: q.explanation,
    }
  }

  /// Move to the next question. Returns false when already on the last one,
  /// leaving the index in range; the caller transitions to `Finished`.
  pub fn advance(&mut self) -> bool {
    if self.current_index + 1 < self.questions.len() {
      self.current_index += 1;
      true
    } else {
      false
    }
  }

  /// Score as a display percentage. Internally the score stays exact
  /// (count/total); this is derived only at the presentation edge.
  pub fn percentage(&self) -> f64 {
    self.score as f64 / self.questions.len() as f64 * 100.0
  }
}

/// Application phase. Session data is carried only in the phases where it
/// means something; `Failed` carries just the surfaced message.
#[derive(Clone, Debug)]
pub enum QuizPhase {
  Start,
  Loading { count: u32, usage: UsageType },
  Active(QuizSession),
  Finished(QuizSession),
  Failed { message: String },
}

impl QuizPhase {
  pub fn tag(&self) -> &'static str {
    match self {
      QuizPhase::Start => "start",
      QuizPhase::Loading { .. } => "loading",
      QuizPhase::Active(_) => "active",
      QuizPhase::Finished(_) => "finished",
      QuizPhase::Failed { .. } => "failed",
    }
  }
}

/// Feedback band for the result screen. Four non-overlapping bands with
/// inclusive lower boundaries, as on the original result card.
pub fn feedback_for(percentage: f64) -> &'static str {
  if percentage >= 100.0 {
    "완벽해요! 현재완료 마스터시군요! 🎉"
  } else if percentage >= 80.0 {
    "아주 잘했어요! 조금만 더 하면 만점! 👍"
  } else if percentage >= 60.0 {
    "잘하고 있어요! 틀린 문제를 다시 확인해보세요. 💪"
  } else {
    "괜찮아요! 다시 한번 복습해볼까요? 🌱"
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::sample_question;

  fn batch(n: usize) -> Vec<Question> {
    (0..n).map(|i| sample_question(&format!("q{i}"))).collect()
  }

  fn correct_option() -> String {
    sample_question("x").correct_answer
  }

  #[test]
  fn fresh_session_starts_at_zero() {
    let s = QuizSession::new(batch(5));
    assert_eq!(s.current_index(), 0);
    assert_eq!(s.score(), 0);
    assert_eq!(s.answered_count(), 0);
    assert!(!s.current_answered());
  }

  #[test]
  fn correct_answer_increments_score() {
    let mut s = QuizSession::new(batch(5));
    let rec = s.submit_answer(&correct_option());
    assert!(rec.correct);
    assert_eq!(s.score(), 1);
    assert_eq!(s.current_index(), 0, "submitting must not advance");
  }

  #[test]
  fn submit_is_idempotent_per_question() {
    let mut s = QuizSession::new(batch(3));
    let first = s.submit_answer("lives");
    assert!(!first.correct);
    // Second submission with the right option changes nothing.
    let second = s.submit_answer(&correct_option());
    assert_eq!(second.selected, "lives");
    assert!(!second.correct);
    assert_eq!(s.score(), 0);
    assert_eq!(s.answered_count(), 1);
  }

  #[test]
  fn score_always_matches_correctness_count() {
    let mut s = QuizSession::new(batch(4));
    s.submit_answer(&correct_option());
    s.advance();
    s.submit_answer("wrong");
    s.advance();
    s.submit_answer(&correct_option());
    assert_eq!(s.score() as usize, s.correct_count());
  }

  #[test]
  fn advance_past_last_question_reports_finished() {
    let mut s = QuizSession::new(batch(2));
    assert!(s.advance());
    assert!(!s.advance(), "last question: no further advance");
    assert_eq!(s.current_index(), 1, "index stays in range");
  }

  #[test]
  fn advancing_an_unanswered_question_is_permitted() {
    let mut s = QuizSession::new(batch(3));
    assert!(s.advance());
    assert_eq!(s.current_index(), 1);
    assert_eq!(s.answered_count(), 0);
  }

  #[test]
  fn five_question_run_scores_sixty_percent() {
    let mut s = QuizSession::new(batch(5));
    for i in 0..5 {
      if i < 3 {
        s.submit_answer(&correct_option());
      } else {
        s.submit_answer("lived");
      }
      let more = s.advance();
      assert_eq!(more, i < 4);
    }
    assert_eq!(s.score(), 3);
    assert_eq!(s.percentage(), 60.0);
    assert_eq!(feedback_for(s.percentage()), feedback_for(60.0));
  }

  #[test]
  fn feedback_bands_are_boundary_inclusive() {
    assert_eq!(feedback_for(100.0), "완벽해요! 현재완료 마스터시군요! 🎉");
    assert_eq!(feedback_for(80.0), "아주 잘했어요! 조금만 더 하면 만점! 👍");
    assert_eq!(feedback_for(60.0), "잘하고 있어요! 틀린 문제를 다시 확인해보세요. 💪");
    assert_eq!(feedback_for(59.9), "괜찮아요! 다시 한번 복습해볼까요? 🌱");
    assert_ne!(feedback_for(99.9), feedback_for(100.0));
  }
}
