//! Loading quiz prompt configuration from TOML.
//!
//! See `QuizConfig` and `Prompts` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// Prompts used to drive question generation. Defaults target Korean 3rd-year
/// middle-school students working on the Present Perfect; override them in
/// TOML to tune tone or topic emphasis.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub quiz_system: String,
  pub quiz_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      quiz_system: "You are an expert English teacher for Korean middle school students (3rd year). \
                    Respond ONLY with strict JSON matching the requested schema."
        .into(),
      quiz_user_template: "Generate {count} multiple-choice grammar questions specifically about the \
                           \"Present Perfect\" tense (현재완료).\n\
                           Focus on the usage type: {usage}.\n\
                           The questions should test:\n\
                           1. Correct form (have/has + p.p.)\n\
                           2. Distinguishing between usage types (e.g., determining if a sentence is 'experience' or 'result')\n\
                           3. Common mistakes Korean students make.\n\
                           Provide the output strictly as a JSON array."
        .into(),
    }
  }
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error,
/// returns None and the baked-in defaults are used.
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<QuizConfig>(&s) {
      Ok(cfg) => {
        info!(target: "grammar_master", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "grammar_master", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "grammar_master", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_template_has_count_and_usage_slots() {
    let p = Prompts::default();
    assert!(p.quiz_user_template.contains("{count}"));
    assert!(p.quiz_user_template.contains("{usage}"));
  }

  #[test]
  fn partial_toml_falls_back_to_default_prompts() {
    let cfg: QuizConfig = toml::from_str("").expect("empty config");
    assert_eq!(cfg.prompts.quiz_system, Prompts::default().quiz_system);
  }
}
