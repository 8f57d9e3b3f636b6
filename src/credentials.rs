//! API-key discovery: an ordered chain of optional sources.
//!
//! The frontend ships as static client-side code, so there is no single
//! canonical place the key arrives from. We try, in fixed priority order:
//!   1. plain environment variables,
//!   2. build-tool-injected names (Vite prefixes client-visible vars),
//!   3. a `key` / `apiKey` parameter on the page URL, forwarded by the client.
//! First non-empty hit wins. Resolution happens before any network call.

use crate::error::GenerationError;

const ENV_NAMES: &[&str] = &["GEMINI_API_KEY", "API_KEY"];
const BUILD_NAMES: &[&str] = &["VITE_GEMINI_API_KEY", "VITE_API_KEY"];

/// Resolve the Gemini API key, `url_key` being the client-forwarded URL
/// parameter (last resort).
pub fn resolve_api_key(url_key: Option<&str>) -> Result<String, GenerationError> {
  resolve_with(|name| std::env::var(name).ok(), url_key)
}

/// Chain core with the environment abstracted away for tests.
fn resolve_with(
  lookup: impl Fn(&str) -> Option<String>,
  url_key: Option<&str>,
) -> Result<String, GenerationError> {
  let first_hit = |names: &[&str]| -> Option<String> {
    names
      .iter()
      .filter_map(|name| lookup(name))
      .map(|v| v.trim().to_string())
      .find(|v| !v.is_empty())
  };

  if let Some(key) = first_hit(ENV_NAMES) {
    return Ok(key);
  }
  if let Some(key) = first_hit(BUILD_NAMES) {
    return Ok(key);
  }
  if let Some(key) = url_key.map(str::trim).filter(|k| !k.is_empty()) {
    return Ok(key.to_string());
  }
  Err(GenerationError::MissingCredential)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn env_of<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |name| pairs.iter().find(|(k, _)| *k == name).map(|(_, v)| v.to_string())
  }

  #[test]
  fn env_var_beats_url_parameter() {
    let key = resolve_with(env_of(&[("GEMINI_API_KEY", "env-key")]), Some("url-key")).unwrap();
    assert_eq!(key, "env-key");
  }

  #[test]
  fn build_tool_names_are_checked_after_plain_env() {
    let env = env_of(&[("VITE_GEMINI_API_KEY", "vite-key")]);
    assert_eq!(resolve_with(env, None).unwrap(), "vite-key");
  }

  #[test]
  fn url_parameter_is_the_last_resort() {
    let key = resolve_with(env_of(&[]), Some("  url-key  ")).unwrap();
    assert_eq!(key, "url-key");
  }

  #[test]
  fn nothing_found_is_missing_credential() {
    let err = resolve_with(env_of(&[]), None).unwrap_err();
    assert!(matches!(err, GenerationError::MissingCredential));
  }

  #[test]
  fn whitespace_only_values_do_not_count() {
    let err = resolve_with(env_of(&[("API_KEY", "   ")]), Some("")).unwrap_err();
    assert!(matches!(err, GenerationError::MissingCredential));
  }
}
