//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Unwrap a markdown code fence around generated text, if present.
///
/// Models asked for raw JSON still sometimes wrap it in ``` or ```json fences.
/// If the (trimmed) text starts with a fence line, keep only the inner content;
/// otherwise return the trimmed input unchanged. Pure so it can be tested
/// without any network involvement.
pub fn strip_code_fence(text: &str) -> &str {
  let t = text.trim();
  let Some(rest) = t.strip_prefix("```") else { return t };
  // The opening fence line may carry a language tag ("```json").
  let Some(nl) = rest.find('\n') else { return t };
  let body = rest[nl + 1..].trim_end();
  body.strip_suffix("```").unwrap_or(body).trim()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { s.to_string() } else { format!("{}… ({} bytes total)", &s[..max], s.len()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_all_pairs() {
    let out = fill_template("make {n} items about {topic}", &[("n", "5"), ("topic", "tense")]);
    assert_eq!(out, "make 5 items about tense");
  }

  #[test]
  fn strips_fence_with_language_tag() {
    let fenced = "```json\n[{\"a\": 1}]\n```";
    assert_eq!(strip_code_fence(fenced), "[{\"a\": 1}]");
  }

  #[test]
  fn strips_fence_without_language_tag() {
    let fenced = "```\n[1, 2, 3]\n```";
    assert_eq!(strip_code_fence(fenced), "[1, 2, 3]");
  }

  #[test]
  fn unfenced_text_is_only_trimmed() {
    assert_eq!(strip_code_fence("  [1, 2]  \n"), "[1, 2]");
  }

  #[test]
  fn fenced_and_plain_are_identical_after_stripping() {
    let plain = "[{\"x\": \"y\"}]";
    let fenced = format!("```json\n{}\n```", plain);
    assert_eq!(strip_code_fence(&fenced), strip_code_fence(plain));
  }
}
