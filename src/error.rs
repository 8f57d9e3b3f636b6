//! Error taxonomy for question generation.
//!
//! Every variant is terminal to the in-flight generation attempt: nothing is
//! retried automatically, and the single call site driving generation maps any
//! variant into the `Failed` phase with the message shown verbatim to the user.
//! The credential variants spell out concrete remediation steps because the
//! browser client has no other diagnostic surface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
  /// No API key in any configured source. Checked before any network call.
  #[error(
    "Gemini API key not found. Set the GEMINI_API_KEY or API_KEY environment variable \
     (VITE_GEMINI_API_KEY / VITE_API_KEY for Vite builds), or append ?key=YOUR_KEY to the page URL."
  )]
  MissingCredential,

  /// The service rejected the key we sent (401/403 or an invalid-key error body).
  #[error(
    "Gemini rejected the API key. Check that GEMINI_API_KEY (or the ?key= URL parameter) \
     holds a valid key for the Generative Language API."
  )]
  InvalidCredential,

  /// Any other transport or service failure; the original message is preserved.
  #[error("Question service unavailable: {0}")]
  ProviderUnavailable(String),

  /// The model returned no candidate text at all.
  #[error("The model returned an empty response. Please try again.")]
  EmptyResponse,

  /// The candidate text was not the JSON question batch we asked for.
  #[error("Could not parse the generated questions: {0}")]
  MalformedResponse(String),
}
