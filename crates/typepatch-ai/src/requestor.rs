//! Patch requests: render the prompt, make one inference call, clean the output.

use std::time::Instant;

use tracing::info;

use crate::{InferenceError, InferenceService, render_prompt};

/// New-token budget for one patch.
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 256;

/// Asks an [`InferenceService`] to rewrite suspect functions.
///
/// One request per call: no retry, no timeout, no check that the reply is
/// code at all. Treat the result as untrusted text.
pub struct PatchRequestor<S> {
    service: S,
    max_new_tokens: u32,
}

impl<S: InferenceService> PatchRequestor<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
        }
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Request a patched version of `func_code` (the function's verbatim source).
    pub async fn request_patch(&self, func_code: &str) -> Result<String, InferenceError> {
        let prompt = render_prompt(func_code);
        let start = Instant::now();
        let raw = self.service.generate(&prompt, self.max_new_tokens).await?;
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = raw.len(),
            "completion received"
        );
        Ok(strip_prompt_echo(&prompt, &raw))
    }
}

/// Drop a verbatim echo of `prompt` from the front of `raw`, then trim.
///
/// Exact prefix match only; a partial or reformatted echo is left in place.
pub fn strip_prompt_echo(prompt: &str, raw: &str) -> String {
    raw.strip_prefix(prompt).unwrap_or(raw).trim().to_string()
}
