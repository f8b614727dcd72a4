//! The inference service boundary.

use async_trait::async_trait;

use crate::InferenceError;

/// A text-completion provider: prompt in, completion out.
///
/// Model choice, device placement and sampling are fixed when the backend is
/// constructed; callers only choose the new-token budget. Nothing is promised
/// about the shape of the returned text.
#[async_trait]
pub trait InferenceService: Send + Sync {
    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<String, InferenceError>;
}

/// Sampling policy baked into a backend at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub do_sample: bool,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for SamplingConfig {
    /// Low-temperature nucleus sampling.
    fn default() -> Self {
        Self {
            do_sample: true,
            temperature: 0.2,
            top_p: 0.9,
        }
    }
}
