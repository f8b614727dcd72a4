//! Inference layer: the service boundary to a local generative model, the patch prompt,
//! and the requestor that turns a suspect function into a model-authored patch.

mod error;
pub mod prompt;
pub mod requestor;
pub mod service;

#[cfg(feature = "http")]
pub mod http;

pub use error::InferenceError;
pub use prompt::render_prompt;
pub use requestor::{DEFAULT_MAX_NEW_TOKENS, PatchRequestor, strip_prompt_echo};
pub use service::{InferenceService, SamplingConfig};

#[cfg(feature = "http")]
pub use http::HttpGenerator;
