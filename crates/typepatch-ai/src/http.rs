//! HTTP backend for a locally hosted text-generation server.
//!
//! Speaks the text-generation-inference `/generate` shape:
//! `{"inputs": ..., "parameters": {...}}` in, `{"generated_text": ...}` out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{InferenceError, InferenceService, SamplingConfig};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    do_sample: bool,
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct Generation {
    generated_text: String,
}

/// Some servers wrap the single generation in a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    One(Generation),
    Many(Vec<Generation>),
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        match self {
            Self::One(g) => Some(g.generated_text),
            Self::Many(gs) => gs.into_iter().next().map(|g| g.generated_text),
        }
    }
}

/// Text-generation client with a fixed sampling policy.
///
/// The underlying `reqwest` client has no request timeout: a stalled server
/// stalls the caller.
pub struct HttpGenerator {
    client: reqwest::Client,
    base_url: String,
    sampling: SamplingConfig,
}

impl HttpGenerator {
    /// `base_url` should be like `http://127.0.0.1:8080` (no trailing slash).
    pub fn new(base_url: String, sampling: SamplingConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            sampling,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_body<'a>(&self, prompt: &'a str, max_new_tokens: u32) -> GenerateRequest<'a> {
        GenerateRequest {
            inputs: prompt,
            parameters: GenerateParameters {
                max_new_tokens,
                do_sample: self.sampling.do_sample,
                temperature: self.sampling.temperature,
                top_p: self.sampling.top_p,
            },
        }
    }
}

#[async_trait]
impl InferenceService for HttpGenerator {
    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<String, InferenceError> {
        let url = format!("{}/generate", self.base_url);
        debug!(url = %url, prompt_chars = prompt.len(), max_new_tokens, "sending generate request");

        let resp = self
            .client
            .post(&url)
            .json(&self.request_body(prompt, max_new_tokens))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        parsed
            .into_text()
            .ok_or_else(|| InferenceError::Backend("server returned no generations".into()))
    }
}
