//! Runtime settings.
//!
//! Report location, scan filters and generation parameters are compile-time
//! constants. The inference server address is the one value read at startup.

use std::path::PathBuf;

/// Report file, written in the current working directory and truncated each run.
pub const REPORT_FILE: &str = "patches.txt";

pub const ENDPOINT_ENV: &str = "TYPEPATCH_ENDPOINT";
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: String,
    pub report_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let endpoint = lookup(ENDPOINT_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        Self {
            endpoint,
            report_path: PathBuf::from(REPORT_FILE),
        }
    }
}
