//! Scan pipeline: walk → extract → audit → request patch → report.
//!
//! Strictly sequential. Any failure (unreadable file, syntax error, inference
//! error, report write) aborts the scan; sections already written stay in the
//! output.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};
use typepatch_ai::{InferenceService, PatchRequestor};
use typepatch_core::{CheckRegistry, Extractor};

use crate::report::{self, Section};
use crate::walk;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub files: usize,
    pub functions: usize,
    pub suspects: usize,
}

pub struct Scanner<S> {
    extractor: Extractor,
    registry: CheckRegistry,
    requestor: PatchRequestor<S>,
}

impl<S: InferenceService> Scanner<S> {
    pub fn new(requestor: PatchRequestor<S>, registry: CheckRegistry) -> anyhow::Result<Self> {
        Ok(Self {
            extractor: Extractor::new()?,
            registry,
            requestor,
        })
    }

    /// Scan every source file under `root`, appending report sections to `out`.
    pub async fn scan_root<W: Write>(
        &mut self,
        root: &Path,
        out: &mut W,
    ) -> anyhow::Result<ScanSummary> {
        let mut summary = ScanSummary::default();
        for path in walk::source_files(root) {
            let path = path.with_context(|| format!("walking {}", root.display()))?;
            let file = self.scan_file(&path, out).await?;
            summary.files += 1;
            summary.functions += file.functions;
            summary.suspects += file.suspects;
        }
        Ok(summary)
    }

    /// Scan one file. Suspects are reported in source order.
    pub async fn scan_file<W: Write>(
        &mut self,
        path: &Path,
        out: &mut W,
    ) -> anyhow::Result<ScanSummary> {
        let source = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let functions = self.extractor.extract(path, &source)?;

        let mut suspects = 0;
        for func in &functions {
            if !self.registry.verdict(func).is_suspect() {
                continue;
            }
            suspects += 1;

            let original = func.source_text(&source);
            info!(
                file = %path.display(),
                function = %func.name,
                line = func.span.start,
                "requesting patch"
            );
            let patched = self
                .requestor
                .request_patch(&original)
                .await
                .with_context(|| format!("patching {} in {}", func.name, path.display()))?;

            report::write_section(
                out,
                &Section {
                    path,
                    function: &func.name,
                    original: &original,
                    patched: &patched,
                },
            )
            .context("writing report section")?;
        }

        if suspects == 0 {
            debug!(file = %path.display(), functions = functions.len(), "no suspect functions");
        }
        Ok(ScanSummary {
            files: 1,
            functions: functions.len(),
            suspects,
        })
    }
}
