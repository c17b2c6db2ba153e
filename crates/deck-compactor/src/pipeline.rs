//! Compression pipeline: orchestrates all four stages for one file's text.

use crate::assemble::{self, GuardDecision, SizeGuard};
use crate::locate::find_keyword_sets;
use crate::normalize::normalize;
use crate::rle;
use crate::validator::DeckValidator;
use deck_core::error::Result;
use deck_core::types::{Diagnostic, DiagnosticKind, KeywordSet, Line};
use deck_core::CompactorConfig;
use std::sync::Arc;
use tracing::{debug, warn};

/// Compression result with statistics.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    /// The committed candidate, or the untouched input.
    pub output: String,
    /// Non-comment bytes of the input.
    pub original_len: usize,
    /// Non-comment bytes of the candidate, whether committed or not.
    pub compressed_len: usize,
    pub decision: GuardDecision,
    pub keyword_sets: usize,
    pub compressed_sets: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompressionResult {
    pub fn ratio(&self) -> f64 {
        if self.original_len == 0 { return 1.0; }
        self.compressed_len as f64 / self.original_len as f64
    }

    pub fn is_committed(&self) -> bool {
        self.decision == GuardDecision::Committed
    }
}

/// The main deck compactor.
#[derive(Clone, Default)]
pub struct DeckCompactor {
    config: CompactorConfig,
    validator: Option<Arc<dyn DeckValidator>>,
}

impl DeckCompactor {
    pub fn new(config: CompactorConfig) -> Self {
        Self { config, validator: None }
    }

    /// Consult `validator` before committing any smaller candidate.
    pub fn with_validator(mut self, validator: Arc<dyn DeckValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Compress one file's text.
    ///
    /// Fails only on an unterminated block, in which case nothing of the
    /// file may be rewritten. Every other problem degrades to leaving the
    /// affected block, or the whole text, unchanged.
    pub fn compress(&self, text: &str) -> Result<CompressionResult> {
        let normalized = normalize(text, &self.config);
        let mut diagnostics = normalized.diagnostics;
        let lines = normalized.lines;

        let located = find_keyword_sets(&lines, &self.config)?;
        diagnostics.extend(located.diagnostics);

        let blocks: Vec<(KeywordSet, Vec<Line>)> = located
            .sets
            .iter()
            .map(|set| {
                let rewritten = rle::compress_keyword_set(&lines, set, &self.config);
                debug!(
                    keyword = %set.name,
                    compressible = set.compressible,
                    lines_in = set.line_count(),
                    lines_out = rewritten.len(),
                    "keyword set"
                );
                (set.clone(), rewritten)
            })
            .collect();
        let compressed_sets = located.sets.iter().filter(|s| s.compressible).count();

        let candidate = assemble::render(&assemble::splice(&lines, &blocks));
        let verdict = SizeGuard::new(self.validator.as_deref()).check(text, &candidate);
        if let Some(reason) = &verdict.rejection {
            warn!(%reason, "compressed candidate rejected, keeping original");
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::ValidationRejected,
                0,
                reason.clone(),
            ));
        }

        let output = match verdict.decision {
            GuardDecision::Committed => candidate,
            GuardDecision::NotSmaller | GuardDecision::ValidatorRejected => text.to_string(),
        };

        Ok(CompressionResult {
            output,
            original_len: verdict.original_bytes,
            compressed_len: verdict.candidate_bytes,
            decision: verdict.decision,
            keyword_sets: located.sets.len(),
            compressed_sets,
            diagnostics,
        })
    }
}
