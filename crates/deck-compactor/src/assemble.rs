//! Stage 4: splice rewritten blocks back and guard the result.

use crate::validator::DeckValidator;
use deck_core::types::{KeywordSet, Line, COMMENT_MARKER};
use serde::{Deserialize, Serialize};

/// Replace each set's line range with its rewritten lines. Lines outside
/// every set are copied unchanged. `blocks` must be in range order.
pub fn splice(lines: &[Line], blocks: &[(KeywordSet, Vec<Line>)]) -> Vec<Line> {
    let mut out = Vec::with_capacity(lines.len());
    let mut cursor = 0;
    for (set, replacement) in blocks {
        out.extend_from_slice(&lines[cursor..set.start]);
        out.extend(replacement.iter().cloned());
        cursor = set.end + 1;
    }
    out.extend_from_slice(&lines[cursor.min(lines.len())..]);
    out
}

pub fn render(lines: &[Line]) -> String {
    let mut out = String::new();
    for line in lines {
        line.render_into(&mut out);
    }
    out
}

/// Bytes of every non-comment line, one newline each.
pub fn content_bytes(text: &str) -> usize {
    text.lines()
        .filter(|l| !l.trim_start().starts_with(COMMENT_MARKER))
        .map(|l| l.len() + 1)
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardDecision {
    /// The candidate replaces the original.
    Committed,
    /// The candidate was not strictly smaller; the original is kept.
    NotSmaller,
    /// A validator refused the candidate; the original is kept.
    ValidatorRejected,
}

#[derive(Debug, Clone)]
pub struct GuardVerdict {
    pub decision: GuardDecision,
    pub original_bytes: usize,
    pub candidate_bytes: usize,
    pub rejection: Option<String>,
}

/// Decides whether a candidate may replace the original. Without a
/// validator the size comparison alone is enough to commit.
pub struct SizeGuard<'a> {
    validator: Option<&'a dyn DeckValidator>,
}

impl<'a> SizeGuard<'a> {
    pub fn new(validator: Option<&'a dyn DeckValidator>) -> Self {
        Self { validator }
    }

    pub fn check(&self, original: &str, candidate: &str) -> GuardVerdict {
        let original_bytes = content_bytes(original);
        let candidate_bytes = content_bytes(candidate);
        let mut verdict = GuardVerdict {
            decision: GuardDecision::Committed,
            original_bytes,
            candidate_bytes,
            rejection: None,
        };
        if candidate_bytes >= original_bytes {
            verdict.decision = GuardDecision::NotSmaller;
            return verdict;
        }
        if let Some(validator) = self.validator {
            if let Err(e) = validator.validate(candidate) {
                verdict.decision = GuardDecision::ValidatorRejected;
                verdict.rejection = Some(format!("{}: {e:#}", validator.name()));
            }
        }
        verdict
    }
}
