//! External validation seam for compressed candidates.

use crate::locate::find_keyword_sets;
use crate::normalize::normalize;
use anyhow::Result;
use deck_core::CompactorConfig;

/// Accepts or rejects a complete candidate text before it is committed.
pub trait DeckValidator: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str {
        "validator"
    }

    fn validate(&self, text: &str) -> Result<()>;
}

impl<F> DeckValidator for F
where
    F: Fn(&str) -> Result<()> + Send + Sync,
{
    fn validate(&self, text: &str) -> Result<()> {
        self(text)
    }
}

/// Re-reads a candidate with this crate's own normalizer and locator.
/// Rejects anything that no longer splits into terminated blocks.
pub struct StructuralValidator {
    config: CompactorConfig,
}

impl StructuralValidator {
    pub fn new(config: CompactorConfig) -> Self {
        Self { config }
    }
}

impl Default for StructuralValidator {
    fn default() -> Self {
        Self::new(CompactorConfig::default())
    }
}

impl DeckValidator for StructuralValidator {
    fn name(&self) -> &str {
        "structural"
    }

    fn validate(&self, text: &str) -> Result<()> {
        let normalized = normalize(text, &self.config);
        find_keyword_sets(&normalized.lines, &self.config)?;
        Ok(())
    }
}
