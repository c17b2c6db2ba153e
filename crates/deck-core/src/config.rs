use crate::error::{DeckError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Keywords holding several slash-terminated records. A record's terminator
/// must stay on the same line as its last value, so these blocks are never
/// rewritten.
pub const DEFAULT_NON_COMPRESSIBLE: &[&str] = &[
    // Lift curve tables
    "VFPPROD", "VFPINJ",
    // Box-scoped property edits
    "EQUALS", "MULTIPLY", "ADD", "COPY", "MINVALUE", "MAXVALUE",
    "EQUALREG", "MULTIREG", "ADDREG", "COPYREG", "OPERATE", "OPERATER",
    // Multi-record PVT tables
    "PVTO", "PVTG",
    // Well and group records
    "WELSPECS", "COMPDAT", "WCONPROD", "WCONINJE", "WCONHIST", "WCONINJH",
    "WELOPEN", "WELTARG", "GRUPTREE",
    // Fault definitions
    "FAULTS", "MULTFLT", "THPRES",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactorConfig {
    /// Keyword names excluded from run-length rewriting.
    pub non_compressible: BTreeSet<String>,
    /// Greedy wrap width for rewritten data lines.
    pub max_line_width: usize,
    /// Longest identifier still treated as a keyword name.
    pub max_keyword_len: usize,
}

impl CompactorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| DeckError::io(path, e))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_line_width == 0 {
            return Err(DeckError::Config("max_line_width must be positive".into()));
        }
        if self.max_keyword_len == 0 {
            return Err(DeckError::Config("max_keyword_len must be positive".into()));
        }
        Ok(())
    }

    pub fn is_compressible(&self, keyword: &str) -> bool {
        !self.non_compressible.contains(keyword)
    }

    pub fn with_non_compressible(mut self, keyword: impl Into<String>) -> Self {
        self.non_compressible.insert(keyword.into());
        self
    }

    pub fn with_max_line_width(mut self, width: usize) -> Self {
        self.max_line_width = width;
        self
    }
}

impl Default for CompactorConfig {
    fn default() -> Self {
        Self {
            non_compressible: DEFAULT_NON_COMPRESSIBLE.iter().map(|s| s.to_string()).collect(),
            max_line_width: 128,
            max_keyword_len: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let config = CompactorConfig::default();
        assert!(!config.is_compressible("VFPPROD"));
        assert!(!config.is_compressible("EQUALS"));
        assert!(config.is_compressible("PORO"));
        assert_eq!(config.max_keyword_len, 8);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = CompactorConfig::from_json_str(r#"{"max_line_width": 72}"#).unwrap();
        assert_eq!(config.max_line_width, 72);
        assert!(!config.is_compressible("VFPINJ"));
    }

    #[test]
    fn test_json_replaces_table() {
        let config =
            CompactorConfig::from_json_str(r#"{"non_compressible": ["SWOF"]}"#).unwrap();
        assert!(!config.is_compressible("SWOF"));
        assert!(config.is_compressible("VFPPROD"));
    }

    #[test]
    fn test_zero_width_rejected() {
        let err = CompactorConfig::from_json_str(r#"{"max_line_width": 0}"#).unwrap_err();
        assert!(matches!(err, DeckError::Config(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = CompactorConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, DeckError::Serialization(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("compactor.json");
        std::fs::write(&path, r#"{"max_keyword_len": 10}"#).unwrap();
        let config = CompactorConfig::from_file(&path).unwrap();
        assert_eq!(config.max_keyword_len, 10);

        let missing = CompactorConfig::from_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, DeckError::Io { .. }));
    }
}
