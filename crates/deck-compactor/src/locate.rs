//! Stage 2: keyword-set location.

use deck_core::error::{DeckError, Result};
use deck_core::types::{Diagnostic, DiagnosticKind, KeywordSet, Line, LineKind};
use deck_core::CompactorConfig;

#[derive(Debug, Clone, Default)]
pub struct Located {
    /// Non-overlapping, in file order.
    pub sets: Vec<KeywordSet>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scan the normalized lines for keyword data blocks.
///
/// A header followed by data but no terminator before the next header or
/// end of file fails the whole file with `UnterminatedBlock`, except for
/// multi-record keywords, whose records carry their own slashes.
pub fn find_keyword_sets(lines: &[Line], config: &CompactorConfig) -> Result<Located> {
    let mut located = Located::default();
    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        match line.kind {
            LineKind::KeywordHeader => match scan_block(lines, i, config)? {
                Some(set) => {
                    i = set.end + 1;
                    located.sets.push(set);
                }
                None => i += 1,
            },
            LineKind::Data | LineKind::Terminator => {
                located.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::OrphanData,
                    line.line_no,
                    format!("'{}' is outside any keyword block, left unchanged", line.text),
                ));
                i += 1;
            }
            LineKind::Comment | LineKind::Blank => i += 1,
        }
    }
    Ok(located)
}

/// Collect one block starting at the header `start`. Returns `None` for a
/// data-less keyword such as a section name.
fn scan_block(
    lines: &[Line],
    start: usize,
    config: &CompactorConfig,
) -> Result<Option<KeywordSet>> {
    let header = &lines[start];
    let multi_record = !config.is_compressible(&header.text);
    let mut last_data = None;
    for (j, line) in lines.iter().enumerate().skip(start + 1) {
        match line.kind {
            LineKind::Terminator => {
                let opaque = lines[start..=j].iter().any(|l| l.opaque);
                return Ok(Some(KeywordSet {
                    name: header.text.clone(),
                    start,
                    end: j,
                    terminated: true,
                    compressible: !multi_record && !opaque,
                }));
            }
            LineKind::KeywordHeader => break,
            LineKind::Data => last_data = Some(j),
            LineKind::Comment | LineKind::Blank => {}
        }
    }

    match last_data {
        None => Ok(None),
        Some(end) if multi_record => Ok(Some(KeywordSet {
            name: header.text.clone(),
            start,
            end,
            terminated: false,
            compressible: false,
        })),
        Some(_) => Err(DeckError::UnterminatedBlock {
            keyword: header.text.clone(),
            line: header.line_no,
        }),
    }
}
