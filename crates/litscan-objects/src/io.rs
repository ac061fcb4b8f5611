//! Term file format.
//!
//! One term group per line, synonyms comma-separated, no header:
//!
//! ```text
//! brain,cortex
//! body,corporeal
//! ```
//!
//! In inclusion and exclusion files the n-th line belongs to the n-th term,
//! so a blank line means "nothing for this term".

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use litscan_common::error::{LitscanError, Result};
use litscan_common::TermKind;

/// Parse term file contents.
pub fn parse_terms(content: &str, kind: TermKind) -> Result<Vec<Vec<String>>> {
    let mut groups = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            if !kind.allows_blank() {
                return Err(LitscanError::FileFormat(format!(
                    "Blank line {} in a {} file",
                    line_no + 1,
                    kind
                )));
            }
            groups.push(Vec::new());
            continue;
        }

        let synonyms: Vec<String> = line
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if synonyms.is_empty() {
            return Err(LitscanError::FileFormat(format!(
                "Line {} has no terms: '{}'",
                line_no + 1,
                line
            )));
        }
        groups.push(synonyms);
    }
    Ok(groups)
}

pub fn load_terms_file(path: &Path, kind: TermKind) -> Result<Vec<Vec<String>>> {
    if !path.is_file() {
        return Err(LitscanError::FileFormat(format!(
            "Terms file not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    parse_terms(&content, kind)
}

/// Write term groups in the format `load_terms_file` reads. Empty groups become blank lines.
///
/// Synonyms containing a comma or a line break cannot be read back intact,
/// so they are refused before the file is touched.
pub fn write_terms_file(path: &Path, groups: &[Vec<String>]) -> Result<()> {
    for (line_no, group) in groups.iter().enumerate() {
        if let Some(bad) = group.iter().find(|s| s.contains([',', '\n', '\r'])) {
            return Err(LitscanError::FileFormat(format!(
                "Term '{}' on line {} contains a separator and cannot be written",
                bad.escape_debug(),
                line_no + 1
            )));
        }
    }

    let mut out = BufWriter::new(File::create(path)?);
    for group in groups {
        writeln!(out, "{}", group.join(","))?;
    }
    out.flush()?;
    Ok(())
}
