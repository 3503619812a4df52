//! Marker-based source patching.
//!
//! The contract: given a source artifact containing a designated insertion
//! marker and a line to insert, produce an updated artifact with the line
//! placed before the marker at the marker's indentation; fail if the marker
//! is absent. Scaffolded files carry their markers from day one, so there is
//! no source parsing involved.

use std::fs;
use std::path::Path;

use crate::error::CliError;

/// Insert `line` before the first line starting with `marker`, copying that
/// line's indentation. Returns `None` if the marker is absent.
pub fn insert_before_marker(source: &str, marker: &str, line: &str) -> Option<String> {
    let mut out = String::with_capacity(source.len() + line.len() + 1);
    let mut found = false;

    for src_line in source.lines() {
        if !found && src_line.trim_start().starts_with(marker) {
            let indent: String = src_line.chars().take_while(|c| c.is_whitespace()).collect();
            out.push_str(&indent);
            out.push_str(line);
            out.push('\n');
            found = true;
        }
        out.push_str(src_line);
        out.push('\n');
    }

    found.then_some(out)
}

/// Apply [`insert_before_marker`] to a file in place.
pub fn patch_file(path: &Path, marker: &str, line: &str) -> Result<(), CliError> {
    let source = fs::read_to_string(path)?;
    let patched =
        insert_before_marker(&source, marker, line).ok_or_else(|| CliError::MarkerNotFound {
            marker: marker.to_string(),
            file: path.display().to_string(),
        })?;
    fs::write(path, patched)?;
    Ok(())
}
