//! The annotation summary and the optional JSON report.

use serde::Serialize;
use slog::debug;
use std::path::Path;

/// What an annotation pass did to a deck.
///
/// The pass itself never warns or fails on incomplete citation metadata; this
/// summary is how the degradation stays observable. Unresolved keys are kept
/// in encounter order with duplicates collapsed.
#[derive(Debug, Default, Serialize)]
pub struct Summary {
    pub slides_annotated: usize,
    pub references_attached: usize,
    pub unresolved_keys: Vec<String>,
}

/// Write a pass summary to a JSON file.
pub fn write_report(path: &Path, summary: &Summary) -> Result<(), String> {
    debug!(
        slog_scope::logger(),
        "Writing report to {}...",
        path.to_string_lossy()
    );

    let json = match serde_json::to_string_pretty(summary) {
        Ok(j) => j,
        Err(e) => return Err(format!("Error serializing the report—{}", e)),
    };

    crate::fs::save_file(path, &json)
}
