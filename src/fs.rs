//! Functions for interacting with the file system.

use ansi_term::Color;
use slog::debug;
use std::{fs, path::Path};

/// Load a file into a string.
///
/// This function is used to load the rendered slide deck into a string, which
/// can then be passed to the main function.
pub fn load_file(path: &Path) -> Result<String, String> {
    debug!(
        slog_scope::logger(),
        "Loading file {}...",
        path.to_string_lossy()
    );

    match fs::read_to_string(path) {
        Ok(r) => {
            debug!(
                slog_scope::logger(),
                "File {} loaded.",
                path.to_string_lossy()
            );
            Ok(r)
        }
        Err(e) => {
            let err_msg = format!("error reading the file {}—{}", path.to_string_lossy(), e);
            Err(err_msg)
        }
    }
}

/// Save a string in a file.
///
/// This function saves the provided string to a file. It is used for both the
/// annotated deck and the optional JSON report.
pub fn save_file(path: &Path, output: &str) -> Result<(), String> {
    debug!(slog_scope::logger(), "Saving {}...", path.to_string_lossy());
    eprintln!(
        "{} Saving {}...",
        Color::Green.paint("INFO"),
        Color::Blue.paint(path.to_string_lossy())
    );

    match std::fs::write(path, output) {
        Ok(_) => {
            debug!(
                slog_scope::logger(),
                "File {} saved.",
                path.to_string_lossy()
            );
            eprintln!("{} Done", Color::Green.paint("INFO"));
            Ok(())
        }
        Err(e) => {
            let err_msg = format!("Error writing the file {}—{}", path.to_string_lossy(), e);
            Err(err_msg)
        }
    }
}
