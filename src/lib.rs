//! Contains the main Slideref function. Runs the annotation pipeline.

pub mod config;

mod annotate;
mod dom;
mod fs;
mod report;

use ansi_term::Color;
use config::{Output, SliderefConfig};
use fs::load_file;
use slog::{debug, error, o};
use std::{path::Path, process};

/// The main Slideref function.
pub fn slideref(config: SliderefConfig) -> Result<(), String> {
    eprintln!("{} Starting Slideref...", Color::Green.paint("INFO"));

    // Create paths for the input and output.
    let input = Path::new(config.io.input);
    let output = config.io.output.map(Path::new);

    // Load the rendered deck
    let deck_html =
        match slog_scope::scope(&slog_scope::logger().new(o!("fn" => "load_file()")), || {
            load_file(input)
        }) {
            Ok(d) => d,
            Err(e) => {
                error!(slog_scope::logger(), "Deck load error: {}", e);
                eprintln!("{} Deck load error: {}", Color::Red.paint("ERRO"), e);
                process::exit(1);
            }
        };

    // Parse the deck markup
    let mut deck = match slog_scope::scope(&slog_scope::logger().new(o!("fn" => "parse()")), || {
        dom::Dom::parse(&deck_html)
    }) {
        Ok(d) => d,
        Err(e) => {
            error!(slog_scope::logger(), "Deck parse error: {}", e);
            eprintln!("{} Deck parse error: {}", Color::Red.paint("ERRO"), e);
            process::exit(1);
        }
    };

    // Run the annotation pass
    eprintln!("{} Annotating...", Color::Green.paint("INFO"));

    let summary = slog_scope::scope(&slog_scope::logger().new(o!("fn" => "annotate()")), || {
        annotate::annotate(&mut deck, &config.markup)
    });

    debug!(
        slog_scope::logger(),
        "Annotated {} slides with {} references",
        summary.slides_annotated,
        summary.references_attached
    );
    eprintln!(
        "{} Annotated {} slides with {} references",
        Color::Green.paint("INFO"),
        summary.slides_annotated,
        summary.references_attached
    );

    // Serialize the annotated deck
    let annotated = slog_scope::scope(&slog_scope::logger().new(o!("fn" => "serialize()")), || {
        deck.serialize()
    });

    // Write the report, if one was requested
    if let Some(report) = config.report {
        match slog_scope::scope(
            &slog_scope::logger().new(o!("fn" => "write_report()")),
            || report::write_report(Path::new(report), &summary),
        ) {
            Ok(_) => (),
            Err(e) => {
                error!(slog_scope::logger(), "Report error: {}", e);
                eprintln!("{} Report error: {}", Color::Red.paint("ERRO"), e);
                process::exit(1);
            }
        };
    }

    // If no output was selected, output to the terminal now
    if config.output == Output::StandardOut {
        println!("{}", annotated);
        return Ok(());
    }

    // This can safely unwrap because an output must have been provided for
    // config.output to be set to File
    fs::save_file(output.unwrap(), &annotated)
}
