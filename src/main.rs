//! `main.rs` contains the command-line interface for slideref. It collects the
//! values and options, sets up the logger for debug builds, assembles the
//! configuration, and passes the configuration to the main function.
#[macro_use]
extern crate slog;

use ansi_term::Color;
use clap::{crate_version, value_parser, App, Arg};
use slideref::config::{IoConfig, MarkupConfig, Output, SliderefConfig};
use slog::{debug, Drain, Level};
use std::{fs::OpenOptions, process, sync::Mutex};

fn main() -> Result<(), String> {
    // Get the command-line arguments and options
    let matches = App::new("slideref")
        .version(crate_version!())
        .about("A post-processor that copies bibliography references onto the slides that cite them")
        .arg(
            Arg::with_name("input")
                .value_name("INPUT FILE")
                .help("The rendered HTML slide deck to process")
                .index(1)
                .required(true),
        )
        .arg(
            Arg::with_name("output")
                .value_name("OUTPUT FILE")
                .help("The annotated output file (blank outputs to terminal)")
                .index(2)
                .required(false),
        )
        .arg(
            Arg::with_name("refs_id")
                .long("refs_id")
                .value_name("ID")
                .help("The id of the references container")
                .default_value("refs"),
        )
        .arg(
            Arg::with_name("entry_class")
                .long("entry_class")
                .value_name("CLASS")
                .help("The class of bibliography entries")
                .default_value("csl-entry"),
        )
        .arg(
            Arg::with_name("container_class")
                .long("container_class")
                .value_name("CLASS")
                .help("The class given to injected reference containers")
                .default_value("slide-references"),
        )
        .arg(
            Arg::with_name("slide_level")
                .short('l')
                .long("slide_level")
                .value_name("NUMBER")
                .help("The heading level of content slides")
                .default_value("2")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::with_name("report")
                .short('r')
                .long("report")
                .value_name("REPORT FILE")
                .help("Write a JSON summary of the annotation pass"),
        )
        .arg(
            Arg::with_name("force_overwrite")
                .short('W')
                .long("force_overwrite")
                .takes_value(false)
                .help("Required to overwrite the input file with the output"),
        )
        .arg(
            Arg::with_name("debug")
                .short('d')
                .long("debug")
                .takes_value(false)
                .help("Outputs debug log to slideref-log.json")
                .hidden_short_help(true)
                .hidden_long_help(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short('v')
                .long("verbose")
                .value_name("NUMBER")
                .help("Verbosity level between 0 and 3")
                .hidden_short_help(true)
                .hidden_long_help(true)
                .default_value("1"),
        )
        .get_matches();

    // Setup the logger.
    //
    // If the debug flag is set, the log is output to a file
    // `slideref-log.json`. Otherwise, all logging goes to the terminal.
    let debug = matches.is_present("debug");
    let min_log_level = match matches.value_of("verbose").unwrap() {
        "0" => Level::Critical,
        "1" => Level::Error,
        "2" => Level::Warning,
        "3" => Level::Info,
        "4" => Level::Debug,
        "5" => Level::Trace,
        _ => Level::Info,
    };

    let term_decorator = slog_term::TermDecorator::new().build();
    let term_drain = slog_term::CompactFormat::new(term_decorator).build().fuse();
    let term_drain = term_drain.filter_level(min_log_level).fuse();

    let _guard: slog_scope::GlobalLoggerGuard = if debug {
        // Setup the file AND terminal loggers
        let log_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open("./slideref-log.json")
            .unwrap();
        let file_drain = slog_json::Json::new(log_file)
            .set_pretty(true)
            .add_default_keys()
            .build()
            .fuse();
        let file_drain = file_drain.filter_level(Level::Trace).fuse();
        let dual_logger = slog::Logger::root(
            Mutex::new(slog::Duplicate(term_drain, file_drain)).fuse(),
            o!("version" => crate_version!()),
        );
        slog_scope::set_global_logger(dual_logger)
    } else {
        // Setup just the terminal logger
        let term_logger = slog::Logger::root(
            Mutex::new(term_drain).fuse(),
            o!("version" => crate_version!()),
        );
        slog_scope::set_global_logger(term_logger)
    };

    debug!(slog_scope::logger(), "Logger setup");

    // Setup the configuration variables.
    //
    // Files
    let input = matches.value_of("input").unwrap();
    let output = matches.value_of("output");

    // Markup options
    let refs_id = matches.value_of("refs_id").unwrap();
    let entry_class = matches.value_of("entry_class").unwrap();
    let container_class = matches.value_of("container_class").unwrap();
    let slide_level = *matches.get_one::<usize>("slide_level").unwrap();

    // Report and overwrite options
    let report = matches.value_of("report");
    let force_overwrite = matches.is_present("force_overwrite");

    // Deal with command-line errors.
    //
    // If the input and output strings are identical and force_overwrite has not
    // been used, return an error and exit.
    if output.is_some() && input == output.unwrap() && !force_overwrite {
        eprintln!("{} The input file ({}) and output file ({}) are the same,\n     but the force overwrite option was not set.\n     If you want to overwrite the input file, use -W/--force_overwrite.", Color::Red.paint("ERRO"), Color::Blue.paint(input), Color::Blue.paint(output.unwrap()));
        process::exit(1);
    }

    // Determine the output
    let output_option = match output {
        Some(_) => Output::File,
        None => Output::StandardOut,
    };

    // Create the configuration
    let io_config = IoConfig::new(input, output);
    let markup_config = MarkupConfig::new(refs_id, entry_class, container_class, slide_level);
    let config = SliderefConfig::new(output_option, io_config, markup_config, report);

    // Run the program.
    let _ = slideref::slideref(config);

    Ok(())
}
