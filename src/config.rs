//! The structures and functions for configuration. Must be accessible to main.

/// The overall options.
pub struct SliderefConfig<'a> {
    pub output: Output,
    pub io: IoConfig<'a>,
    pub markup: MarkupConfig<'a>,
    pub report: Option<&'a str>,
}

impl SliderefConfig<'_> {
    #[allow(clippy::too_many_arguments)]
    pub fn new<'a>(
        output: Output,
        io: IoConfig<'a>,
        markup: MarkupConfig<'a>,
        report: Option<&'a str>,
    ) -> SliderefConfig<'a> {
        SliderefConfig {
            output,
            io,
            markup,
            report,
        }
    }
}

/// Output options
#[derive(PartialEq, Eq, Debug)]
pub enum Output {
    StandardOut,
    File,
}

/// File input and output.
pub struct IoConfig<'a> {
    pub input: &'a str,
    pub output: Option<&'a str>,
}

impl IoConfig<'_> {
    pub fn new<'a>(input: &'a str, output: Option<&'a str>) -> IoConfig<'a> {
        IoConfig { input, output }
    }
}

/// The markup vocabulary that the deck toolchain emits.
///
/// The defaults (set in `main.rs`) are what Quarto and Pandoc produce: a
/// `#refs` container of `.csl-entry` bibliography entries, and `level2`
/// sections for content slides.
pub struct MarkupConfig<'a> {
    pub refs_id: &'a str,
    pub entry_class: &'a str,
    pub container_class: &'a str,
    pub slide_level: usize,
}

impl MarkupConfig<'_> {
    #[allow(clippy::too_many_arguments)]
    pub fn new<'a>(
        refs_id: &'a str,
        entry_class: &'a str,
        container_class: &'a str,
        slide_level: usize,
    ) -> MarkupConfig<'a> {
        MarkupConfig {
            refs_id,
            entry_class,
            container_class,
            slide_level,
        }
    }
}
