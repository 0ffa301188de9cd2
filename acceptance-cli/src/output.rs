// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal output: color choice, the palette used for reports and errors, log setup, and the
//! stdout/stderr sink that tests capture.

use acceptance_report::Rgb;
use clap::{Args, ValueEnum, builder::styling};
use owo_colors::{OwoColorize, Style};
use std::{
    fmt,
    io::{self, Write},
};
use supports_color::Stream;
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
    level_filters::LevelFilter,
    warn,
};
use tracing_subscriber::{
    Layer,
    filter::Targets,
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Log events with this target are printed as-is, without a level label.
pub(crate) const NO_HEADING_TARGET: &str = "acceptance_cli::no_heading";

/// Overrides the log filter, in `tracing_subscriber::filter::Targets` syntax.
pub(crate) const LOG_ENV: &str = "ACCEPTANCE_LOG";

/// Crates whose events are shown at `info` (or `debug` with `--verbose`) by default. Everything
/// else only shows warnings.
const WORKSPACE_TARGETS: [&str; 3] = ["acceptance_cli", "acceptance_report", "acceptance_store"];

/// Colors for `--help` and usage errors.
pub(crate) const HELP_STYLES: styling::Styles = {
    use styling::{AnsiColor, Effects};

    let heading = AnsiColor::Blue.on_default().effects(Effects::BOLD);
    let literal = AnsiColor::Magenta.on_default().effects(Effects::BOLD);
    styling::Styles::styled()
        .header(heading)
        .usage(heading)
        .literal(literal)
        .placeholder(AnsiColor::Magenta.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(literal)
        .invalid(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
};

#[derive(Copy, Clone, Debug, Args)]
#[must_use]
pub(crate) struct OutputOpts {
    /// Show failure details, screenshots and per-test summaries; log at debug level
    #[arg(long, short, global = true, env = "ACCEPTANCE_VERBOSE")]
    pub(crate) verbose: bool,

    /// When to color output: auto, always, never
    #[arg(
        long,
        value_enum,
        default_value_t,
        hide_possible_values = true,
        global = true,
        value_name = "WHEN",
        env = "ACCEPTANCE_COLOR"
    )]
    pub(crate) color: ColorChoice,
}

impl OutputOpts {
    /// Installs the global log subscriber and returns the resulting output context.
    pub(crate) fn init(self) -> OutputContext {
        let context = OutputContext {
            verbose: self.verbose,
            color: self.color,
        };
        context.init_logging();
        context
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled_for(self, stream: Stream) -> bool {
        match self {
            Self::Auto => supports_color::on_cached(stream).is_some(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct OutputContext {
    pub(crate) verbose: bool,
    pub(crate) color: ColorChoice,
}

impl OutputContext {
    /// The palette for reports and summaries printed to stdout.
    pub(crate) fn stdout_palette(&self) -> Palette {
        Palette::for_stream(self.color, Stream::Stdout)
    }

    /// The palette for errors and status lines printed to stderr.
    pub fn stderr_palette(&self) -> Palette {
        Palette::for_stream(self.color, Stream::Stderr)
    }

    fn init_logging(&self) {
        let default_targets = workspace_targets(self.verbose);
        let (targets, invalid_filter) = match std::env::var(LOG_ENV) {
            Ok(filter) if !filter.trim().is_empty() => match filter.parse::<Targets>() {
                Ok(targets) => (targets, None),
                Err(_) => (default_targets, Some(filter)),
            },
            _ => (default_targets, None),
        };

        let layer = tracing_subscriber::fmt::layer()
            .event_format(LogFormat {
                palette: self.stderr_palette(),
            })
            .with_writer(io::stderr)
            .with_filter(targets);

        // A subscriber may already be installed when the app is run more than once in a process.
        if tracing_subscriber::registry().with(layer).try_init().is_ok()
            && let Some(filter) = invalid_filter
        {
            warn!("ignoring {LOG_ENV}={filter:?}: not a valid target filter");
        }
    }
}

/// The default filter: this workspace's crates at `info` (`debug` if verbose), others at `warn`.
fn workspace_targets(verbose: bool) -> Targets {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    WORKSPACE_TARGETS
        .into_iter()
        .fold(Targets::new().with_default(LevelFilter::WARN), |targets, target| {
            targets.with_target(target, level)
        })
}

/// Styles for terminal output. Every style is plain unless colors are enabled.
#[derive(Copy, Clone, Debug, Default)]
pub struct Palette {
    enabled: bool,
    pub(crate) bold: Style,
    pub(crate) dimmed: Style,
    pub(crate) warning: Style,
    pub(crate) error: Style,
}

impl Palette {
    fn for_stream(choice: ColorChoice, stream: Stream) -> Self {
        if !choice.enabled_for(stream) {
            return Self::default();
        }
        Self {
            enabled: true,
            bold: Style::new().bold(),
            dimmed: Style::new().dimmed(),
            warning: Style::new().yellow().bold(),
            error: Style::new().red().bold(),
        }
    }

    /// Paints text in a report color.
    pub(crate) fn rgb(&self, color: Rgb) -> Style {
        if self.enabled {
            Style::new().truecolor(color.r, color.g, color.b)
        } else {
            Style::new()
        }
    }

    fn level_label(&self, level: Level) -> (&'static str, Style) {
        match level {
            Level::ERROR => ("error", self.error),
            Level::WARN => ("warning", self.warning),
            Level::INFO => ("info", self.bold),
            Level::DEBUG => ("debug", self.bold),
            Level::TRACE => ("trace", self.dimmed),
        }
    }
}

/// Formats log events as `<level>: <message> key=value...`.
struct LogFormat {
    palette: Palette,
}

impl<S, N> FormatEvent<S, N> for LogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        if metadata.target() != NO_HEADING_TARGET {
            let (label, style) = self.palette.level_label(*metadata.level());
            write!(writer, "{}: ", label.style(style))?;
        }

        let mut fields = EventFields::default();
        event.record(&mut fields);

        write!(writer, "{}", fields.message)?;
        for (name, value) in &fields.extra {
            let field = format!("{name}={value}");
            write!(writer, " {}", field.style(self.palette.dimmed))?;
        }
        writeln!(writer)
    }
}

/// The message of an event, and its other fields in recording order.
#[derive(Default)]
struct EventFields {
    message: String,
    extra: Vec<(&'static str, String)>,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.extra.push((field.name(), format!("{value:?}")));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        // Messages from `format_args!` arrive here; their Debug output is the formatted text.
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.extra.push((field.name(), format!("{value:?}")));
        }
    }
}

/// Where command output goes: the process's stdout and stderr, or in-memory buffers.
#[derive(Debug, Default)]
pub struct OutputWriter {
    captured: Option<CapturedOutput>,
}

/// Output collected by a capturing [`OutputWriter`].
#[derive(Debug, Default)]
pub(crate) struct CapturedOutput {
    pub(crate) stdout: Vec<u8>,
    pub(crate) stderr: Vec<u8>,
}

impl OutputWriter {
    /// Returns a writer that keeps all output in memory.
    #[cfg(test)]
    pub(crate) fn capture() -> Self {
        Self {
            captured: Some(CapturedOutput::default()),
        }
    }

    /// Returns everything written so far, if this writer captures output.
    #[cfg(test)]
    pub(crate) fn into_captured(self) -> Option<CapturedOutput> {
        self.captured
    }

    /// Writes `text` to stdout and flushes it.
    pub(crate) fn write_stdout(&mut self, text: &str) -> io::Result<()> {
        match &mut self.captured {
            Some(captured) => captured.stdout.extend_from_slice(text.as_bytes()),
            None => write_flushed(&mut io::stdout().lock(), text)?,
        }
        Ok(())
    }

    /// Writes `text` to stderr and flushes it.
    pub(crate) fn write_stderr(&mut self, text: &str) -> io::Result<()> {
        match &mut self.captured {
            Some(captured) => captured.stderr.extend_from_slice(text.as_bytes()),
            None => write_flushed(&mut io::stderr().lock(), text)?,
        }
        Ok(())
    }
}

fn write_flushed(writer: &mut impl Write, text: &str) -> io::Result<()> {
    writer.write_all(text.as_bytes())?;
    writer.flush()
}
