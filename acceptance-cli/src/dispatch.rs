// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Top-level application and command routing.

use crate::{
    ExpectedError, Result, display,
    output::{OutputContext, OutputOpts, OutputWriter},
};
use acceptance_store::{
    ReportSummary, XmlReporter, config::AcceptanceConfig, load_report, load_reports_from_dir,
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use std::sync::Arc;
use tracing::debug;

/// Inspect, summarize and rewrite acceptance test reports.
///
/// Reports are XML files, one per test, written by an acceptance test run into the store
/// directory (`target/acceptance` by default).
#[derive(Debug, clap::Parser)]
#[command(
    name = "acceptance",
    version,
    styles = crate::output::HELP_STYLES,
    max_term_width = 100,
)]
pub struct AcceptanceApp {
    #[clap(flatten)]
    common: CommonOpts,

    #[clap(subcommand)]
    command: Command,
}

impl AcceptanceApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.common.output.init()
    }

    /// Executes the app.
    pub fn exec(self, output: OutputContext, output_writer: &mut OutputWriter) -> Result<i32> {
        let config = self.common.load_config()?;
        self.command.exec(&config, output, output_writer)
    }
}

#[derive(Debug, Args)]
struct CommonOpts {
    /// Project root: the config file and store directory are relative to it
    /// [default: current directory]
    #[arg(long, global = true, value_name = "DIR")]
    project_root: Option<Utf8PathBuf>,

    /// Config file [default: <project-root>/.config/acceptance.toml]
    #[arg(long, global = true, value_name = "PATH")]
    config_file: Option<Utf8PathBuf>,

    #[clap(flatten)]
    output: OutputOpts,
}

impl CommonOpts {
    fn load_config(&self) -> Result<AcceptanceConfig> {
        let project_root = match &self.project_root {
            Some(project_root) => project_root.clone(),
            None => {
                let current_dir = std::env::current_dir()
                    .map_err(|err| ExpectedError::CurrentDirFailed { err })?;
                Utf8PathBuf::try_from(current_dir)
                    .map_err(|err| ExpectedError::CurrentDirInvalidUtf8 { err })?
            }
        };

        let config = AcceptanceConfig::from_sources(project_root, self.config_file.as_deref())?;
        debug!(store_dir = %config.store_dir(), "loaded config");
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the step tree of a single report
    Show {
        /// The report to show
        #[arg(value_name = "REPORT")]
        report: Utf8PathBuf,
    },

    /// Summarize every report in the store directory by feature and story
    Summary {
        /// Directory to load reports from [default: the configured store directory]
        #[arg(long, value_name = "DIR")]
        dir: Option<Utf8PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t, value_name = "FORMAT")]
        message_format: MessageFormat,

        /// Also write the JSON summary file into the report directory
        #[arg(long)]
        write: bool,
    },

    /// Load a report and write it back in canonical form
    ///
    /// Summary attributes (step counts and the overall result) are regenerated from the step
    /// tree.
    Rewrite {
        /// The report to rewrite
        #[arg(value_name = "REPORT")]
        report: Utf8PathBuf,

        /// Qualifier to append to the test's title and file name
        #[arg(long)]
        qualifier: Option<String>,

        /// Directory to write into [default: the report's directory]
        #[arg(long, value_name = "DIR")]
        out_dir: Option<Utf8PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
enum MessageFormat {
    /// Human-readable output
    #[default]
    Human,
    /// Pretty-printed JSON, in the same format as the summary file
    Json,
}

impl Command {
    fn exec(
        self,
        config: &AcceptanceConfig,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32> {
        match self {
            Command::Show { report } => exec_show(&report, config, output, output_writer),
            Command::Summary {
                dir,
                message_format,
                write,
            } => {
                let dir = dir.unwrap_or_else(|| config.store_dir());
                exec_summary(&dir, message_format, write, config, output, output_writer)
            }
            Command::Rewrite {
                report,
                qualifier,
                out_dir,
            } => exec_rewrite(&report, qualifier, out_dir, output, output_writer),
        }
    }
}

fn exec_show(
    report: &Utf8Path,
    config: &AcceptanceConfig,
    output: OutputContext,
    output_writer: &mut OutputWriter,
) -> Result<i32> {
    let outcome = load_report(report)?;
    let scheme = config.color_scheme().scheme();

    let mut out = String::new();
    display::write_outcome(
        &mut out,
        &outcome,
        scheme.as_ref(),
        &output.stdout_palette(),
        output.verbose,
    );

    output_writer.write_stdout(&out)?;
    Ok(0)
}

fn exec_summary(
    dir: &Utf8Path,
    message_format: MessageFormat,
    write: bool,
    config: &AcceptanceConfig,
    output: OutputContext,
    output_writer: &mut OutputWriter,
) -> Result<i32> {
    let outcomes = load_reports_from_dir(dir)?;
    if outcomes.is_empty() {
        return Err(ExpectedError::NoReportsFound {
            dir: dir.to_owned(),
        });
    }

    let scheme = config.color_scheme().scheme();
    let summary = ReportSummary::new(outcomes.into_iter().map(Arc::new), scheme.as_ref());

    let out = match message_format {
        MessageFormat::Human => {
            let mut out = String::new();
            display::write_summary(&mut out, &summary, &output.stdout_palette(), output.verbose);
            out
        }
        MessageFormat::Json => {
            let mut json = summary.to_json_string()?;
            json.push('\n');
            json
        }
    };

    output_writer.write_stdout(&out)?;

    if write {
        let path = dir.join(config.summary_file_name());
        summary.write_to_path(&path)?;
        write_status(output, output_writer, "Wrote summary to", &path)?;
    }

    Ok(0)
}

fn exec_rewrite(
    report: &Utf8Path,
    qualifier: Option<String>,
    out_dir: Option<Utf8PathBuf>,
    output: OutputContext,
    output_writer: &mut OutputWriter,
) -> Result<i32> {
    let outcome = load_report(report)?;

    let out_dir = out_dir
        .or_else(|| report.parent().map(ToOwned::to_owned))
        .unwrap_or_default();
    let mut reporter = XmlReporter::new(out_dir);
    reporter.set_qualifier(qualifier);
    let path = reporter.generate_report_for(&outcome)?;

    write_status(output, output_writer, "Rewrote", &path)?;
    Ok(0)
}

fn write_status(
    output: OutputContext,
    output_writer: &mut OutputWriter,
    verb: &str,
    path: &Utf8Path,
) -> Result<()> {
    let palette = output.stderr_palette();
    output_writer.write_stderr(&format!("{} {path}\n", verb.style(palette.bold)))?;
    Ok(())
}
