// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, Palette};
use acceptance_store::errors::{
    ConfigParseError, ConfigParseErrorKind, LoadReportError, WriteReportError, WriteSummaryError,
};
use camino::{FromPathBufError, Utf8PathBuf};
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

/// Documented exit codes for `acceptance` failures.
///
/// Unknown or unexpected failures always result in exit code 1.
pub enum AcceptanceExitCode {}

impl AcceptanceExitCode {
    /// No errors occurred and the command exited normally.
    pub const OK: i32 = 0;

    /// A user issue happened while setting up the invocation, for example an invalid config.
    pub const SETUP_ERROR: i32 = 96;

    /// A report could not be loaded.
    pub const LOAD_REPORT_FAILED: i32 = 97;

    /// A report or summary could not be written.
    pub const WRITE_REPORT_FAILED: i32 = 98;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected failure of an `acceptance` command.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine current directory")]
    CurrentDirFailed {
        #[source]
        err: std::io::Error,
    },
    #[error("current directory is not valid UTF-8")]
    CurrentDirInvalidUtf8 {
        #[source]
        err: FromPathBufError,
    },
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("report load error")]
    LoadReportError {
        #[from]
        err: LoadReportError,
    },
    #[error("no reports found")]
    NoReportsFound { dir: Utf8PathBuf },
    #[error("report write error")]
    WriteReportError {
        #[from]
        err: WriteReportError,
    },
    #[error("summary write error")]
    WriteSummaryError {
        #[from]
        err: WriteSummaryError,
    },
    #[error("error writing to output")]
    WriteError {
        #[from]
        err: std::io::Error,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirFailed { .. }
            | Self::CurrentDirInvalidUtf8 { .. }
            | Self::ConfigParseError { .. } => AcceptanceExitCode::SETUP_ERROR,
            Self::LoadReportError { .. } | Self::NoReportsFound { .. } => {
                AcceptanceExitCode::LOAD_REPORT_FAILED
            }
            Self::WriteReportError { .. } | Self::WriteSummaryError { .. } => {
                AcceptanceExitCode::WRITE_REPORT_FAILED
            }
            Self::WriteError { .. } => AcceptanceExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &Palette) {
        let mut next_error = match &self {
            Self::CurrentDirFailed { err } => {
                error!("could not determine current directory");
                Some(err as &dyn Error)
            }
            Self::CurrentDirInvalidUtf8 { err } => {
                error!(
                    "current directory `{}` is not valid UTF-8 (hint: pass in --project-root)",
                    err.as_path().display().style(styles.bold)
                );
                None
            }
            Self::ConfigParseError { err } => {
                match err.kind() {
                    ConfigParseErrorKind::BuildError(build_error) => {
                        error!(
                            "failed to read config file `{}`",
                            err.config_file().style(styles.bold)
                        );
                        Some(&**build_error as &dyn Error)
                    }
                    ConfigParseErrorKind::DeserializeError(de_error) => {
                        error!(
                            "failed to parse config file `{}` at key `{}`",
                            err.config_file().style(styles.bold),
                            de_error.path().style(styles.bold),
                        );
                        Some(de_error.inner() as &dyn Error)
                    }
                    // ConfigParseErrorKind is non-exhaustive.
                    other => {
                        error!("{err}");
                        Some(other as &dyn Error)
                    }
                }
            }
            Self::LoadReportError { err } => {
                error!("{err}");
                err.source()
            }
            Self::NoReportsFound { dir } => {
                error!(
                    "no reports found in `{}` (hint: reports are files with the `{}` extension)",
                    dir.style(styles.bold),
                    ".xml".style(styles.bold),
                );
                None
            }
            Self::WriteReportError { err } => {
                error!("{err}");
                err.source()
            }
            Self::WriteSummaryError { err } => {
                error!("{err}");
                err.source()
            }
            Self::WriteError { err } => {
                error!("failed to write to output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(
                target: NO_HEADING_TARGET,
                "\n{}\n  {}",
                "Caused by:".style(styles.warning),
                err
            );
            next_error = err.source();
        }
    }
}
