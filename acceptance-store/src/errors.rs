// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the report store.

use acceptance_report::errors::{DeserializeError, RecordingError, SerializeError};
use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use std::io;
use thiserror::Error;

/// An error that occurred while parsing the config.
#[derive(Debug, Error)]
#[error("failed to parse acceptance config at `{config_file}`")]
#[non_exhaustive]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing the config.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// An error occurred while building the config: a file could not be read, or was not valid
    /// TOML.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// An error occurred while deserializing the config into its typed form.
    #[error("error at `{}`", .0.path())]
    DeserializeError(#[source] Box<serde_path_to_error::Error<ConfigError>>),
}

/// An error that occurred while writing an XML report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteReportError {
    /// The output directory could not be created.
    #[error("error creating report directory `{dir}`")]
    CreateDir {
        /// The directory that could not be created.
        dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The test outcome could not be serialized.
    #[error("error serializing report to `{path}`")]
    Serialize {
        /// The report path.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: SerializeError,
    },

    /// The report file could not be written.
    #[error("error writing report to `{path}`")]
    Write {
        /// The report path.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: atomicwrites::Error<io::Error>,
    },
}

/// An error that occurred while loading XML reports.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadReportError {
    /// A report file could not be opened.
    #[error("error opening report `{path}`")]
    Open {
        /// The report path.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// A report directory could not be read.
    #[error("error reading report directory `{dir}`")]
    ReadDir {
        /// The report directory.
        dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// A report file is not a valid report.
    #[error("error reading report `{path}`")]
    Deserialize {
        /// The report path.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: DeserializeError,
    },
}

/// An error that occurred while writing a JSON summary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteSummaryError {
    /// The summary could not be serialized.
    #[error("error serializing summary")]
    Serialize(#[source] serde_json::Error),

    /// The directory for the summary could not be created.
    #[error("error creating summary directory `{dir}`")]
    CreateDir {
        /// The directory that could not be created.
        dir: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The summary file could not be written.
    #[error("error writing summary to `{path}`")]
    Write {
        /// The summary path.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: atomicwrites::Error<io::Error>,
    },
}

/// An error returned by an [`OutcomeRecorder`](crate::OutcomeRecorder).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ListenerError {
    /// An event that needs a running test arrived while no test was running.
    #[error("`{event}` received while no test is running")]
    NoTestRunning {
        /// The event that was received.
        event: &'static str,
    },

    /// The step recording protocol was violated.
    #[error("error recording test steps")]
    Recording(#[from] RecordingError),

    /// The report for a finished test could not be written.
    #[error("error writing report for finished test")]
    WriteReport(#[from] WriteReportError),
}
