// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writing and loading XML reports on disk.

use crate::{
    config::AcceptanceConfig,
    errors::{LoadReportError, WriteReportError},
};
use acceptance_report::{ReportNamer, ReportType, TestOutcome};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::{Utf8Path, Utf8PathBuf};
use std::{
    fs,
    io::{BufReader, Write},
};
use tracing::debug;

/// Writes test outcomes as XML reports into a directory, one file per outcome.
#[derive(Clone, Debug)]
pub struct XmlReporter {
    output_dir: Utf8PathBuf,
    qualifier: Option<String>,
    namer: ReportNamer,
}

impl XmlReporter {
    /// Creates a new reporter writing into `output_dir`.
    pub fn new(output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            qualifier: None,
            namer: ReportNamer::new(ReportType::Xml),
        }
    }

    /// Creates a new reporter writing into the configured store directory, with the configured
    /// qualifier.
    pub fn from_config(config: &AcceptanceConfig) -> Self {
        let mut reporter = Self::new(config.store_dir());
        reporter.set_qualifier(config.qualifier().map(ToOwned::to_owned));
        reporter
    }

    /// Returns the output directory.
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    /// Returns the qualifier applied to written reports, if any.
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Sets the qualifier applied to written reports.
    pub fn set_qualifier(&mut self, qualifier: Option<String>) -> &mut Self {
        self.qualifier = qualifier;
        self
    }

    /// Returns the path that the report for `outcome` is written to.
    pub fn report_path_for(&self, outcome: &TestOutcome) -> Utf8PathBuf {
        self.output_dir
            .join(self.namer.report_name_for(outcome, self.qualifier.as_deref()))
    }

    /// Writes the report for `outcome`, replacing any existing report with the same name.
    ///
    /// The file is written atomically: readers either see the previous report or the new one.
    pub fn generate_report_for(
        &self,
        outcome: &TestOutcome,
    ) -> Result<Utf8PathBuf, WriteReportError> {
        fs::create_dir_all(&self.output_dir).map_err(|error| WriteReportError::CreateDir {
            dir: self.output_dir.clone(),
            error,
        })?;

        let path = self.report_path_for(outcome);
        let xml = outcome
            .to_xml_string(self.qualifier.as_deref())
            .map_err(|error| WriteReportError::Serialize {
                path: path.clone(),
                error,
            })?;

        AtomicFile::new(&path, OverwriteBehavior::AllowOverwrite)
            .write(|file| file.write_all(xml.as_bytes()))
            .map_err(|error| WriteReportError::Write {
                path: path.clone(),
                error,
            })?;

        debug!(%path, title = outcome.title(), "wrote report");
        Ok(path)
    }

    /// Writes the reports for several outcomes, returning the paths written in order.
    pub fn generate_reports_for<'a>(
        &self,
        outcomes: impl IntoIterator<Item = &'a TestOutcome>,
    ) -> Result<Vec<Utf8PathBuf>, WriteReportError> {
        outcomes
            .into_iter()
            .map(|outcome| self.generate_report_for(outcome))
            .collect()
    }
}

/// Loads a single XML report.
pub fn load_report(path: &Utf8Path) -> Result<TestOutcome, LoadReportError> {
    let file = fs::File::open(path).map_err(|error| LoadReportError::Open {
        path: path.to_owned(),
        error,
    })?;
    let outcome = TestOutcome::deserialize(BufReader::new(file)).map_err(|error| {
        LoadReportError::Deserialize {
            path: path.to_owned(),
            error,
        }
    })?;

    debug!(%path, title = outcome.title(), "loaded report");
    Ok(outcome)
}

/// Loads every `.xml` report in `dir`, in file name order.
///
/// Other files and subdirectories are skipped. A single invalid report fails the whole load.
pub fn load_reports_from_dir(dir: &Utf8Path) -> Result<Vec<TestOutcome>, LoadReportError> {
    let read_dir_err = |error| LoadReportError::ReadDir {
        dir: dir.to_owned(),
        error,
    };

    let mut paths = Vec::new();
    for entry in dir.read_dir_utf8().map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let path = entry.path();
        let is_file = entry.file_type().map_err(read_dir_err)?.is_file();
        if is_file && path.extension() == Some("xml") {
            paths.push(path.to_owned());
        } else {
            debug!(%path, "skipping non-report entry");
        }
    }
    paths.sort_unstable();

    paths.iter().map(|path| load_report(path)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use acceptance_report::{ConcreteTestStep, TestResult};
    use camino_tempfile::Utf8TempDir;
    use pretty_assertions::assert_eq;

    fn outcome(method_name: &str, result: TestResult) -> TestOutcome {
        let mut outcome = TestOutcome::for_method(method_name);
        outcome.record_step(ConcreteTestStep::new("step 1", result));
        outcome
    }

    #[test]
    fn write_then_load() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let reporter = XmlReporter::new(dir.path().join("reports"));

        let original = outcome("should_do_this", TestResult::Pending);
        let path = reporter
            .generate_report_for(&original)
            .expect("report written");
        assert_eq!(path, dir.path().join("reports/should_do_this.xml"));

        let loaded = load_report(&path).expect("report loaded");
        assert_eq!(loaded.title(), "Should do this");
        assert_eq!(loaded.steps(), original.steps());
    }

    #[test]
    fn qualified_reports_get_qualified_names() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let mut reporter = XmlReporter::new(dir.path());
        reporter.set_qualifier(Some("firefox linux".to_owned()));

        let path = reporter
            .generate_report_for(&outcome("should_do_this", TestResult::Success))
            .expect("report written");
        assert_eq!(path.file_name(), Some("should_do_this_firefox_linux.xml"));

        let loaded = load_report(&path).expect("report loaded");
        assert_eq!(loaded.title(), "Should do this [firefox linux]");
    }

    #[test]
    fn rewriting_overwrites() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let reporter = XmlReporter::new(dir.path());

        reporter
            .generate_report_for(&outcome("a_test", TestResult::Failure))
            .expect("first report written");
        let path = reporter
            .generate_report_for(&outcome("a_test", TestResult::Success))
            .expect("second report written");

        let loaded = load_report(&path).expect("report loaded");
        assert_eq!(loaded.result(), TestResult::Success);
    }

    #[test]
    fn load_directory_in_name_order() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let reporter = XmlReporter::new(dir.path());
        let written = reporter
            .generate_reports_for(&[
                outcome("c_test", TestResult::Success),
                outcome("a_test", TestResult::Failure),
                outcome("b_test", TestResult::Pending),
            ])
            .expect("reports written");
        assert_eq!(written.len(), 3);

        fs::write(dir.path().join("summary.json"), "{}").expect("wrote non-report file");
        fs::create_dir(dir.path().join("nested.xml")).expect("created directory");

        let loaded = load_reports_from_dir(dir.path()).expect("reports loaded");
        let names: Vec<_> = loaded
            .iter()
            .map(|outcome| outcome.method_name().unwrap_or_default())
            .collect();
        assert_eq!(names, ["a_test", "b_test", "c_test"]);
    }

    #[test]
    fn invalid_report_fails_load() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let path = dir.path().join("broken.xml");
        fs::write(&path, "<testsuites/>").expect("wrote broken report");

        let error = load_reports_from_dir(dir.path()).expect_err("broken report fails");
        match error {
            LoadReportError::Deserialize { path: error_path, .. } => {
                assert_eq!(error_path, path);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_directory_fails_load() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let missing = dir.path().join("missing");
        let error = load_reports_from_dir(&missing).expect_err("missing dir fails");
        assert!(
            matches!(error, LoadReportError::ReadDir { .. }),
            "unexpected error: {error:?}"
        );
    }
}
