// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{Feature, Story, TestOutcome, naming::normalize};
use std::fmt;

/// The kind of report a file name is generated for.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReportType {
    /// An XML report, as written by [`TestOutcome::serialize`].
    Xml,

    /// An HTML report produced by an external renderer.
    Html,
}

impl ReportType {
    /// Returns the file extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ReportType::Xml => "xml",
            ReportType::Html => "html",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Generates report file names from test outcomes, stories and features.
#[derive(Copy, Clone, Debug)]
pub struct ReportNamer {
    report_type: ReportType,
}

impl ReportNamer {
    /// Creates a namer for the given report type.
    pub fn new(report_type: ReportType) -> Self {
        Self { report_type }
    }

    /// Returns the report type.
    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    /// Returns the file name for a test outcome's report: the normalized qualified name.
    pub fn report_name_for(&self, outcome: &TestOutcome, qualifier: Option<&str>) -> String {
        self.with_extension(normalize(&outcome.qualified_name(qualifier)))
    }

    /// Returns the file name for a story's report.
    pub fn report_name_for_story(&self, story: &Story) -> String {
        self.with_extension(normalize(story.name()))
    }

    /// Returns the file name for a feature's report.
    pub fn report_name_for_feature(&self, feature: &Feature) -> String {
        self.with_extension(normalize(feature.name()))
    }

    /// Returns the file name for the report listing a feature's stories.
    pub fn story_list_name_for_feature(&self, feature: &Feature) -> String {
        format!("stories_{}", self.report_name_for_feature(feature))
    }

    fn with_extension(&self, name: String) -> String {
        format!("{name}.{}", self.report_type.extension())
    }
}
