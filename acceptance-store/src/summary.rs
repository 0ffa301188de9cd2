// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A machine-readable summary of a set of test outcomes, grouped by feature and story.

use crate::errors::WriteSummaryError;
use acceptance_report::{
    ColorScheme, FeatureResults, ReportNamer, ReportType, Rgb, StoryTestResults, TestCounts,
    TestOutcome, TestTally,
};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::Utf8Path;
use serde::{Serialize, Serializer};
use std::{fs, io::Write, sync::Arc};
use tracing::debug;

/// A summary of a set of test outcomes, serializable as JSON.
///
/// Stories that do not belong to a feature are listed under `unassigned-stories`. Outcomes that
/// do not belong to a story only count toward the totals.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportSummary {
    /// Counts across every outcome.
    pub totals: SummaryCounts,

    /// The presentation color for the totals, as `#rrggbb`.
    #[serde(serialize_with = "serialize_color")]
    pub color: Rgb,

    /// Per-feature summaries, in the order each feature was first seen.
    pub features: Vec<FeatureSummary>,

    /// Stories that do not belong to a feature.
    pub unassigned_stories: Vec<StorySummary>,

    /// The number of outcomes that do not belong to a story.
    pub tests_without_story: usize,
}

/// Test counts in a [`ReportSummary`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SummaryCounts {
    /// Number of tests.
    pub tests: usize,
    /// Tests that passed.
    pub passing: usize,
    /// Tests that failed or hit an error.
    pub failing: usize,
    /// Tests that are pending.
    pub pending: usize,
    /// Tests that were skipped.
    pub skipped: usize,
    /// Tests that were ignored.
    pub ignored: usize,
    /// Leaf steps across all tests.
    pub steps: usize,
    /// Leaf steps across passing tests.
    pub steps_in_successful_tests: usize,
}

impl From<TestCounts> for SummaryCounts {
    fn from(counts: TestCounts) -> Self {
        Self {
            tests: counts.total,
            passing: counts.passing,
            failing: counts.failing,
            pending: counts.pending,
            skipped: counts.skipped,
            ignored: counts.ignored,
            steps: counts.steps,
            steps_in_successful_tests: counts.steps_in_successful_tests,
        }
    }
}

/// The summary of one feature.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeatureSummary {
    /// The feature's id.
    pub id: String,
    /// The feature's human-readable name.
    pub name: String,
    /// File name of the HTML page listing this feature's stories.
    pub story_list: String,
    /// Counts across the feature's stories.
    pub counts: SummaryCounts,
    /// The presentation color, as `#rrggbb`.
    #[serde(serialize_with = "serialize_color")]
    pub color: Rgb,
    /// The feature's stories, in the order they were first seen.
    pub stories: Vec<StorySummary>,
}

/// The summary of one story.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorySummary {
    /// The story's id.
    pub id: String,
    /// The story's human-readable name.
    pub name: String,
    /// File name of this story's HTML report.
    pub report: String,
    /// The worst result across the story's tests.
    pub result: &'static str,
    /// Counts across the story's tests.
    pub counts: SummaryCounts,
    /// The presentation color, as `#rrggbb`.
    #[serde(serialize_with = "serialize_color")]
    pub color: Rgb,
    /// The story's tests, in recording order.
    pub tests: Vec<TestSummary>,
}

/// The summary of one test outcome.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestSummary {
    /// The test's title.
    pub title: String,
    /// The test's rolled-up result.
    pub result: &'static str,
    /// The number of leaf steps.
    pub steps: usize,
    /// The color for the result, as `#rrggbb`.
    #[serde(serialize_with = "serialize_color")]
    pub color: Rgb,
}

impl ReportSummary {
    /// Builds a summary from a set of outcomes, coloring every level with `scheme`.
    pub fn new(
        outcomes: impl IntoIterator<Item = Arc<TestOutcome>>,
        scheme: &dyn ColorScheme,
    ) -> Self {
        let outcomes: Vec<_> = outcomes.into_iter().collect();
        let mut totals = TestCounts::default();
        for outcome in &outcomes {
            totals.record(outcome);
        }
        let tests_without_story = outcomes.iter().filter(|o| o.story().is_none()).count();

        let namer = ReportNamer::new(ReportType::Html);
        let (assigned, unassigned): (Vec<_>, Vec<_>) =
            StoryTestResults::group_by_story(outcomes)
                .into_iter()
                .partition(|story| story.story().feature().is_some());

        let features = FeatureResults::group_by_feature(assigned)
            .iter()
            .map(|feature| FeatureSummary {
                id: feature.feature().id().to_owned(),
                name: feature.feature().name().to_owned(),
                story_list: namer.story_list_name_for_feature(feature.feature()),
                counts: feature.counts().into(),
                color: scheme.color_for_tally(feature),
                stories: feature
                    .story_results()
                    .iter()
                    .map(|story| StorySummary::new(story, &namer, scheme))
                    .collect(),
            })
            .collect();
        let unassigned_stories = unassigned
            .iter()
            .map(|story| StorySummary::new(story, &namer, scheme))
            .collect();

        Self {
            totals: totals.into(),
            color: scheme.color_for_tally(&totals),
            features,
            unassigned_stories,
            tests_without_story,
        }
    }

    /// Serializes this summary as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, WriteSummaryError> {
        serde_json::to_string_pretty(self).map_err(WriteSummaryError::Serialize)
    }

    /// Writes this summary as JSON to `path`, creating its parent directory if necessary.
    pub fn write_to_path(&self, path: &Utf8Path) -> Result<(), WriteSummaryError> {
        let json = self.to_json_string()?;
        if let Some(dir) = path.parent().filter(|dir| !dir.as_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|error| WriteSummaryError::CreateDir {
                dir: dir.to_owned(),
                error,
            })?;
        }

        AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
            .write(|file| {
                file.write_all(json.as_bytes())?;
                file.write_all(b"\n")
            })
            .map_err(|error| WriteSummaryError::Write {
                path: path.to_owned(),
                error,
            })?;

        debug!(%path, "wrote summary");
        Ok(())
    }
}

fn serialize_color<S: Serializer>(color: &Rgb, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(color)
}

impl StorySummary {
    fn new(results: &StoryTestResults, namer: &ReportNamer, scheme: &dyn ColorScheme) -> Self {
        Self {
            id: results.story().id().to_owned(),
            name: results.title().to_owned(),
            report: namer.report_name_for_story(results.story()),
            result: results.result().as_str(),
            counts: results.counts().into(),
            color: scheme.color_for_tally(results),
            tests: results
                .outcomes()
                .iter()
                .map(|outcome| TestSummary {
                    title: outcome.title().to_owned(),
                    result: outcome.result().as_str(),
                    steps: outcome.total_steps(),
                    color: scheme.color_for_result(outcome.result()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acceptance_report::{
        ConcreteTestStep, Feature, RelativeSizeColorScheme, Story, TestResult,
    };
    use camino_tempfile::Utf8TempDir;
    use pretty_assertions::assert_eq;

    fn outcome(method_name: &str, story: Option<&Story>, result: TestResult) -> Arc<TestOutcome> {
        let mut outcome = TestOutcome::for_method(method_name);
        if let Some(story) = story {
            outcome.set_story(story.clone());
        }
        outcome.record_step(ConcreteTestStep::new("step 1", TestResult::Success));
        outcome.record_step(ConcreteTestStep::new("step 2", result));
        Arc::new(outcome)
    }

    fn summary() -> ReportSummary {
        let widgets = Feature::new("app.features.Widgets", "Widgets");
        let buy = Story::with_feature("app.stories.BuyWidget", "Buy widget", widgets);
        let loose = Story::with_id("app.stories.Loose", "Loose story");

        let outcomes = vec![
            outcome("should_pay", Some(&buy), TestResult::Success),
            outcome("should_refund", Some(&buy), TestResult::Failure),
            outcome("should_wander", Some(&loose), TestResult::Success),
            outcome("should_wait", None, TestResult::Pending),
        ];
        ReportSummary::new(outcomes, &RelativeSizeColorScheme::new())
    }

    #[test]
    fn groups_and_counts() {
        let summary = summary();
        assert_eq!(
            summary.totals,
            SummaryCounts {
                tests: 4,
                passing: 2,
                failing: 1,
                pending: 1,
                skipped: 0,
                ignored: 0,
                steps: 8,
                steps_in_successful_tests: 4,
            }
        );
        assert_eq!(summary.color, Rgb::new(255, 215, 16));
        assert_eq!(summary.tests_without_story, 1);

        assert_eq!(summary.features.len(), 1);
        let feature = &summary.features[0];
        assert_eq!(feature.name, "Widgets");
        assert_eq!(feature.story_list, "stories_widgets.html");
        assert_eq!(feature.color.to_string(), "#ffaa00");

        let story = &feature.stories[0];
        assert_eq!(story.report, "buy_widget.html");
        assert_eq!(story.result, "FAILURE");
        let titles: Vec<_> = story.tests.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Should pay", "Should refund"]);
        assert_eq!(story.tests[1].color, Rgb::RED);

        assert_eq!(summary.unassigned_stories.len(), 1);
        assert_eq!(summary.unassigned_stories[0].name, "Loose story");
        assert_eq!(summary.unassigned_stories[0].color, Rgb::GREEN);
    }

    #[test]
    fn json_uses_kebab_case() {
        let json = summary().to_json_string().expect("summary serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

        assert_eq!(value["totals"]["steps-in-successful-tests"], 4);
        assert_eq!(value["tests-without-story"], 1);
        assert_eq!(
            value["features"][0]["stories"][0]["tests"][0]["title"],
            "Should pay"
        );
        assert_eq!(value["unassigned-stories"][0]["id"], "app.stories.Loose");
        assert_eq!(value["features"][0]["color"], "#ffaa00");
    }

    #[test]
    fn empty_summary_is_black() {
        let summary = ReportSummary::new(Vec::new(), &RelativeSizeColorScheme::new());
        assert_eq!(summary.totals, SummaryCounts::default());
        assert_eq!(summary.color, Rgb::BLACK);
        assert!(summary.features.is_empty());
    }

    #[test]
    fn write_creates_directory() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let path = dir.path().join("nested/summary.json");
        summary().write_to_path(&path).expect("summary written");

        let contents = fs::read_to_string(&path).expect("summary readable");
        assert!(contents.ends_with("}\n"), "contents: {contents}");
        let value: serde_json::Value = serde_json::from_str(&contents).expect("valid JSON");
        assert_eq!(value["totals"]["tests"], 4);
    }
}
