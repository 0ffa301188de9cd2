// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-story and per-feature summaries over many finished test outcomes.

use crate::{Feature, Story, TestOutcome, TestResult};
use indexmap::IndexMap;
use std::{iter::Sum, ops::AddAssign, sync::Arc};
use tracing::debug;

/// Test-level counts for an aggregate.
///
/// A test is counted as passing, failing or pending according to its rolled-up result. Skipped
/// and ignored tests count toward the total only.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TestCounts {
    /// Number of tests.
    pub total: usize,
    /// Tests whose result is `Success`.
    pub passing: usize,
    /// Tests whose result is `Failure` or `Error`.
    pub failing: usize,
    /// Tests whose result is `Pending`.
    pub pending: usize,
    /// Tests whose result is `Skipped`.
    pub skipped: usize,
    /// Tests whose result is `Ignored`.
    pub ignored: usize,
    /// Leaf steps across all tests.
    pub steps: usize,
    /// Leaf steps across passing tests only.
    pub steps_in_successful_tests: usize,
}

impl TestCounts {
    /// Adds a single test outcome to these counts.
    pub fn record(&mut self, outcome: &TestOutcome) -> &mut Self {
        let steps = outcome.total_steps();
        self.total += 1;
        self.steps += steps;
        match outcome.result() {
            TestResult::Success => {
                self.passing += 1;
                self.steps_in_successful_tests += steps;
            }
            TestResult::Failure | TestResult::Error => self.failing += 1,
            TestResult::Pending => self.pending += 1,
            TestResult::Skipped => self.skipped += 1,
            TestResult::Ignored => self.ignored += 1,
        }
        self
    }
}

impl AddAssign for TestCounts {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.passing += other.passing;
        self.failing += other.failing;
        self.pending += other.pending;
        self.skipped += other.skipped;
        self.ignored += other.ignored;
        self.steps += other.steps;
        self.steps_in_successful_tests += other.steps_in_successful_tests;
    }
}

impl Sum for TestCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(TestCounts::default(), |mut acc, counts| {
            acc += counts;
            acc
        })
    }
}

/// An aggregate over a number of tests.
///
/// Every count is derived from [`counts`](Self::counts).
pub trait TestTally {
    /// Folds the aggregate into test-level counts.
    fn counts(&self) -> TestCounts;

    /// Returns the number of tests.
    fn total_tests(&self) -> usize {
        self.counts().total
    }

    /// Returns the number of passing tests.
    fn passing_tests(&self) -> usize {
        self.counts().passing
    }

    /// Returns the number of failing tests, errors included.
    fn failing_tests(&self) -> usize {
        self.counts().failing
    }

    /// Returns the number of pending tests.
    fn pending_tests(&self) -> usize {
        self.counts().pending
    }

    /// Returns the number of skipped tests.
    fn skipped_tests(&self) -> usize {
        self.counts().skipped
    }

    /// Returns the number of ignored tests.
    fn ignored_tests(&self) -> usize {
        self.counts().ignored
    }

    /// Returns the number of leaf steps across all tests.
    fn total_steps(&self) -> usize {
        self.counts().steps
    }

    /// Returns the number of leaf steps across passing tests only.
    fn count_steps_in_successful_tests(&self) -> usize {
        self.counts().steps_in_successful_tests
    }
}

impl TestTally for TestCounts {
    fn counts(&self) -> TestCounts {
        *self
    }
}

/// The test outcomes recorded for one story, in recording order.
#[derive(Clone, Debug)]
pub struct StoryTestResults {
    story: Story,
    outcomes: Vec<Arc<TestOutcome>>,
}

impl StoryTestResults {
    /// Creates an empty set of results for `story`.
    pub fn new(story: Story) -> Self {
        Self {
            story,
            outcomes: Vec::new(),
        }
    }

    /// Returns the story.
    pub fn story(&self) -> &Story {
        &self.story
    }

    /// Returns the title of the story, which is its human-readable name.
    pub fn title(&self) -> &str {
        self.story.name()
    }

    /// Appends an outcome.
    pub fn record(&mut self, outcome: impl Into<Arc<TestOutcome>>) -> &mut Self {
        self.outcomes.push(outcome.into());
        self
    }

    /// Returns the recorded outcomes, in recording order.
    pub fn outcomes(&self) -> &[Arc<TestOutcome>] {
        &self.outcomes
    }

    /// Returns the worst result across the recorded outcomes.
    pub fn result(&self) -> TestResult {
        TestResult::rollup(self.outcomes.iter().map(|outcome| outcome.result()))
    }

    /// Splits outcomes into per-story results, in the order each story is first seen.
    ///
    /// Outcomes that do not belong to a story are dropped.
    pub fn group_by_story(
        outcomes: impl IntoIterator<Item = Arc<TestOutcome>>,
    ) -> Vec<StoryTestResults> {
        let mut by_story: IndexMap<Story, StoryTestResults> = IndexMap::new();
        for outcome in outcomes {
            let Some(story) = outcome.story().cloned() else {
                debug!(title = outcome.title(), "skipping test outcome without a story");
                continue;
            };
            by_story
                .entry(story)
                .or_insert_with_key(|story| StoryTestResults::new(story.clone()))
                .record(outcome);
        }
        by_story.into_values().collect()
    }
}

impl TestTally for StoryTestResults {
    fn counts(&self) -> TestCounts {
        let mut counts = TestCounts::default();
        for outcome in &self.outcomes {
            counts.record(outcome);
        }
        counts
    }
}

/// The story results recorded for one feature, in recording order.
#[derive(Clone, Debug)]
pub struct FeatureResults {
    feature: Feature,
    stories: Vec<StoryTestResults>,
}

impl FeatureResults {
    /// Creates an empty set of results for `feature`.
    pub fn new(feature: Feature) -> Self {
        Self {
            feature,
            stories: Vec::new(),
        }
    }

    /// Returns the feature.
    pub fn feature(&self) -> &Feature {
        &self.feature
    }

    /// Appends the results of one story.
    pub fn record_story_results(&mut self, story_results: StoryTestResults) -> &mut Self {
        self.stories.push(story_results);
        self
    }

    /// Returns the recorded story results, in recording order.
    pub fn story_results(&self) -> &[StoryTestResults] {
        &self.stories
    }

    /// Returns the number of recorded stories.
    pub fn total_stories(&self) -> usize {
        self.stories.len()
    }

    /// Splits story results into per-feature results, in the order each feature is first seen.
    ///
    /// Stories that do not belong to a feature are dropped.
    pub fn group_by_feature(
        stories: impl IntoIterator<Item = StoryTestResults>,
    ) -> Vec<FeatureResults> {
        let mut by_feature: IndexMap<Feature, FeatureResults> = IndexMap::new();
        for story_results in stories {
            let Some(feature) = story_results.story().feature().cloned() else {
                debug!(
                    story = story_results.story().id(),
                    "skipping story without a feature"
                );
                continue;
            };
            by_feature
                .entry(feature)
                .or_insert_with_key(|feature| FeatureResults::new(feature.clone()))
                .record_story_results(story_results);
        }
        by_feature.into_values().collect()
    }
}

impl TestTally for FeatureResults {
    fn counts(&self) -> TestCounts {
        self.stories.iter().map(TestTally::counts).sum()
    }
}
