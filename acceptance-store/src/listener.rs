// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning test execution events into test outcomes.

use crate::{errors::ListenerError, reporter::XmlReporter};
use acceptance_report::{ConcreteTestStep, Story, TestOutcome, TestResult};
use camino::Utf8Path;
use std::mem;
use tracing::{debug, warn};

/// Receives events from a test runner as tests and their steps execute.
///
/// Step events always refer to the test started by the latest
/// [`test_started`](Self::test_started) call.
pub trait StepListener {
    /// A test has started.
    fn test_started(&mut self, method_name: &str, story: Option<Story>);

    /// A group of steps has started. Further steps nest inside it until the matching
    /// [`step_group_finished`](Self::step_group_finished).
    fn step_group_started(&mut self, name: &str);

    /// The innermost group of steps has finished.
    fn step_group_finished(&mut self) -> Result<(), ListenerError>;

    /// A step has finished, with a result other than a failure.
    fn step_finished(&mut self, description: &str, result: TestResult);

    /// A step has failed or hit an error.
    ///
    /// `result` should be `Failure` or `Error`; any other result is recorded without the failure
    /// message.
    fn step_failed(
        &mut self,
        description: &str,
        result: TestResult,
        message: &str,
        detail: Option<&str>,
    );

    /// A screenshot was taken after the latest step.
    fn screenshot_taken(&mut self, path: &Utf8Path);

    /// The current test exercises a requirement.
    fn requirement_tested(&mut self, id: &str);

    /// The current test has finished.
    fn test_finished(&mut self) -> Result<(), ListenerError>;
}

/// A [`StepListener`] that records events into [`TestOutcome`] instances.
///
/// When a reporter is attached, the report for each finished test is written as soon as the
/// test finishes.
#[derive(Debug, Default)]
pub struct OutcomeRecorder {
    current: Option<TestOutcome>,
    finished: Vec<TestOutcome>,
    reporter: Option<XmlReporter>,
}

impl OutcomeRecorder {
    /// Creates a new recorder that only keeps outcomes in memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new recorder that writes a report for every finished test.
    pub fn with_reporter(reporter: XmlReporter) -> Self {
        Self {
            reporter: Some(reporter),
            ..Self::default()
        }
    }

    /// Returns the outcome of the test that is currently running, if any.
    pub fn current_outcome(&self) -> Option<&TestOutcome> {
        self.current.as_ref()
    }

    /// Returns the outcomes of the finished tests, in the order they finished.
    pub fn finished_outcomes(&self) -> &[TestOutcome] {
        &self.finished
    }

    /// Takes the outcomes of the finished tests out of this recorder.
    pub fn take_finished(&mut self) -> Vec<TestOutcome> {
        mem::take(&mut self.finished)
    }

    fn current_mut(&mut self, event: &'static str) -> Option<&mut TestOutcome> {
        if self.current.is_none() {
            warn!("ignoring `{event}`: no test is running");
        }
        self.current.as_mut()
    }
}

impl StepListener for OutcomeRecorder {
    fn test_started(&mut self, method_name: &str, story: Option<Story>) {
        if let Some(unfinished) = self.current.take() {
            warn!(
                title = unfinished.title(),
                "test started before the previous test finished, discarding its outcome"
            );
        }

        let mut outcome = TestOutcome::for_method(method_name);
        if let Some(story) = story {
            outcome.set_story(story);
        }
        debug!(title = outcome.title(), "test started");
        self.current = Some(outcome);
    }

    fn step_group_started(&mut self, name: &str) {
        if let Some(outcome) = self.current_mut("step_group_started") {
            outcome.start_group(name);
        }
    }

    fn step_group_finished(&mut self) -> Result<(), ListenerError> {
        let outcome = self
            .current
            .as_mut()
            .ok_or(ListenerError::NoTestRunning {
                event: "step_group_finished",
            })?;
        outcome.end_group()?;
        Ok(())
    }

    fn step_finished(&mut self, description: &str, result: TestResult) {
        if let Some(outcome) = self.current_mut("step_finished") {
            outcome.record_step(ConcreteTestStep::new(description, result));
        }
    }

    fn step_failed(
        &mut self,
        description: &str,
        result: TestResult,
        message: &str,
        detail: Option<&str>,
    ) {
        if let Some(outcome) = self.current_mut("step_failed") {
            let mut step = ConcreteTestStep::new(description, result);
            step.set_failure(message, detail.map(ToOwned::to_owned));
            outcome.record_step(step);
        }
    }

    fn screenshot_taken(&mut self, path: &Utf8Path) {
        let Some(outcome) = self.current_mut("screenshot_taken") else {
            return;
        };

        // Attach to the latest step at the current level, or to the open group if it has no
        // steps yet.
        if let Some(step) = outcome.last_step_mut() {
            step.set_screenshot(path);
        } else if let Some(group) = outcome.current_group_mut() {
            group.set_screenshot(path);
        } else {
            debug!(%path, "screenshot taken before any step was recorded, ignoring");
        }
    }

    fn requirement_tested(&mut self, id: &str) {
        if let Some(outcome) = self.current_mut("requirement_tested") {
            outcome.tests_requirement(id);
        }
    }

    fn test_finished(&mut self) -> Result<(), ListenerError> {
        let mut outcome = self.current.take().ok_or(ListenerError::NoTestRunning {
            event: "test_finished",
        })?;

        let finish_result = outcome.finish();
        debug!(
            title = outcome.title(),
            result = %outcome.result(),
            steps = outcome.total_steps(),
            "test finished"
        );

        let write_result = match &self.reporter {
            Some(reporter) => reporter.generate_report_for(&outcome).map(|_| ()),
            None => Ok(()),
        };
        self.finished.push(outcome);

        finish_result?;
        write_result?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::load_report;
    use acceptance_report::Feature;
    use camino_tempfile::Utf8TempDir;
    use pretty_assertions::assert_eq;

    fn story() -> Story {
        Story::with_feature(
            "app.stories.PurchaseWidget",
            "Purchase widget",
            Feature::new("app.features.Widgets", "Widgets"),
        )
    }

    #[test]
    fn records_steps_and_groups() {
        let mut recorder = OutcomeRecorder::new();
        recorder.test_started("should_buy_a_widget", Some(story()));
        recorder.requirement_tested("12");
        recorder.step_finished("open the catalog", TestResult::Success);
        recorder.screenshot_taken(Utf8Path::new("step_1.png"));
        recorder.step_group_started("Checkout");
        recorder.screenshot_taken(Utf8Path::new("checkout.png"));
        recorder.step_failed(
            "pay",
            TestResult::Failure,
            "card declined",
            Some("PaymentError: card declined"),
        );
        recorder.step_finished("print the receipt", TestResult::Skipped);
        recorder.step_group_finished().expect("group is open");
        recorder.test_finished().expect("test finishes cleanly");

        let outcomes = recorder.take_finished();
        assert_eq!(outcomes.len(), 1);
        let outcome = &outcomes[0];
        assert_eq!(outcome.title(), "Should buy a widget");
        assert_eq!(outcome.story(), Some(&story()));
        assert!(outcome.tested_requirements().contains("12"));
        assert_eq!(outcome.total_steps(), 3);
        assert_eq!(outcome.result(), TestResult::Failure);

        let first = outcome.steps()[0].as_concrete().expect("leaf step");
        assert_eq!(first.screenshot().map(|p| p.as_str()), Some("step_1.png"));

        let group = outcome.steps()[1].as_group().expect("group");
        assert_eq!(group.screenshot().map(|p| p.as_str()), Some("checkout.png"));
        let failed = group.steps()[0].as_concrete().expect("leaf step");
        assert_eq!(failed.error_message(), Some("card declined"));
        assert_eq!(
            failed.failure().and_then(|f| f.detail()),
            Some("PaymentError: card declined")
        );
    }

    #[test]
    fn events_without_a_test_are_ignored() {
        let mut recorder = OutcomeRecorder::new();
        recorder.step_finished("orphan step", TestResult::Success);
        recorder.screenshot_taken(Utf8Path::new("orphan.png"));
        assert!(recorder.current_outcome().is_none());

        assert!(matches!(
            recorder.test_finished(),
            Err(ListenerError::NoTestRunning {
                event: "test_finished"
            })
        ));
        assert!(matches!(
            recorder.step_group_finished(),
            Err(ListenerError::NoTestRunning { .. })
        ));
    }

    #[test]
    fn unbalanced_groups_are_errors() {
        let mut recorder = OutcomeRecorder::new();
        recorder.test_started("a_test", None);
        assert!(matches!(
            recorder.step_group_finished(),
            Err(ListenerError::Recording(_))
        ));

        recorder.step_group_started("never closed");
        recorder.step_finished("step", TestResult::Success);
        assert!(matches!(
            recorder.test_finished(),
            Err(ListenerError::Recording(_))
        ));
        // The outcome is kept regardless.
        assert_eq!(recorder.finished_outcomes().len(), 1);
        assert_eq!(recorder.finished_outcomes()[0].total_steps(), 1);
    }

    #[test]
    fn finished_tests_are_reported() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let mut recorder = OutcomeRecorder::with_reporter(XmlReporter::new(dir.path()));

        recorder.test_started("should_do_this", Some(story()));
        recorder.step_finished("step 1", TestResult::Pending);
        recorder.test_finished().expect("test finishes cleanly");

        let loaded =
            load_report(&dir.path().join("should_do_this.xml")).expect("report was written");
        assert_eq!(loaded.story(), Some(&story()));
        assert_eq!(loaded.pending_count(), 1);
    }
}
