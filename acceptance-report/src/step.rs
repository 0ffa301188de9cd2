// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The step tree: leaf steps and groups of steps.

use crate::{ResultCounts, TestResult};
use camino::{Utf8Path, Utf8PathBuf};
use std::{collections::BTreeSet, slice};

/// A node in the step tree of a test outcome.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TestStep {
    /// An atomic test action with a single result.
    Concrete(ConcreteTestStep),

    /// A named container of other steps.
    Group(TestStepGroup),
}

impl TestStep {
    /// Returns the step's description, or the group's name.
    pub fn description(&self) -> &str {
        match self {
            TestStep::Concrete(step) => step.description(),
            TestStep::Group(group) => group.name(),
        }
    }

    /// Returns the effective result of this step.
    ///
    /// For a group this is either its explicitly set result or the rollup of its children.
    pub fn result(&self) -> TestResult {
        match self {
            TestStep::Concrete(step) => step.result(),
            TestStep::Group(group) => group.result(),
        }
    }

    /// Returns the screenshot reference attached to this step, if any.
    pub fn screenshot(&self) -> Option<&Utf8Path> {
        match self {
            TestStep::Concrete(step) => step.screenshot(),
            TestStep::Group(group) => group.screenshot(),
        }
    }

    /// Attaches a screenshot reference to this step.
    pub fn set_screenshot(&mut self, screenshot: impl Into<Utf8PathBuf>) -> &mut Self {
        match self {
            TestStep::Concrete(step) => {
                step.set_screenshot(screenshot);
            }
            TestStep::Group(group) => {
                group.set_screenshot(screenshot);
            }
        }
        self
    }

    /// Returns true if this is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, TestStep::Group(_))
    }

    /// Returns the leaf step, if this is one.
    pub fn as_concrete(&self) -> Option<&ConcreteTestStep> {
        match self {
            TestStep::Concrete(step) => Some(step),
            TestStep::Group(_) => None,
        }
    }

    /// Returns the group, if this is one.
    pub fn as_group(&self) -> Option<&TestStepGroup> {
        match self {
            TestStep::Concrete(_) => None,
            TestStep::Group(group) => Some(group),
        }
    }

    /// Returns the number of leaf steps in this subtree. Groups themselves are not counted.
    pub fn count_steps(&self) -> usize {
        match self {
            TestStep::Concrete(_) => 1,
            TestStep::Group(group) => group.count_steps(),
        }
    }

    /// Returns per-result counts of the leaf steps in this subtree.
    pub fn result_counts(&self) -> ResultCounts {
        self.leaves().map(ConcreteTestStep::result).collect()
    }

    /// Iterates over the leaf steps in this subtree, in recording order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves::new(slice::from_ref(self))
    }
}

impl From<ConcreteTestStep> for TestStep {
    fn from(step: ConcreteTestStep) -> Self {
        TestStep::Concrete(step)
    }
}

impl From<TestStepGroup> for TestStep {
    fn from(group: TestStepGroup) -> Self {
        TestStep::Group(group)
    }
}

/// A leaf step: one recorded test action.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConcreteTestStep {
    description: String,
    result: TestResult,
    screenshot: Option<Utf8PathBuf>,
    // Only present while `result` is a failure.
    failure: Option<StepFailure>,
    tested_requirements: BTreeSet<String>,
}

impl ConcreteTestStep {
    /// Creates a new leaf step.
    pub fn new(description: impl Into<String>, result: TestResult) -> Self {
        Self {
            description: description.into(),
            result,
            screenshot: None,
            failure: None,
            tested_requirements: BTreeSet::new(),
        }
    }

    /// Creates a new step that failed with the given message.
    pub fn failed(description: impl Into<String>, message: impl Into<String>) -> Self {
        let mut step = Self::new(description, TestResult::Failure);
        step.failure = Some(StepFailure::new(message));
        step
    }

    /// Creates a new step that hit an unexpected error with the given message.
    pub fn errored(description: impl Into<String>, message: impl Into<String>) -> Self {
        let mut step = Self::new(description, TestResult::Error);
        step.failure = Some(StepFailure::new(message));
        step
    }

    /// Returns the step's description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Sets the step's description.
    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    /// Returns the step's result.
    pub fn result(&self) -> TestResult {
        self.result
    }

    /// Sets the step's result. Failure details are dropped if the new result is not a failure.
    pub fn set_result(&mut self, result: TestResult) -> &mut Self {
        self.result = result;
        if !result.is_failure() {
            self.failure = None;
        }
        self
    }

    /// Returns true if this step failed or errored.
    pub fn is_failure(&self) -> bool {
        self.result.is_failure()
    }

    /// Returns the screenshot reference, if any.
    pub fn screenshot(&self) -> Option<&Utf8Path> {
        self.screenshot.as_deref()
    }

    /// Attaches a screenshot reference.
    pub fn set_screenshot(&mut self, screenshot: impl Into<Utf8PathBuf>) -> &mut Self {
        self.screenshot = Some(screenshot.into());
        self
    }

    /// Returns the failure details. Always `None` unless the result is a failure.
    pub fn failure(&self) -> Option<&StepFailure> {
        self.failure.as_ref()
    }

    /// Returns the error message of a failing step.
    pub fn error_message(&self) -> Option<&str> {
        self.failure.as_ref().map(|failure| failure.message.as_str())
    }

    /// Records why this step failed.
    ///
    /// No-op unless the step's result is `Failure` or `Error`.
    pub fn set_failure(
        &mut self,
        message: impl Into<String>,
        detail: Option<String>,
    ) -> &mut Self {
        if self.result.is_failure() {
            let mut failure = StepFailure::new(message);
            failure.detail = detail;
            self.failure = Some(failure);
        }
        self
    }

    /// Sets the underlying failure detail, typically a rendered stack trace.
    ///
    /// No-op unless a failure message has been recorded.
    pub fn set_failure_detail(&mut self, detail: impl Into<String>) -> &mut Self {
        if let Some(failure) = &mut self.failure {
            failure.detail = Some(detail.into());
        }
        self
    }

    /// Returns the requirement ids tested by this step.
    pub fn tested_requirements(&self) -> &BTreeSet<String> {
        &self.tested_requirements
    }

    /// Records that this step tests the given requirement. Duplicates are collapsed.
    pub fn tests_requirement(&mut self, id: impl Into<String>) -> &mut Self {
        self.tested_requirements.insert(id.into());
        self
    }
}

/// Why a step failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StepFailure {
    message: String,
    detail: Option<String>,
}

impl StepFailure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the underlying failure detail, such as a stack trace.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// A named group of steps, nested to any depth.
#[derive(Clone, Debug, Eq)]
pub struct TestStepGroup {
    name: String,
    result: Option<TestResult>,
    screenshot: Option<Utf8PathBuf>,
    steps: Vec<TestStep>,
}

impl TestStepGroup {
    /// Creates a new, empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result: None,
            screenshot: None,
            steps: Vec::new(),
        }
    }

    /// Returns the group's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the group's effective result: the explicitly set result if there is one,
    /// otherwise the rollup of its children. An empty group is a `Success`.
    pub fn result(&self) -> TestResult {
        self.result
            .unwrap_or_else(|| TestResult::rollup(self.steps.iter().map(TestStep::result)))
    }

    /// Returns the explicitly set result, if any.
    pub fn explicit_result(&self) -> Option<TestResult> {
        self.result
    }

    /// Overrides the rolled-up result of this group.
    pub fn set_result(&mut self, result: TestResult) -> &mut Self {
        self.result = Some(result);
        self
    }

    /// Returns the screenshot reference, if any.
    pub fn screenshot(&self) -> Option<&Utf8Path> {
        self.screenshot.as_deref()
    }

    /// Attaches a screenshot reference.
    pub fn set_screenshot(&mut self, screenshot: impl Into<Utf8PathBuf>) -> &mut Self {
        self.screenshot = Some(screenshot.into());
        self
    }

    /// Returns the child steps, in recording order.
    pub fn steps(&self) -> &[TestStep] {
        &self.steps
    }

    /// Appends a child step.
    pub fn add_step(&mut self, step: impl Into<TestStep>) -> &mut Self {
        self.steps.push(step.into());
        self
    }

    pub(crate) fn steps_mut(&mut self) -> &mut Vec<TestStep> {
        &mut self.steps
    }

    /// Returns the number of leaf steps under this group.
    pub fn count_steps(&self) -> usize {
        self.steps.iter().map(TestStep::count_steps).sum()
    }

    /// Returns per-result counts of the leaf steps under this group.
    pub fn result_counts(&self) -> ResultCounts {
        self.leaves().map(ConcreteTestStep::result).collect()
    }

    /// Iterates over the leaf steps under this group, in recording order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves::new(&self.steps)
    }
}

// Two groups are equal if they look the same: whether the result was set explicitly or rolled
// up does not matter.
impl PartialEq for TestStepGroup {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.result() == other.result()
            && self.screenshot == other.screenshot
            && self.steps == other.steps
    }
}

/// A depth-first iterator over the leaf steps of a step tree.
///
/// Returned by [`TestStep::leaves`], [`TestStepGroup::leaves`] and
/// [`TestOutcome::leaves`](crate::TestOutcome::leaves).
#[derive(Clone, Debug)]
pub struct Leaves<'a> {
    stack: Vec<slice::Iter<'a, TestStep>>,
}

impl<'a> Leaves<'a> {
    pub(crate) fn new(steps: &'a [TestStep]) -> Self {
        Self {
            stack: vec![steps.iter()],
        }
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a ConcreteTestStep;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(TestStep::Concrete(step)) => return Some(step),
                Some(TestStep::Group(group)) => self.stack.push(group.steps.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_tree() -> TestStepGroup {
        let mut inner = TestStepGroup::new("Group 1.1");
        inner
            .add_step(ConcreteTestStep::new("step 2", TestResult::Success))
            .add_step(ConcreteTestStep::new("step 3", TestResult::Pending));

        let mut outer = TestStepGroup::new("Group 1");
        outer
            .add_step(ConcreteTestStep::new("step 1", TestResult::Success))
            .add_step(inner)
            .add_step(TestStepGroup::new("Empty group"))
            .add_step(ConcreteTestStep::failed("step 4", "expected 1, got 2"));
        outer
    }

    #[test]
    fn leaves_are_visited_depth_first() {
        let tree = nested_tree();
        let descriptions: Vec<_> = tree.leaves().map(|step| step.description()).collect();
        assert_eq!(descriptions, ["step 1", "step 2", "step 3", "step 4"]);
        assert_eq!(tree.count_steps(), 4);
    }

    #[test]
    fn groups_roll_up_children() {
        let tree = nested_tree();
        assert_eq!(tree.result(), TestResult::Failure);
        assert_eq!(tree.steps()[1].result(), TestResult::Pending);
        assert_eq!(tree.steps()[2].result(), TestResult::Success);
        assert_eq!(tree.steps()[2].count_steps(), 0);

        let counts = tree.result_counts();
        assert_eq!(counts.success, 2);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.failure, 1);
        assert_eq!(counts.total(), tree.count_steps());
    }

    #[test]
    fn explicit_group_result_wins() {
        let mut group = TestStepGroup::new("group");
        group.add_step(ConcreteTestStep::new("step", TestResult::Success));
        assert_eq!(group.explicit_result(), None);

        group.set_result(TestResult::Ignored);
        assert_eq!(group.result(), TestResult::Ignored);
        // Counts only ever look at leaves.
        assert_eq!(group.result_counts().success, 1);
    }

    #[test]
    fn group_equality_uses_effective_result() {
        let mut rolled_up = TestStepGroup::new("group");
        rolled_up.add_step(ConcreteTestStep::new("step", TestResult::Skipped));

        let mut explicit = rolled_up.clone();
        explicit.set_result(TestResult::Skipped);
        assert_eq!(rolled_up, explicit);

        explicit.set_result(TestResult::Success);
        assert_ne!(rolled_up, explicit);
    }

    #[test]
    fn failure_details_only_on_failing_steps() {
        let mut step = ConcreteTestStep::new("step", TestResult::Success);
        step.set_failure("boom", Some("trace".to_owned()));
        assert_eq!(step.failure(), None);

        let mut step = ConcreteTestStep::errored("step", "boom");
        step.set_failure_detail("at line 1");
        assert_eq!(step.error_message(), Some("boom"));
        assert_eq!(
            step.failure().and_then(StepFailure::detail),
            Some("at line 1")
        );

        step.set_result(TestResult::Success);
        assert_eq!(step.failure(), None);
    }

    #[test]
    fn requirements_are_a_set() {
        let mut step = ConcreteTestStep::new("step", TestResult::Success);
        step.tests_requirement("12")
            .tests_requirement("32")
            .tests_requirement("12");
        assert_eq!(step.tested_requirements().len(), 2);
    }
}
