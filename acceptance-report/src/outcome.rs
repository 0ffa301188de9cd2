// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The aggregate root: a test outcome and its step-recording state machine.

use crate::{
    ConcreteTestStep, Feature, ResultCounts, Story, TestResult, TestStep, TestStepGroup,
    deserialize::deserialize_outcome,
    errors::{DeserializeError, RecordingError, SerializeError},
    naming::humanize,
    serialize::serialize_outcome,
    step::Leaves,
};
use std::{collections::BTreeSet, io};
use tracing::warn;

/// Where a [`TestOutcome`] is in its recording lifecycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RecordingState {
    /// Nothing has been recorded yet.
    Empty,

    /// Steps or groups are being recorded.
    Recording,

    /// [`TestOutcome::finish`] was called, or the outcome was loaded from a report.
    Finalized,
}

/// The outcome of a single test: its identity, and the tree of steps it recorded.
///
/// Steps are recorded through [`record_step`](Self::record_step),
/// [`start_group`](Self::start_group) and [`end_group`](Self::end_group). Counts are always
/// derived from the step tree on access.
#[derive(Clone, Debug)]
pub struct TestOutcome {
    title: String,
    method_name: Option<String>,
    story: Option<Story>,
    tested_requirements: BTreeSet<String>,
    steps: Vec<TestStep>,
    // Each entry is an index into the children of the previous entry's group (the first indexes
    // into `steps`). Every entry points at a `TestStep::Group`.
    open_groups: Vec<usize>,
    finished: bool,
}

impl TestOutcome {
    /// Creates a new, empty outcome with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            method_name: None,
            story: None,
            tested_requirements: BTreeSet::new(),
            steps: Vec::new(),
            open_groups: Vec::new(),
            finished: false,
        }
    }

    /// Creates an outcome for a test method. The title is the humanized method name:
    /// `should_do_this` becomes `Should do this`.
    pub fn for_method(method_name: impl Into<String>) -> Self {
        let method_name = method_name.into();
        let mut outcome = Self::new(humanize(&method_name));
        outcome.method_name = Some(method_name);
        outcome
    }

    /// Creates an outcome for a test method belonging to a story.
    pub fn for_test_in_story(method_name: impl Into<String>, story: Story) -> Self {
        let mut outcome = Self::for_method(method_name);
        outcome.story = Some(story);
        outcome
    }

    /// Returns the title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Sets the title.
    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    /// Returns the method name, if set.
    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    /// Sets the method name.
    pub fn set_method_name(&mut self, method_name: impl Into<String>) -> &mut Self {
        self.method_name = Some(method_name.into());
        self
    }

    /// Returns the title, with a qualifier appended in human-readable form.
    ///
    /// Underscores in the qualifier are shown as slashes: `("A test", "run_1")` gives
    /// `A test [run/1]`.
    pub fn qualified_title(&self, qualifier: Option<&str>) -> String {
        match qualifier {
            None => self.title.clone(),
            Some(qualifier) => format!("{} [{}]", self.title, qualifier.replace('_', "/")),
        }
    }

    /// Returns the machine-readable name: the method name if present, otherwise the title, with
    /// a qualifier appended.
    ///
    /// Spaces in the qualifier are replaced with underscores: `("a_test", "run 1")` gives
    /// `a_test_run_1`.
    pub fn qualified_name(&self, qualifier: Option<&str>) -> String {
        let base = self.method_name.as_deref().unwrap_or(&self.title);
        match qualifier {
            None => base.to_owned(),
            Some(qualifier) => format!("{base}_{}", qualifier.replace(' ', "_")),
        }
    }

    /// Returns the story this outcome belongs to, if any.
    pub fn story(&self) -> Option<&Story> {
        self.story.as_ref()
    }

    /// Sets the story this outcome belongs to.
    pub fn set_story(&mut self, story: Story) -> &mut Self {
        self.story = Some(story);
        self
    }

    /// Returns the feature of this outcome's story, if any.
    pub fn feature(&self) -> Option<&Feature> {
        self.story.as_ref().and_then(Story::feature)
    }

    /// Returns the top-level requirement ids tested by this outcome.
    pub fn tested_requirements(&self) -> &BTreeSet<String> {
        &self.tested_requirements
    }

    /// Records that this outcome tests the given requirement. Duplicates are collapsed.
    pub fn tests_requirement(&mut self, id: impl Into<String>) -> &mut Self {
        self.tested_requirements.insert(id.into());
        self
    }

    /// Returns the top-level steps, in recording order.
    pub fn steps(&self) -> &[TestStep] {
        &self.steps
    }

    /// Iterates over every leaf step, depth-first, in recording order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves::new(&self.steps)
    }

    // ---
    // Recording
    // ---

    /// Appends a step to the innermost open group, or to the top level if no group is open.
    pub fn record_step(&mut self, step: impl Into<TestStep>) {
        self.warn_if_finished("record_step");
        self.attach_point().push(step.into());
    }

    /// Appends a new, empty group exactly like [`record_step`](Self::record_step), and opens it
    /// so that further steps nest inside it.
    ///
    /// Returns the new group so that its result or screenshot can be set.
    pub fn start_group(&mut self, name: impl Into<String>) -> &mut TestStepGroup {
        self.warn_if_finished("start_group");
        let attach_point = self.attach_point();
        attach_point.push(TestStep::Group(TestStepGroup::new(name)));
        let index = attach_point.len() - 1;
        self.open_groups.push(index);
        self.current_group_mut()
            .unwrap_or_else(|| unreachable!("a group was just opened"))
    }

    /// Closes the innermost open group.
    ///
    /// Returns [`RecordingError::NoOpenGroup`] if no group is open.
    pub fn end_group(&mut self) -> Result<(), RecordingError> {
        self.open_groups
            .pop()
            .map(|_| ())
            .ok_or(RecordingError::NoOpenGroup)
    }

    /// Returns the innermost open group, if any.
    pub fn current_group(&self) -> Option<&TestStepGroup> {
        let (last, parents) = self.open_groups.split_last()?;
        let mut steps: &[TestStep] = &self.steps;
        for &index in parents {
            steps = group_steps(&steps[index]);
        }
        steps[*last].as_group()
    }

    /// Returns the innermost open group mutably, if any.
    pub fn current_group_mut(&mut self) -> Option<&mut TestStepGroup> {
        let (last, parents) = self.open_groups.split_last()?;
        let mut steps = &mut self.steps;
        for &index in parents {
            steps = group_steps_mut(&mut steps[index]);
        }
        match &mut steps[*last] {
            TestStep::Group(group) => Some(group),
            TestStep::Concrete(_) => None,
        }
    }

    /// Returns the most recently recorded step at the current attach point, if any.
    pub fn last_step_mut(&mut self) -> Option<&mut TestStep> {
        self.attach_point().last_mut()
    }

    /// Returns the names of the open groups, outermost first.
    pub fn open_group_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.open_groups.len());
        let mut steps: &[TestStep] = &self.steps;
        for &index in &self.open_groups {
            names.push(steps[index].description().to_owned());
            steps = group_steps(&steps[index]);
        }
        names
    }

    /// Marks this outcome as finished.
    ///
    /// Returns [`RecordingError::UnclosedGroups`] if groups are still open; the outcome is
    /// marked as finished regardless.
    pub fn finish(&mut self) -> Result<(), RecordingError> {
        self.finished = true;
        if self.open_groups.is_empty() {
            Ok(())
        } else {
            let open = self.open_group_names();
            self.open_groups.clear();
            Err(RecordingError::UnclosedGroups { open })
        }
    }

    /// Returns where this outcome is in its recording lifecycle.
    pub fn recording_state(&self) -> RecordingState {
        if self.finished {
            RecordingState::Finalized
        } else if self.steps.is_empty() && self.open_groups.is_empty() {
            RecordingState::Empty
        } else {
            RecordingState::Recording
        }
    }

    fn attach_point(&mut self) -> &mut Vec<TestStep> {
        let mut steps = &mut self.steps;
        for &index in &self.open_groups {
            steps = group_steps_mut(&mut steps[index]);
        }
        steps
    }

    fn warn_if_finished(&self, operation: &str) {
        if self.finished {
            warn!(
                title = %self.title,
                "{operation} called on a test outcome that has already finished"
            );
        }
    }

    // ---
    // Counts
    // ---

    /// Returns per-result counts of all leaf steps.
    pub fn result_counts(&self) -> ResultCounts {
        self.leaves().map(ConcreteTestStep::result).collect()
    }

    /// Returns the number of leaf steps. Groups are not counted.
    pub fn total_steps(&self) -> usize {
        self.steps.iter().map(TestStep::count_steps).sum()
    }

    /// Returns the number of successful leaf steps.
    pub fn success_count(&self) -> usize {
        self.result_counts().success
    }

    /// Returns the number of failing leaf steps, errors included.
    pub fn failure_count(&self) -> usize {
        self.result_counts().failures()
    }

    /// Returns the number of errored leaf steps.
    pub fn error_count(&self) -> usize {
        self.result_counts().error
    }

    /// Returns the number of skipped leaf steps.
    pub fn skipped_count(&self) -> usize {
        self.result_counts().skipped
    }

    /// Returns the number of ignored leaf steps.
    pub fn ignored_count(&self) -> usize {
        self.result_counts().ignored
    }

    /// Returns the number of pending leaf steps.
    pub fn pending_count(&self) -> usize {
        self.result_counts().pending
    }

    /// Returns the rolled-up result of the top-level steps.
    pub fn result(&self) -> TestResult {
        TestResult::rollup(self.steps.iter().map(TestStep::result))
    }

    /// Returns true if the rolled-up result is `Success`.
    pub fn is_success(&self) -> bool {
        self.result() == TestResult::Success
    }

    /// Returns true if the rolled-up result is `Failure` or `Error`.
    pub fn is_failure(&self) -> bool {
        self.result().is_failure()
    }

    /// Returns true if the rolled-up result is `Pending`.
    pub fn is_pending(&self) -> bool {
        self.result() == TestResult::Pending
    }

    // ---
    // Serialization
    // ---

    /// Serializes this outcome as an XML report to the given writer.
    ///
    /// If a qualifier is provided, it is appended to the report's title and name.
    pub fn serialize(
        &self,
        qualifier: Option<&str>,
        writer: impl io::Write,
    ) -> Result<(), SerializeError> {
        serialize_outcome(self, qualifier, writer).map_err(SerializeError::from)
    }

    /// Serializes this outcome as an XML report to a string.
    pub fn to_xml_string(&self, qualifier: Option<&str>) -> Result<String, SerializeError> {
        let mut buf: Vec<u8> = vec![];
        self.serialize(qualifier, &mut buf)?;
        String::from_utf8(buf).map_err(|utf8_err| {
            quick_xml::Error::NonDecodable(Some(utf8_err.utf8_error())).into()
        })
    }

    /// Reads an outcome from an XML report.
    ///
    /// Counts and the top-level result stored in the report are not read back: they are always
    /// derived from the reconstructed step tree.
    pub fn deserialize(mut reader: impl io::Read) -> Result<Self, DeserializeError> {
        let mut xml = String::new();
        reader.read_to_string(&mut xml)?;
        Self::from_xml_str(&xml)
    }

    /// Reads an outcome from an XML report held in a string.
    pub fn from_xml_str(xml: &str) -> Result<Self, DeserializeError> {
        deserialize_outcome(xml)
    }
}

fn group_steps(step: &TestStep) -> &[TestStep] {
    match step {
        TestStep::Group(group) => group.steps(),
        TestStep::Concrete(_) => unreachable!("open group path only points at groups"),
    }
}

fn group_steps_mut(step: &mut TestStep) -> &mut Vec<TestStep> {
    match step {
        TestStep::Group(group) => group.steps_mut(),
        TestStep::Concrete(_) => unreachable!("open group path only points at groups"),
    }
}
