// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a `TestOutcome` as an XML report.

use crate::{ConcreteTestStep, Story, TestOutcome, TestStep, TestStepGroup};
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::{collections::BTreeSet, io};

pub(crate) static TEST_RUN_TAG: &str = "acceptance-test-run";
pub(crate) static USER_STORY_TAG: &str = "user-story";
pub(crate) static FEATURE_TAG: &str = "feature";
pub(crate) static REQUIREMENTS_TAG: &str = "requirements";
pub(crate) static REQUIREMENT_TAG: &str = "requirement";
pub(crate) static TEST_GROUP_TAG: &str = "test-group";
pub(crate) static TEST_STEP_TAG: &str = "test-step";
pub(crate) static DESCRIPTION_TAG: &str = "description";
pub(crate) static ERROR_TAG: &str = "error";
pub(crate) static EXCEPTION_TAG: &str = "exception";

pub(crate) fn serialize_outcome(
    outcome: &TestOutcome,
    qualifier: Option<&str>,
    writer: impl io::Write,
) -> quick_xml::Result<()> {
    let mut writer = Writer::new_with_indent(writer, b' ', 4);

    let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
    writer.write_event(Event::Decl(decl))?;

    serialize_outcome_impl(outcome, qualifier, &mut writer)?;

    // Add a trailing newline.
    writer.write_indent()
}

fn serialize_outcome_impl(
    outcome: &TestOutcome,
    qualifier: Option<&str>,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let counts = outcome.result_counts();

    let mut run_tag = BytesStart::new(TEST_RUN_TAG);
    run_tag.extend_attributes([
        ("title", outcome.qualified_title(qualifier).as_str()),
        ("name", outcome.qualified_name(qualifier).as_str()),
        ("steps", counts.total().to_string().as_str()),
        ("successful", counts.success.to_string().as_str()),
        ("failures", counts.failures().to_string().as_str()),
        ("skipped", counts.skipped.to_string().as_str()),
        ("ignored", counts.ignored.to_string().as_str()),
        ("pending", counts.pending.to_string().as_str()),
        ("result", outcome.result().as_str()),
    ]);
    writer.write_event(Event::Start(run_tag))?;

    if let Some(story) = outcome.story() {
        serialize_story(story, writer)?;
    }
    serialize_requirements(outcome.tested_requirements(), writer)?;
    for step in outcome.steps() {
        serialize_step(step, writer)?;
    }

    serialize_end_tag(TEST_RUN_TAG, writer)
}

fn serialize_story(story: &Story, writer: &mut Writer<impl io::Write>) -> quick_xml::Result<()> {
    let mut story_tag = BytesStart::new(USER_STORY_TAG);
    story_tag.extend_attributes([("id", story.id()), ("name", story.name())]);

    match story.feature() {
        Some(feature) => {
            writer.write_event(Event::Start(story_tag))?;
            let mut feature_tag = BytesStart::new(FEATURE_TAG);
            feature_tag.extend_attributes([("id", feature.id()), ("name", feature.name())]);
            writer.write_event(Event::Empty(feature_tag))?;
            serialize_end_tag(USER_STORY_TAG, writer)
        }
        None => writer.write_event(Event::Empty(story_tag)),
    }
}

fn serialize_requirements(
    requirements: &BTreeSet<String>,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    if requirements.is_empty() {
        return Ok(());
    }

    serialize_empty_start_tag(REQUIREMENTS_TAG, writer)?;
    for requirement in requirements {
        serialize_text_element(REQUIREMENT_TAG, requirement, writer)?;
    }
    serialize_end_tag(REQUIREMENTS_TAG, writer)
}

fn serialize_step(step: &TestStep, writer: &mut Writer<impl io::Write>) -> quick_xml::Result<()> {
    match step {
        TestStep::Concrete(step) => serialize_concrete_step(step, writer),
        TestStep::Group(group) => serialize_group(group, writer),
    }
}

fn serialize_group(
    group: &TestStepGroup,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let mut group_tag = BytesStart::new(TEST_GROUP_TAG);
    group_tag.extend_attributes([("name", group.name()), ("result", group.result().as_str())]);
    if let Some(screenshot) = group.screenshot() {
        group_tag.push_attribute(("screenshot", screenshot.as_str()));
    }

    if group.steps().is_empty() {
        return writer.write_event(Event::Empty(group_tag));
    }

    writer.write_event(Event::Start(group_tag))?;
    for step in group.steps() {
        serialize_step(step, writer)?;
    }
    serialize_end_tag(TEST_GROUP_TAG, writer)
}

fn serialize_concrete_step(
    step: &ConcreteTestStep,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let mut step_tag = BytesStart::new(TEST_STEP_TAG);
    step_tag.push_attribute(("result", step.result().as_str()));
    if let Some(screenshot) = step.screenshot() {
        step_tag.push_attribute(("screenshot", screenshot.as_str()));
    }
    writer.write_event(Event::Start(step_tag))?;

    serialize_text_element(DESCRIPTION_TAG, step.description(), writer)?;
    serialize_requirements(step.tested_requirements(), writer)?;

    if let Some(failure) = step.failure() {
        serialize_text_element(ERROR_TAG, failure.message(), writer)?;
        if let Some(detail) = failure.detail() {
            serialize_text_element(EXCEPTION_TAG, detail, writer)?;
        }
    }

    serialize_end_tag(TEST_STEP_TAG, writer)
}

fn serialize_text_element(
    tag_name: &'static str,
    text: &str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    serialize_empty_start_tag(tag_name, writer)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    serialize_end_tag(tag_name, writer)
}

fn serialize_empty_start_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag_name)))
}

fn serialize_end_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(tag_name)))
}
