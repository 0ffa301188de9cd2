// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use acceptance_report::{
    RecordingState, TestOutcome, TestResult,
    errors::{DeserializeError, RecordingError},
};
use indoc::indoc;
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test]
fn load_single_step() {
    let xml = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <acceptance-test-run title="Should do this" name="should_do_this" steps="1" successful="1" failures="0" skipped="0" ignored="0" pending="0" result="SUCCESS">
            <test-step result="SUCCESS" screenshot="step_1.png">
                <description>step 1</description>
            </test-step>
        </acceptance-test-run>
    "#};

    let outcome = TestOutcome::from_xml_str(xml).expect("report loads");
    assert_eq!(outcome.title(), "Should do this");
    assert_eq!(outcome.method_name(), Some("should_do_this"));
    assert_eq!(outcome.recording_state(), RecordingState::Finalized);
    assert_eq!(outcome.steps().len(), 1);

    let step = outcome.steps()[0].as_concrete().expect("leaf step");
    assert_eq!(step.result(), TestResult::Success);
    assert_eq!(step.description(), "step 1");
    assert_eq!(
        step.screenshot().map(|path| path.as_str()),
        Some("step_1.png")
    );
}

#[test]
fn load_success_and_failure() {
    let xml = indoc! {r#"
        <acceptance-test-run title="A test" name="a_test" steps="2" successful="1" failures="1" skipped="0" ignored="0" pending="0" result="FAILURE">
            <test-step result="SUCCESS">
                <description>step 1</description>
            </test-step>
            <test-step result="FAILURE">
                <description>step 2</description>
                <error>expected 1 but was 2</error>
                <exception>java.lang.AssertionError: expected 1 but was 2</exception>
            </test-step>
        </acceptance-test-run>
    "#};

    let outcome = TestOutcome::from_xml_str(xml).expect("report loads");
    assert_eq!(outcome.total_steps(), 2);
    assert_eq!(outcome.success_count(), 1);
    assert_eq!(outcome.failure_count(), 1);

    let failed = outcome.steps()[1].as_concrete().expect("leaf step");
    let failure = failed.failure().expect("failure was read back");
    assert_eq!(failure.message(), "expected 1 but was 2");
    assert_eq!(
        failure.detail(),
        Some("java.lang.AssertionError: expected 1 but was 2")
    );
}

#[test]
fn load_nested_groups() {
    let xml = indoc! {r#"
        <acceptance-test-run title="A nested test case" name="a_nested_test_case" steps="1" successful="1" failures="0" skipped="0" ignored="0" pending="0" result="SUCCESS">
            <test-group name="Group 1" result="SUCCESS">
                <test-group name="Group 1.1" result="SUCCESS">
                    <test-group name="Group 1.1.1" result="SUCCESS">
                        <test-step result="SUCCESS">
                            <description>step 1</description>
                        </test-step>
                    </test-group>
                </test-group>
            </test-group>
        </acceptance-test-run>
    "#};

    let outcome = TestOutcome::from_xml_str(xml).expect("report loads");
    assert_eq!(outcome.steps().len(), 1);
    assert_eq!(outcome.total_steps(), 1);
    assert_eq!(outcome.current_group(), None);

    let group_1 = outcome.steps()[0].as_group().expect("group");
    assert_eq!(group_1.name(), "Group 1");
    let group_1_1 = group_1.steps()[0].as_group().expect("group");
    let group_1_1_1 = group_1_1.steps()[0].as_group().expect("group");
    assert_eq!(group_1_1_1.name(), "Group 1.1.1");
    let step = group_1_1_1.steps()[0].as_concrete().expect("leaf step");
    assert_eq!(step.description(), "step 1");
}

#[test]
fn load_top_level_requirements() {
    let xml = indoc! {r#"
        <acceptance-test-run title="A test" name="a_test" steps="1" successful="1" failures="0" skipped="0" ignored="0" pending="0" result="SUCCESS">
            <requirements>
                <requirement>12</requirement>
                <requirement>32</requirement>
            </requirements>
            <test-step result="SUCCESS">
                <description>step 1</description>
            </test-step>
        </acceptance-test-run>
    "#};

    let outcome = TestOutcome::from_xml_str(xml).expect("report loads");
    let requirements = outcome.tested_requirements();
    assert_eq!(requirements.len(), 2);
    assert!(requirements.contains("12"));
    assert!(requirements.contains("32"));
}

#[test]
fn load_step_requirements() {
    let xml = indoc! {r#"
        <acceptance-test-run title="A test" name="a_test" steps="1" successful="1" failures="0" skipped="0" ignored="0" pending="0" result="SUCCESS">
            <test-step result="SUCCESS">
                <description>step 1</description>
                <requirements>
                    <requirement>12</requirement>
                    <requirement>32</requirement>
                </requirements>
            </test-step>
        </acceptance-test-run>
    "#};

    let outcome = TestOutcome::from_xml_str(xml).expect("report loads");
    assert!(outcome.tested_requirements().is_empty());

    let step = outcome.steps()[0].as_concrete().expect("leaf step");
    assert_eq!(step.tested_requirements().len(), 2);
    assert!(step.tested_requirements().contains("12"));
    assert!(step.tested_requirements().contains("32"));
}

#[test]
fn load_story_without_feature() {
    let xml = indoc! {r#"
        <acceptance-test-run title="A test" name="a_test" steps="0" successful="0" failures="0" skipped="0" ignored="0" pending="0" result="SUCCESS">
            <user-story id="app.stories.PurchaseWidget" name="Purchase widget"/>
        </acceptance-test-run>
    "#};

    let outcome = TestOutcome::from_xml_str(xml).expect("report loads");
    let story = outcome.story().expect("story was read back");
    assert_eq!(story.id(), "app.stories.PurchaseWidget");
    assert_eq!(story.feature(), None);
    assert_eq!(outcome.feature(), None);
    assert_eq!(outcome.total_steps(), 0);
}

#[test]
fn summary_attributes_are_not_read_back() {
    // The counts and result on the root disagree with the steps: they are regenerated.
    let xml = indoc! {r#"
        <acceptance-test-run title="A test" name="a_test" steps="7" successful="0" failures="3" skipped="0" ignored="0" pending="0" result="ERROR">
            <test-step result="PENDING">
                <description>step 1</description>
            </test-step>
        </acceptance-test-run>
    "#};

    let outcome = TestOutcome::from_xml_str(xml).expect("report loads");
    assert_eq!(outcome.total_steps(), 1);
    assert_eq!(outcome.failure_count(), 0);
    assert_eq!(outcome.result(), TestResult::Pending);
}

#[test]
fn group_results_are_read_back_as_explicit() {
    let xml = indoc! {r#"
        <acceptance-test-run title="A test" name="a_test">
            <test-group name="Group 1" result="IGNORED">
                <test-step result="SUCCESS">
                    <description>step 1</description>
                </test-step>
            </test-group>
        </acceptance-test-run>
    "#};

    let outcome = TestOutcome::from_xml_str(xml).expect("report loads");
    let group = outcome.steps()[0].as_group().expect("group");
    assert_eq!(group.explicit_result(), Some(TestResult::Ignored));
    assert_eq!(outcome.result(), TestResult::Ignored);
    // Leaf counts are unaffected by group results.
    assert_eq!(outcome.success_count(), 1);
}

#[test]
fn error_text_on_passing_step_is_ignored() {
    let xml = indoc! {r#"
        <acceptance-test-run title="A test" name="a_test">
            <test-step result="SUCCESS">
                <description>step 1</description>
                <error>stale message</error>
            </test-step>
        </acceptance-test-run>
    "#};

    let outcome = TestOutcome::from_xml_str(xml).expect("report loads");
    let step = outcome.steps()[0].as_concrete().expect("leaf step");
    assert_eq!(step.failure(), None);
}

#[test_case(
    "",
    |err| matches!(err, DeserializeError::MissingRoot)
    ; "empty document"
)]
#[test_case(
    r#"<testsuites name="x"/>"#,
    |err| matches!(err, DeserializeError::UnexpectedRoot { found, .. } if found == "testsuites")
    ; "wrong root"
)]
#[test_case(
    r#"<acceptance-test-run name="a_test"/>"#,
    |err| matches!(err, DeserializeError::MissingAttribute { attribute: "title", .. })
    ; "missing title"
)]
#[test_case(
    r#"<acceptance-test-run title="A test" name="a_test"><test-step result="PASSED"><description>x</description></test-step></acceptance-test-run>"#,
    |err| matches!(err, DeserializeError::InvalidResult { element: "test-step", .. })
    ; "unknown result"
)]
#[test_case(
    r#"<acceptance-test-run title="A test" name="a_test"><test-step result="SUCCESS"/></acceptance-test-run>"#,
    |err| matches!(err, DeserializeError::MissingChild { child: "description", .. })
    ; "missing description"
)]
#[test_case(
    r#"<acceptance-test-run title="A test" name="a_test"><test-group result="SUCCESS"/></acceptance-test-run>"#,
    |err| matches!(err, DeserializeError::MissingAttribute { element: "test-group", attribute: "name" })
    ; "group without name"
)]
#[test_case(
    r#"<acceptance-test-run title="A test" name="a_test"><testcase/></acceptance-test-run>"#,
    |err| matches!(err, DeserializeError::UnexpectedElement { found, .. } if found == "testcase")
    ; "unknown element"
)]
#[test_case(
    r#"<acceptance-test-run title="A test" name="a_test">stray text</acceptance-test-run>"#,
    |err| matches!(err, DeserializeError::UnexpectedText { text, .. } if text == "stray text")
    ; "stray text"
)]
#[test_case(
    r#"<acceptance-test-run title="A test" name="a_test"><test-group name="g" result="SUCCESS">"#,
    |err| matches!(err, DeserializeError::UnexpectedEof { parent } if parent == "test-group")
    ; "truncated document"
)]
#[test_case(
    r#"<acceptance-test-run title="A test" name="a_test"></test-group>"#,
    |err| matches!(err, DeserializeError::Xml { .. })
    ; "mismatched end tag"
)]
#[test_case(
    r#"<acceptance-test-run title="A test" name="a_test"></acceptance-test-run><acceptance-test-run title="Another test" name="another_test"><testcase/></acceptance-test-run>"#,
    |err| matches!(
        err,
        DeserializeError::UnexpectedElement { parent, found }
            if parent == "document" && found == "acceptance-test-run"
    )
    ; "second root element"
)]
#[test_case(
    r#"<acceptance-test-run title="A test" name="a_test"></acceptance-test-run>junk text"#,
    |err| matches!(
        err,
        DeserializeError::UnexpectedText { parent, text }
            if parent == "document" && text == "junk text"
    )
    ; "text after root element"
)]
fn malformed_reports(xml: &str, check: fn(&DeserializeError) -> bool) {
    let err = TestOutcome::from_xml_str(xml).expect_err("malformed report fails to load");
    assert!(check(&err), "unexpected error: {err:?}");
}

#[test]
fn trailing_whitespace_and_comments_are_allowed() {
    let xml = indoc! {r#"
        <acceptance-test-run title="A test" name="a_test">
            <test-step result="SUCCESS">
                <description>step 1</description>
            </test-step>
        </acceptance-test-run>
        <!-- written by the nightly job -->
        <?processing done?>

    "#};

    let outcome = TestOutcome::from_xml_str(xml).expect("report loads");
    assert_eq!(outcome.total_steps(), 1);
}

#[test]
fn recording_errors_are_reported_as_such() {
    let err = DeserializeError::from(RecordingError::NoOpenGroup);
    assert_eq!(err.to_string(), "invalid group nesting");
}
