// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read a `TestOutcome` back from an XML report.

use crate::{
    ConcreteTestStep, Feature, Story, TestOutcome, TestResult,
    errors::DeserializeError,
    serialize::{
        DESCRIPTION_TAG, ERROR_TAG, EXCEPTION_TAG, FEATURE_TAG, REQUIREMENTS_TAG, REQUIREMENT_TAG,
        TEST_GROUP_TAG, TEST_RUN_TAG, TEST_STEP_TAG, USER_STORY_TAG,
    },
};
use quick_xml::{
    Reader,
    events::{BytesStart, BytesText, Event},
};
use std::collections::BTreeSet;
use tracing::debug;

/// Stands in for the parent of content found after the root element.
const DOCUMENT: &str = "document";

pub(crate) fn deserialize_outcome(xml: &str) -> Result<TestOutcome, DeserializeError> {
    OutcomeReader::new(xml).read_outcome()
}

/// An element that has just been opened.
struct Element<'a> {
    start: BytesStart<'a>,
    // True for `<tag/>`: there are no children and no end event to consume.
    empty: bool,
}

impl<'a> Element<'a> {
    fn is(&self, tag_name: &str) -> bool {
        self.start.name().as_ref() == tag_name.as_bytes()
    }

    fn name(&self) -> String {
        String::from_utf8_lossy(self.start.name().as_ref()).into_owned()
    }
}

/// A recursive-descent reader over the event stream of a report.
struct OutcomeReader<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> OutcomeReader<'a> {
    fn new(xml: &'a str) -> Self {
        Self {
            reader: Reader::from_str(xml),
        }
    }

    fn read_outcome(mut self) -> Result<TestOutcome, DeserializeError> {
        let root = self.read_root()?;
        if !root.is(TEST_RUN_TAG) {
            return Err(DeserializeError::UnexpectedRoot {
                expected: TEST_RUN_TAG,
                found: root.name(),
            });
        }

        // The counts and result attributes on the root are derived data and are not read back.
        let title = self.required_attribute(&root.start, TEST_RUN_TAG, "title")?;
        let name = self.required_attribute(&root.start, TEST_RUN_TAG, "name")?;
        let mut outcome = TestOutcome::new(title);
        outcome.set_method_name(name);

        if !root.empty {
            self.read_run_children(&mut outcome)?;
        }
        self.read_document_end()?;

        outcome.finish()?;
        Ok(outcome)
    }

    fn read_root(&mut self) -> Result<Element<'a>, DeserializeError> {
        loop {
            match self.next_event()? {
                Event::Start(start) => return Ok(Element { start, empty: false }),
                Event::Empty(start) => return Ok(Element { start, empty: true }),
                Event::Text(text) => {
                    let text = self.unescape(&text)?;
                    if !text.trim().is_empty() {
                        return Err(DeserializeError::MissingRoot);
                    }
                }
                Event::Eof => return Err(DeserializeError::MissingRoot),
                _ => {}
            }
        }
    }

    /// Checks that nothing but whitespace, comments and processing instructions follow the root.
    fn read_document_end(&mut self) -> Result<(), DeserializeError> {
        loop {
            match self.next_event()? {
                Event::Eof => return Ok(()),
                Event::Start(start) | Event::Empty(start) => {
                    return Err(DeserializeError::UnexpectedElement {
                        parent: DOCUMENT.to_owned(),
                        found: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
                    });
                }
                Event::End(end) => {
                    return Err(DeserializeError::UnexpectedElement {
                        parent: DOCUMENT.to_owned(),
                        found: format!("/{}", String::from_utf8_lossy(end.name().as_ref())),
                    });
                }
                Event::Text(text) => {
                    let text = self.unescape(&text)?;
                    if !text.trim().is_empty() {
                        return Err(DeserializeError::UnexpectedText {
                            parent: DOCUMENT.to_owned(),
                            text,
                        });
                    }
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                    if !text.trim().is_empty() {
                        return Err(DeserializeError::UnexpectedText {
                            parent: DOCUMENT.to_owned(),
                            text,
                        });
                    }
                }
                Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
            }
        }
    }

    fn read_run_children(&mut self, outcome: &mut TestOutcome) -> Result<(), DeserializeError> {
        while let Some(child) = self.next_child(TEST_RUN_TAG)? {
            if child.is(USER_STORY_TAG) {
                let story = self.read_story(child)?;
                outcome.set_story(story);
            } else if child.is(REQUIREMENTS_TAG) {
                for requirement in self.read_requirements(child)? {
                    outcome.tests_requirement(requirement);
                }
            } else if child.is(TEST_STEP_TAG) || child.is(TEST_GROUP_TAG) {
                self.read_step(child, outcome)?;
            } else {
                return Err(DeserializeError::UnexpectedElement {
                    parent: TEST_RUN_TAG.to_owned(),
                    found: child.name(),
                });
            }
        }
        Ok(())
    }

    fn read_story(&mut self, element: Element<'a>) -> Result<Story, DeserializeError> {
        let id = self.required_attribute(&element.start, USER_STORY_TAG, "id")?;
        let name = self.required_attribute(&element.start, USER_STORY_TAG, "name")?;
        let mut story = Story::with_id(id, name);
        if element.empty {
            return Ok(story);
        }

        while let Some(child) = self.next_child(USER_STORY_TAG)? {
            if !child.is(FEATURE_TAG) {
                return Err(DeserializeError::UnexpectedElement {
                    parent: USER_STORY_TAG.to_owned(),
                    found: child.name(),
                });
            }
            let id = self.required_attribute(&child.start, FEATURE_TAG, "id")?;
            let name = self.required_attribute(&child.start, FEATURE_TAG, "name")?;
            if !child.empty {
                self.skip_whitespace_until_end(FEATURE_TAG)?;
            }
            story.set_feature(Feature::new(id, name));
        }
        Ok(story)
    }

    fn read_requirements(
        &mut self,
        element: Element<'a>,
    ) -> Result<BTreeSet<String>, DeserializeError> {
        let mut requirements = BTreeSet::new();
        if element.empty {
            return Ok(requirements);
        }

        while let Some(child) = self.next_child(REQUIREMENTS_TAG)? {
            if !child.is(REQUIREMENT_TAG) {
                return Err(DeserializeError::UnexpectedElement {
                    parent: REQUIREMENTS_TAG.to_owned(),
                    found: child.name(),
                });
            }
            requirements.insert(self.read_text(child)?);
        }
        Ok(requirements)
    }

    /// Reads a step or a group, recording it on `outcome` at the current nesting level.
    fn read_step(
        &mut self,
        element: Element<'a>,
        outcome: &mut TestOutcome,
    ) -> Result<(), DeserializeError> {
        if element.is(TEST_GROUP_TAG) {
            self.read_group(element, outcome)
        } else {
            let step = self.read_concrete_step(element)?;
            outcome.record_step(step);
            Ok(())
        }
    }

    fn read_group(
        &mut self,
        element: Element<'a>,
        outcome: &mut TestOutcome,
    ) -> Result<(), DeserializeError> {
        let name = self.required_attribute(&element.start, TEST_GROUP_TAG, "name")?;
        let result = self.required_result(&element.start, TEST_GROUP_TAG)?;
        let screenshot = self.attribute(&element.start, "screenshot")?;

        let group = outcome.start_group(name);
        group.set_result(result);
        if let Some(screenshot) = screenshot {
            group.set_screenshot(screenshot);
        }

        if !element.empty {
            while let Some(child) = self.next_child(TEST_GROUP_TAG)? {
                if child.is(TEST_STEP_TAG) || child.is(TEST_GROUP_TAG) {
                    self.read_step(child, outcome)?;
                } else {
                    return Err(DeserializeError::UnexpectedElement {
                        parent: TEST_GROUP_TAG.to_owned(),
                        found: child.name(),
                    });
                }
            }
        }

        outcome.end_group()?;
        Ok(())
    }

    fn read_concrete_step(
        &mut self,
        element: Element<'a>,
    ) -> Result<ConcreteTestStep, DeserializeError> {
        let result = self.required_result(&element.start, TEST_STEP_TAG)?;
        let screenshot = self.attribute(&element.start, "screenshot")?;

        let mut description = None;
        let mut requirements = BTreeSet::new();
        let mut error = None;
        let mut exception = None;

        if !element.empty {
            while let Some(child) = self.next_child(TEST_STEP_TAG)? {
                if child.is(DESCRIPTION_TAG) {
                    description = Some(self.read_text(child)?);
                } else if child.is(REQUIREMENTS_TAG) {
                    requirements.extend(self.read_requirements(child)?);
                } else if child.is(ERROR_TAG) {
                    error = Some(self.read_text(child)?);
                } else if child.is(EXCEPTION_TAG) {
                    exception = Some(self.read_text(child)?);
                } else {
                    return Err(DeserializeError::UnexpectedElement {
                        parent: TEST_STEP_TAG.to_owned(),
                        found: child.name(),
                    });
                }
            }
        }

        let description = description.ok_or(DeserializeError::MissingChild {
            element: TEST_STEP_TAG,
            child: DESCRIPTION_TAG,
        })?;

        let mut step = ConcreteTestStep::new(description, result);
        if let Some(screenshot) = screenshot {
            step.set_screenshot(screenshot);
        }
        for requirement in requirements {
            step.tests_requirement(requirement);
        }

        match error {
            Some(message) if result.is_failure() => {
                step.set_failure(message, exception);
            }
            Some(_) => {
                debug!(
                    description = step.description(),
                    %result,
                    "ignoring error message on a step that did not fail"
                );
            }
            None if exception.is_some() => {
                debug!(
                    description = step.description(),
                    "ignoring exception on a step without an error message"
                );
            }
            None => {}
        }

        Ok(step)
    }

    // ---
    // Event helpers
    // ---

    fn next_event(&mut self) -> Result<Event<'a>, DeserializeError> {
        self.reader
            .read_event()
            .map_err(|error| DeserializeError::Xml {
                position: self.reader.buffer_position(),
                error,
            })
    }

    /// Returns the next child element of `parent`, or `None` once `parent` is closed.
    ///
    /// Whitespace between elements, comments and processing instructions are skipped.
    fn next_child(&mut self, parent: &str) -> Result<Option<Element<'a>>, DeserializeError> {
        loop {
            match self.next_event()? {
                Event::Start(start) => return Ok(Some(Element { start, empty: false })),
                Event::Empty(start) => return Ok(Some(Element { start, empty: true })),
                // The reader checks that end tags match their start tags.
                Event::End(_) => return Ok(None),
                Event::Text(text) => {
                    let text = self.unescape(&text)?;
                    if !text.trim().is_empty() {
                        return Err(DeserializeError::UnexpectedText {
                            parent: parent.to_owned(),
                            text,
                        });
                    }
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                    if !text.trim().is_empty() {
                        return Err(DeserializeError::UnexpectedText {
                            parent: parent.to_owned(),
                            text,
                        });
                    }
                }
                Event::Eof => {
                    return Err(DeserializeError::UnexpectedEof {
                        parent: parent.to_owned(),
                    })
                }
                Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
            }
        }
    }

    fn skip_whitespace_until_end(&mut self, parent: &str) -> Result<(), DeserializeError> {
        match self.next_child(parent)? {
            None => Ok(()),
            Some(child) => Err(DeserializeError::UnexpectedElement {
                parent: parent.to_owned(),
                found: child.name(),
            }),
        }
    }

    /// Reads the text content of an element that holds only text.
    fn read_text(&mut self, element: Element<'a>) -> Result<String, DeserializeError> {
        let mut text = String::new();
        if element.empty {
            return Ok(text);
        }

        loop {
            match self.next_event()? {
                Event::Text(chunk) => text.push_str(&self.unescape(&chunk)?),
                Event::CData(cdata) => text.push_str(&String::from_utf8_lossy(&cdata.into_inner())),
                Event::End(_) => return Ok(text),
                Event::Start(start) | Event::Empty(start) => {
                    return Err(DeserializeError::UnexpectedElement {
                        parent: element.name(),
                        found: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
                    })
                }
                Event::Eof => {
                    return Err(DeserializeError::UnexpectedEof {
                        parent: element.name(),
                    })
                }
                Event::Comment(_) | Event::PI(_) | Event::Decl(_) | Event::DocType(_) => {}
            }
        }
    }

    fn unescape(&self, text: &BytesText<'_>) -> Result<String, DeserializeError> {
        text.unescape()
            .map(|text| text.into_owned())
            .map_err(|error| DeserializeError::Xml {
                position: self.reader.buffer_position(),
                error,
            })
    }

    // ---
    // Attribute helpers
    // ---

    fn attribute(
        &self,
        start: &BytesStart<'_>,
        name: &str,
    ) -> Result<Option<String>, DeserializeError> {
        for attr in start.attributes() {
            let attr = attr.map_err(|error| DeserializeError::Xml {
                position: self.reader.buffer_position(),
                error: error.into(),
            })?;
            if attr.key.as_ref() == name.as_bytes() {
                let value = attr.unescape_value().map_err(|error| DeserializeError::Xml {
                    position: self.reader.buffer_position(),
                    error,
                })?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    fn required_attribute(
        &self,
        start: &BytesStart<'_>,
        element: &'static str,
        attribute: &'static str,
    ) -> Result<String, DeserializeError> {
        self.attribute(start, attribute)?
            .ok_or(DeserializeError::MissingAttribute { element, attribute })
    }

    fn required_result(
        &self,
        start: &BytesStart<'_>,
        element: &'static str,
    ) -> Result<TestResult, DeserializeError> {
        self.required_attribute(start, element, "result")?
            .parse()
            .map_err(|error| DeserializeError::InvalidResult { element, error })
    }
}
