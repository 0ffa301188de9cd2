// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by this crate.

use crate::TestResult;
use std::io;
use thiserror::Error;

/// Error returned while parsing a [`TestResult`] from its report name.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized value for test result: {input:?}\n(known values: {})",
    TestResult::variants().join(", ")
)]
pub struct TestResultParseError {
    input: String,
}

impl TestResultParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the input that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A violation of the group recording protocol on a [`TestOutcome`](crate::TestOutcome).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RecordingError {
    /// [`TestOutcome::end_group`](crate::TestOutcome::end_group) was called with no open group.
    #[error("end_group called with no open group")]
    NoOpenGroup,

    /// [`TestOutcome::finish`](crate::TestOutcome::finish) was called while groups were still
    /// open.
    #[error("test finished with {} group(s) still open: {}", .open.len(), .open.join(" > "))]
    UnclosedGroups {
        /// The names of the groups that are still open, outermost first.
        open: Vec<String>,
    },
}

/// An error that occurs while serializing a [`TestOutcome`](crate::TestOutcome).
///
/// Returned by [`TestOutcome::serialize`](crate::TestOutcome::serialize) and
/// [`TestOutcome::to_xml_string`](crate::TestOutcome::to_xml_string).
#[derive(Debug, Error)]
#[error("error serializing test outcome report")]
pub struct SerializeError {
    #[from]
    inner: quick_xml::Error,
}

/// An error that occurs while reading a [`TestOutcome`](crate::TestOutcome) back from XML.
///
/// Returned by [`TestOutcome::deserialize`](crate::TestOutcome::deserialize) and
/// [`TestOutcome::from_xml_str`](crate::TestOutcome::from_xml_str). The document is treated as
/// invalid as a whole: no partial outcome is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeserializeError {
    /// The input could not be read.
    #[error("error reading test outcome report")]
    Io(#[from] io::Error),

    /// The document is not well-formed XML.
    #[error("malformed XML at byte {position}")]
    Xml {
        /// The byte offset at which the error was detected.
        position: usize,
        /// The underlying error.
        #[source]
        error: quick_xml::Error,
    },

    /// The document has no root element.
    #[error("document has no root element")]
    MissingRoot,

    /// The root element is not a test run.
    #[error("expected root element <{expected}>, found <{found}>")]
    UnexpectedRoot {
        /// The expected root element name.
        expected: &'static str,
        /// The root element name that was found.
        found: String,
    },

    /// An element appeared somewhere it is not allowed, including after the root element.
    #[error("unexpected element <{found}> inside <{parent}>")]
    UnexpectedElement {
        /// The enclosing element, or `document` after the root element.
        parent: String,
        /// The element that was found.
        found: String,
    },

    /// Non-whitespace text appeared inside an element that only holds elements, or after the root
    /// element.
    #[error("unexpected text {text:?} inside <{parent}>")]
    UnexpectedText {
        /// The enclosing element, or `document` after the root element.
        parent: String,
        /// The text that was found.
        text: String,
    },

    /// The document ended while an element was still open.
    #[error("unexpected end of document inside <{parent}>")]
    UnexpectedEof {
        /// The element that was still open.
        parent: String,
    },

    /// A required attribute is absent.
    #[error("element <{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        /// The element name.
        element: &'static str,
        /// The attribute name.
        attribute: &'static str,
    },

    /// A required child element is absent.
    #[error("element <{element}> is missing required child <{child}>")]
    MissingChild {
        /// The element name.
        element: &'static str,
        /// The child element name.
        child: &'static str,
    },

    /// A `result` attribute holds an unknown result name.
    #[error("invalid result on element <{element}>")]
    InvalidResult {
        /// The element name.
        element: &'static str,
        /// The parse error.
        #[source]
        error: TestResultParseError,
    },

    /// Groups in the document did not nest properly.
    #[error("invalid group nesting")]
    Recording(#[from] RecordingError),
}
