// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record the outcome of acceptance tests as a tree of steps, and read and write it as XML
//! reports.
//!
//! A [`TestOutcome`] is built step by step while a test runs, through
//! [`record_step`](TestOutcome::record_step), [`start_group`](TestOutcome::start_group) and
//! [`end_group`](TestOutcome::end_group). Counts and results are always derived from the step
//! tree. Finished outcomes are serialized with [`TestOutcome::serialize`] and loaded back with
//! [`TestOutcome::deserialize`], and may be summarized per story and per feature with
//! [`StoryTestResults`] and [`FeatureResults`].
//!
//! # Examples
//!
//! ```
//! use acceptance_report::{ConcreteTestStep, TestOutcome, TestResult};
//!
//! let mut outcome = TestOutcome::for_method("should_buy_a_widget");
//! outcome.start_group("Log in");
//! outcome.record_step(ConcreteTestStep::new("open the login page", TestResult::Success));
//! outcome.record_step(ConcreteTestStep::new("enter credentials", TestResult::Success));
//! outcome.end_group().unwrap();
//! outcome.record_step(ConcreteTestStep::failed("buy a widget", "widget out of stock"));
//! outcome.finish().unwrap();
//!
//! assert_eq!(outcome.total_steps(), 3);
//! assert_eq!(outcome.result(), TestResult::Failure);
//!
//! let xml = outcome.to_xml_string(None).unwrap();
//! let loaded = TestOutcome::from_xml_str(&xml).unwrap();
//! assert_eq!(loaded.steps(), outcome.steps());
//! ```

mod aggregate;
mod color;
mod deserialize;
pub mod errors;
mod namer;
mod naming;
mod outcome;
mod result;
mod serialize;
mod step;
mod story;

pub use aggregate::*;
pub use color::*;
pub use namer::*;
pub use naming::{humanize, humanize_id, normalize};
pub use outcome::*;
pub use result::*;
pub use step::*;
pub use story::*;
