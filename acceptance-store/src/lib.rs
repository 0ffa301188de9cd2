// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Storage and recording for acceptance test reports.
//!
//! This crate builds on [`acceptance_report`]: it loads configuration, writes one XML report per
//! test outcome into a store directory and loads them back, turns test execution events into
//! outcomes through [`OutcomeRecorder`], and exports a JSON [`ReportSummary`].

pub mod config;
pub mod errors;
mod listener;
mod reporter;
mod summary;

pub use listener::*;
pub use reporter::*;
pub use summary::*;
