// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `acceptance` command-line tool: inspect, summarize and rewrite acceptance test reports.
//!
//! For the library APIs behind it, see [`acceptance_report`] and [`acceptance_store`].

mod dispatch;
mod display;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, OutputWriter, Palette};
