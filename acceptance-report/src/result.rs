// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The closed set of per-step outcomes, and per-result counts.

use crate::errors::TestResultParseError;
use std::{fmt, iter::Sum, ops::AddAssign, str::FromStr};

/// The outcome of a single test step, group or test.
///
/// Variants are declared in precedence order: when several results are rolled up into one, the
/// greatest one wins. The order is `Error > Failure > Pending > Skipped > Ignored > Success`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum TestResult {
    /// The step ran and passed.
    Success,

    /// The step was marked as ignored and never ran.
    Ignored,

    /// The step was skipped, usually because an earlier step failed.
    Skipped,

    /// The step is not implemented yet.
    Pending,

    /// The step ran and an assertion did not hold.
    Failure,

    /// The step ran and hit an unexpected error.
    Error,
}

impl TestResult {
    /// All results, in precedence order.
    pub const ALL: [TestResult; 6] = [
        TestResult::Success,
        TestResult::Ignored,
        TestResult::Skipped,
        TestResult::Pending,
        TestResult::Failure,
        TestResult::Error,
    ];

    /// Returns the name used for this result in reports, e.g. `SUCCESS`.
    pub fn as_str(self) -> &'static str {
        match self {
            TestResult::Success => "SUCCESS",
            TestResult::Ignored => "IGNORED",
            TestResult::Skipped => "SKIPPED",
            TestResult::Pending => "PENDING",
            TestResult::Failure => "FAILURE",
            TestResult::Error => "ERROR",
        }
    }

    /// Returns the report names of all results.
    pub fn variants() -> [&'static str; 6] {
        Self::ALL.map(Self::as_str)
    }

    /// Returns true if this result signals a failure: either `Failure` or `Error`.
    pub fn is_failure(self) -> bool {
        matches!(self, TestResult::Failure | TestResult::Error)
    }

    /// Rolls up a set of results into the one with the highest precedence.
    ///
    /// An empty set rolls up to `Success`.
    pub fn rollup(results: impl IntoIterator<Item = TestResult>) -> TestResult {
        results.into_iter().max().unwrap_or(TestResult::Success)
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestResult {
    type Err = TestResultParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|result| result.as_str() == s)
            .ok_or_else(|| TestResultParseError::new(s))
    }
}

/// Number of leaf steps (or tests) in each result bucket.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ResultCounts {
    /// Number of `Success` results.
    pub success: usize,
    /// Number of `Failure` results.
    pub failure: usize,
    /// Number of `Error` results.
    pub error: usize,
    /// Number of `Skipped` results.
    pub skipped: usize,
    /// Number of `Ignored` results.
    pub ignored: usize,
    /// Number of `Pending` results.
    pub pending: usize,
}

impl ResultCounts {
    /// Creates a new, all-zero `ResultCounts`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one to the bucket for `result`.
    pub fn record(&mut self, result: TestResult) -> &mut Self {
        match result {
            TestResult::Success => self.success += 1,
            TestResult::Failure => self.failure += 1,
            TestResult::Error => self.error += 1,
            TestResult::Skipped => self.skipped += 1,
            TestResult::Ignored => self.ignored += 1,
            TestResult::Pending => self.pending += 1,
        }
        self
    }

    /// Returns the count for a single bucket.
    pub fn get(&self, result: TestResult) -> usize {
        match result {
            TestResult::Success => self.success,
            TestResult::Failure => self.failure,
            TestResult::Error => self.error,
            TestResult::Skipped => self.skipped,
            TestResult::Ignored => self.ignored,
            TestResult::Pending => self.pending,
        }
    }

    /// Returns the number of failures, with errors folded in.
    pub fn failures(&self) -> usize {
        self.failure + self.error
    }

    /// Returns the sum of all buckets.
    pub fn total(&self) -> usize {
        self.success + self.failures() + self.skipped + self.ignored + self.pending
    }
}

impl AddAssign for ResultCounts {
    fn add_assign(&mut self, other: Self) {
        self.success += other.success;
        self.failure += other.failure;
        self.error += other.error;
        self.skipped += other.skipped;
        self.ignored += other.ignored;
        self.pending += other.pending;
    }
}

impl Sum for ResultCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ResultCounts::new(), |mut acc, counts| {
            acc += counts;
            acc
        })
    }
}

impl FromIterator<TestResult> for ResultCounts {
    fn from_iter<I: IntoIterator<Item = TestResult>>(iter: I) -> Self {
        let mut counts = ResultCounts::new();
        for result in iter {
            counts.record(result);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("SUCCESS", TestResult::Success ; "success")]
    #[test_case("FAILURE", TestResult::Failure ; "failure")]
    #[test_case("ERROR", TestResult::Error ; "error")]
    #[test_case("SKIPPED", TestResult::Skipped ; "skipped")]
    #[test_case("IGNORED", TestResult::Ignored ; "ignored")]
    #[test_case("PENDING", TestResult::Pending ; "pending")]
    fn parse_known_results(input: &str, expected: TestResult) {
        let actual: TestResult = input.parse().expect("known result parses");
        assert_eq!(actual, expected);
        assert_eq!(actual.to_string(), input);
    }

    #[test_case("success" ; "lowercase")]
    #[test_case("PASSED" ; "unknown name")]
    #[test_case("" ; "empty")]
    fn parse_unknown_results(input: &str) {
        let error = input.parse::<TestResult>().unwrap_err();
        let message = error.to_string();
        assert!(
            message.contains("SUCCESS, IGNORED, SKIPPED, PENDING, FAILURE, ERROR"),
            "error lists known values: {message}"
        );
    }

    #[test]
    fn rollup_precedence() {
        use TestResult::*;

        assert_eq!(TestResult::rollup([]), Success);
        assert_eq!(TestResult::rollup([Success, Ignored]), Ignored);
        assert_eq!(TestResult::rollup([Ignored, Skipped, Success]), Skipped);
        assert_eq!(TestResult::rollup([Skipped, Pending]), Pending);
        assert_eq!(TestResult::rollup([Pending, Failure, Success]), Failure);
        assert_eq!(TestResult::rollup([Failure, Error, Pending]), Error);
    }

    #[test]
    fn counts_fold_errors_into_failures() {
        use TestResult::*;

        let counts: ResultCounts = [Success, Failure, Error, Pending, Skipped, Ignored, Success]
            .into_iter()
            .collect();
        assert_eq!(counts.success, 2);
        assert_eq!(counts.failures(), 2);
        assert_eq!(counts.get(Error), 1);
        assert_eq!(counts.total(), 7);

        let summed: ResultCounts = [counts, counts].into_iter().sum();
        assert_eq!(summed.total(), 14);
        assert_eq!(summed.pending, 2);
    }
}
