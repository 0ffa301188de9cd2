// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable rendering of outcomes and summaries.

use crate::output::Palette;
use acceptance_report::{ColorScheme, TestOutcome, TestResult, TestStep};
use acceptance_store::{ReportSummary, StorySummary, SummaryCounts};
use owo_colors::OwoColorize;
use swrite::{SWrite, swrite, swriteln};

const INDENT: &str = "  ";

/// Width of the widest result name, used to align step descriptions.
const RESULT_WIDTH: usize = 7;

pub(crate) fn write_outcome(
    out: &mut String,
    outcome: &TestOutcome,
    scheme: &dyn ColorScheme,
    styles: &Palette,
    verbose: bool,
) {
    let result = outcome.result();
    swriteln!(
        out,
        "{}: {}",
        outcome.title().style(styles.bold),
        result
            .as_str()
            .style(styles.rgb(scheme.color_for_result(result))),
    );

    if let Some(story) = outcome.story() {
        swriteln!(out, "{INDENT}story: {} ({})", story.name(), story.id());
    }
    if let Some(feature) = outcome.feature() {
        swriteln!(out, "{INDENT}feature: {} ({})", feature.name(), feature.id());
    }
    if !outcome.tested_requirements().is_empty() {
        let requirements: Vec<_> = outcome
            .tested_requirements()
            .iter()
            .map(String::as_str)
            .collect();
        swriteln!(out, "{INDENT}requirements: {}", requirements.join(", "));
    }

    let counts = outcome.result_counts();
    swriteln!(
        out,
        "{INDENT}steps: {} total, {} passed, {} failed, {} errored, {} pending, {} skipped, {} ignored",
        counts.total(),
        counts.get(TestResult::Success),
        counts.get(TestResult::Failure),
        counts.get(TestResult::Error),
        counts.get(TestResult::Pending),
        counts.get(TestResult::Skipped),
        counts.get(TestResult::Ignored),
    );

    if !outcome.steps().is_empty() {
        out.push('\n');
        for step in outcome.steps() {
            write_step(out, step, 1, scheme, styles, verbose);
        }
    }
}

fn write_step(
    out: &mut String,
    step: &TestStep,
    depth: usize,
    scheme: &dyn ColorScheme,
    styles: &Palette,
    verbose: bool,
) {
    let indent = INDENT.repeat(depth);
    let result = step.result();
    let label = format!("{:<RESULT_WIDTH$}", result.as_str());
    swriteln!(
        out,
        "{indent}{} {}",
        label.style(styles.rgb(scheme.color_for_result(result))),
        step.description(),
    );

    // Detail lines line up with the description.
    let detail_indent = format!("{indent}{:RESULT_WIDTH$} ", "");
    match step {
        TestStep::Concrete(concrete) => {
            if let Some(failure) = concrete.failure() {
                swriteln!(out, "{detail_indent}{}", failure.message());
                if verbose {
                    for line in failure.detail().into_iter().flat_map(str::lines) {
                        swriteln!(out, "{detail_indent}{}", line.style(styles.dimmed));
                    }
                }
            }
        }
        TestStep::Group(group) => {
            for child in group.steps() {
                write_step(out, child, depth + 1, scheme, styles, verbose);
            }
        }
    }

    if verbose && let Some(screenshot) = step.screenshot() {
        swriteln!(
            out,
            "{detail_indent}{} {}",
            "screenshot:".style(styles.dimmed),
            screenshot
        );
    }
}

pub(crate) fn write_summary(
    out: &mut String,
    summary: &ReportSummary,
    styles: &Palette,
    verbose: bool,
) {
    let story_count = summary
        .features
        .iter()
        .map(|feature| feature.stories.len())
        .sum::<usize>()
        + summary.unassigned_stories.len();
    swriteln!(
        out,
        "{} in {} {}: {} {}",
        plural(summary.totals.tests, "test", "tests").style(styles.bold),
        story_count,
        if story_count == 1 { "story" } else { "stories" },
        counts_line(&summary.totals),
        summary.color.style(styles.rgb(summary.color)),
    );

    for feature in &summary.features {
        swriteln!(
            out,
            "\n{} {}",
            feature.name.style(styles.bold),
            feature.color.style(styles.rgb(feature.color)),
        );
        for story in &feature.stories {
            write_story_summary(out, story, styles, verbose);
        }
    }

    if !summary.unassigned_stories.is_empty() {
        swriteln!(out, "\n{}", "Stories without a feature".style(styles.bold));
        for story in &summary.unassigned_stories {
            write_story_summary(out, story, styles, verbose);
        }
    }

    if summary.tests_without_story > 0 {
        swriteln!(
            out,
            "\n{} without a story",
            plural(summary.tests_without_story, "test", "tests")
        );
    }
}

fn write_story_summary(
    out: &mut String,
    story: &StorySummary,
    styles: &Palette,
    verbose: bool,
) {
    swriteln!(
        out,
        "{INDENT}{}: {} {}",
        story.name,
        counts_line(&story.counts),
        story.color.style(styles.rgb(story.color)),
    );
    if verbose {
        for test in &story.tests {
            let label = format!("{:<RESULT_WIDTH$}", test.result);
            swriteln!(
                out,
                "{INDENT}{INDENT}{} {}",
                label.style(styles.rgb(test.color)),
                test.title
            );
        }
    }
}

fn counts_line(counts: &SummaryCounts) -> String {
    let mut line = String::new();
    swrite!(
        line,
        "{} passed, {} failed, {} pending",
        counts.passing,
        counts.failing,
        counts.pending
    );
    if counts.skipped > 0 {
        swrite!(line, ", {} skipped", counts.skipped);
    }
    if counts.ignored > 0 {
        swrite!(line, ", {} ignored", counts.ignored);
    }
    line
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}
