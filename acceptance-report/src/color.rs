// Copyright (c) The acceptance-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presentation colors for results and aggregates.

use crate::{TestResult, aggregate::TestTally};
use std::fmt;

/// A 24-bit RGB color.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Rgb {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
}

impl Rgb {
    /// Black: no tests.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// Saturated red.
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    /// Saturated green.
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    /// Saturated yellow.
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    /// Mid gray.
    pub const GRAY: Rgb = Rgb::new(128, 128, 128);
    /// Orange.
    pub const ORANGE: Rgb = Rgb::new(255, 200, 0);

    /// Creates a new color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Converts a hue/saturation/brightness triple, each in `0.0..=1.0`, to RGB.
    ///
    /// Only the fractional part of `hue` is used. Components are rounded to the nearest integer.
    pub fn from_hsb(hue: f32, saturation: f32, brightness: f32) -> Self {
        let component = |x: f32| (x * 255.0 + 0.5) as u8;

        if saturation == 0.0 {
            let v = component(brightness);
            return Self::new(v, v, v);
        }

        let h = (hue - hue.floor()) * 6.0;
        let f = h - h.floor();
        let p = brightness * (1.0 - saturation);
        let q = brightness * (1.0 - saturation * f);
        let t = brightness * (1.0 - saturation * (1.0 - f));

        let (r, g, b) = match h as u8 {
            0 => (brightness, t, p),
            1 => (q, brightness, p),
            2 => (p, brightness, t),
            3 => (p, q, brightness),
            4 => (t, p, brightness),
            _ => (brightness, p, q),
        };
        Self::new(component(r), component(g), component(b))
    }

    /// Returns the color as a `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Maps results and aggregates to presentation colors.
pub trait ColorScheme {
    /// Returns the color for a single step or test.
    fn color_for_result(&self, result: TestResult) -> Rgb;

    /// Returns the color for an aggregate of tests.
    fn color_for_tally(&self, tally: &dyn TestTally) -> Rgb;
}

/// A color scheme whose aggregate colors blend according to the relative share of passing,
/// pending and failing tests.
///
/// An all-passing aggregate is green and an all-failing one red. Pending tests pull the hue
/// toward a pale yellow. Any failing test pulls the whole hue toward red.
#[derive(Copy, Clone, Debug, Default)]
pub struct RelativeSizeColorScheme;

impl RelativeSizeColorScheme {
    // Hue 1/3 is green, 1/6 is yellow and 0 is red.
    const PASSING_HUE: f32 = 1.0 / 3.0;
    const PENDING_HUE: f32 = 1.0 / 6.0;
    const FAILING_HUE_FACTOR: f32 = 2.0 / 3.0;
    const PENDING_DESATURATION: f32 = 0.25;

    /// Creates a new color scheme.
    pub fn new() -> Self {
        Self
    }

    /// Returns the color for raw test counts.
    pub fn color_for_counts(
        &self,
        total: usize,
        passing: usize,
        pending: usize,
        failing: usize,
    ) -> Rgb {
        if total == 0 {
            return Rgb::BLACK;
        }

        let total = total as f32;
        let passing = passing as f32 / total;
        let pending = pending as f32 / total;
        let failing = failing as f32 / total;

        let mut hue = passing * Self::PASSING_HUE + pending * Self::PENDING_HUE;
        if failing > 0.0 {
            hue *= Self::FAILING_HUE_FACTOR;
        }
        let saturation = 1.0 - pending * Self::PENDING_DESATURATION;

        Rgb::from_hsb(hue, saturation, 1.0)
    }
}

impl ColorScheme for RelativeSizeColorScheme {
    fn color_for_result(&self, result: TestResult) -> Rgb {
        match result {
            TestResult::Success => Rgb::GREEN,
            TestResult::Failure | TestResult::Error => Rgb::RED,
            TestResult::Pending => Rgb::YELLOW,
            TestResult::Skipped => Rgb::GRAY,
            TestResult::Ignored => Rgb::ORANGE,
        }
    }

    fn color_for_tally(&self, tally: &dyn TestTally) -> Rgb {
        let counts = tally.counts();
        self.color_for_counts(counts.total, counts.passing, counts.pending, counts.failing)
    }
}
