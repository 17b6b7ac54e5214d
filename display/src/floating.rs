//! Free-floating placement: the alternative to scrolling lanes.
//!
//! Each comment lands at a uniformly random point inside a margin-bounded safe
//! rectangle, fades in, holds, and fades out over a randomized lifetime. No
//! collision avoidance and no state shared with other comments.

#[cfg(test)]
#[path = "floating_test.rs"]
mod floating_test;

use rand::Rng;
use serde::Serialize;

use crate::consts::{FLOAT_FADE_MS, FLOAT_MARGIN_RATIO, FLOAT_MAX_DURATION_MS, FLOAT_MIN_DURATION_MS};

/// Tuning for floating placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatParams {
    /// Fraction of each surface dimension kept clear on every side.
    pub margin_ratio: f64,
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
    /// Duration of each fade, in milliseconds.
    pub fade_ms: f64,
}

impl Default for FloatParams {
    fn default() -> Self {
        Self {
            margin_ratio: FLOAT_MARGIN_RATIO,
            min_duration_ms: FLOAT_MIN_DURATION_MS,
            max_duration_ms: FLOAT_MAX_DURATION_MS,
            fade_ms: FLOAT_FADE_MS,
        }
    }
}

/// Position and lifetime of one floating comment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FloatSlot {
    /// Left edge in pixels.
    pub x: f64,
    /// Top edge in pixels.
    pub y: f64,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub fade_ms: f64,
}

impl FloatSlot {
    /// Opacity at `now`: ramps up over `fade_ms`, holds at 1, ramps down over
    /// the last `fade_ms`. Zero outside the lifetime.
    #[must_use]
    pub fn opacity_at(&self, now: f64) -> f64 {
        let elapsed = now - self.start_ms;
        if elapsed < 0.0 || elapsed >= self.duration_ms {
            return 0.0;
        }
        // Fades never overlap, even for lifetimes shorter than two fades.
        let fade = self.fade_ms.min(self.duration_ms / 2.0);
        if fade <= 0.0 {
            return 1.0;
        }
        let remaining = self.duration_ms - elapsed;
        (elapsed / fade).min(remaining / fade).min(1.0)
    }

    #[must_use]
    pub fn is_finished(&self, now: f64) -> bool {
        now >= self.start_ms + self.duration_ms
    }
}

/// Pick a spot for an item of `item_width` × `item_height` on a surface.
///
/// The item is kept fully inside the safe rectangle when it fits; when it
/// does not, it is pinned to the rectangle's top-left corner.
pub fn place_floating<R: Rng>(
    surface_width: f64,
    surface_height: f64,
    item_width: f64,
    item_height: f64,
    now: f64,
    params: FloatParams,
    rng: &mut R,
) -> FloatSlot {
    let margin_x = surface_width * params.margin_ratio;
    let margin_y = surface_height * params.margin_ratio;
    let x = uniform(rng, margin_x, surface_width - margin_x - item_width);
    let y = uniform(rng, margin_y, surface_height - margin_y - item_height);
    let duration_ms = uniform(rng, params.min_duration_ms, params.max_duration_ms);

    FloatSlot { x, y, start_ms: now, duration_ms, fade_ms: params.fade_ms }
}

/// Uniform draw from `[low, high)`, or `low` when the range is empty.
fn uniform<R: Rng>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low { rng.random_range(low..high) } else { low }
}
