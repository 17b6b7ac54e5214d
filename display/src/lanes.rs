//! Lane scheduler for scrolling comments.
//!
//! The usable vertical band of the surface (everything except a fixed top and
//! bottom margin) is split into equal-height lanes. Each lane remembers a
//! single `available_at` timestamp: the moment a new comment may enter from
//! the right edge without catching up to the previous one.
//!
//! Placement is greedy, online and O(lanes) per arrival: the lowest-index free
//! lane wins, and when every lane is busy a lane is drawn uniformly at random.
//! Already placed comments are never reflowed.
//!
//! [`place`] is the pure core. [`LaneScheduler`] only owns the lane table and
//! commits what `place` decides.

#[cfg(test)]
#[path = "lanes_test.rs"]
mod lanes_test;

use rand::Rng;
use serde::Serialize;

use crate::consts::{
    DEFAULT_FONT_PX, LANE_HEIGHT_RATIO, LANE_MARGIN_MS, SCROLL_DURATION_MS, VERTICAL_MARGIN_RATIO,
};

/// Timing knobs shared by every lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneTiming {
    /// Time to cross the whole surface, in milliseconds.
    pub duration_ms: f64,
    /// Extra gap after a comment has fully entered, in milliseconds.
    pub margin_ms: f64,
}

impl Default for LaneTiming {
    fn default() -> Self {
        Self { duration_ms: SCROLL_DURATION_MS, margin_ms: LANE_MARGIN_MS }
    }
}

/// Vertical geometry of the lane band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneLayout {
    /// Y of the first lane's top edge, in pixels.
    pub top_offset: f64,
    /// Height of one lane, in pixels.
    pub lane_height: f64,
    /// Number of lanes that fit in the usable band.
    pub count: usize,
}

impl LaneLayout {
    /// Derive the layout for a surface of `surface_height` pixels rendering
    /// text at `font_px`, keeping `margin_ratio` of the height clear at both
    /// top and bottom.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(surface_height: f64, font_px: f64, margin_ratio: f64) -> Self {
        let lane_height = font_px * LANE_HEIGHT_RATIO;
        let top_offset = surface_height * margin_ratio;
        let usable = (surface_height - 2.0 * top_offset).max(0.0);
        let count = if lane_height > 0.0 {
            // Tolerate float noise so 720 / 72 stays 10.
            (usable / lane_height + 1e-9).floor() as usize
        } else {
            0
        };
        Self { top_offset, lane_height, count }
    }

    /// Top edge of `lane`, in pixels.
    #[must_use]
    pub fn lane_top(&self, lane: usize) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let index = lane as f64;
        self.top_offset + index * self.lane_height
    }
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self::new(0.0, DEFAULT_FONT_PX, VERTICAL_MARGIN_RATIO)
    }
}

/// The decision made for one arriving comment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Assigned lane index.
    pub lane: usize,
    /// `false` when every lane was busy and the lane was drawn at random.
    pub was_free: bool,
    /// Arrival time, in milliseconds. Start of the on-screen interval.
    pub start_ms: f64,
    /// Time for the comment to fully enter from the right edge.
    pub appear_ms: f64,
    /// New `available_at` for the lane: `start + appear + margin`.
    pub available_at: f64,
    /// Time the comment has fully left on the left edge.
    pub end_ms: f64,
    /// Horizontal speed in pixels per millisecond.
    pub speed: f64,
}

/// Lowest-index lane with `available_at <= now`, if any.
#[must_use]
pub fn first_free_lane(lanes: &[f64], now: f64) -> Option<usize> {
    lanes.iter().position(|&available_at| available_at <= now)
}

/// Place one comment of rendered `width` arriving at `now`.
///
/// Returns `None` only when `lanes` is empty. The caller commits
/// [`Placement::available_at`] back into its lane table.
pub fn place<R: Rng>(
    lanes: &[f64],
    width: f64,
    now: f64,
    surface_width: f64,
    timing: LaneTiming,
    rng: &mut R,
) -> Option<Placement> {
    if lanes.is_empty() {
        return None;
    }

    let (lane, was_free) = match first_free_lane(lanes, now) {
        Some(lane) => (lane, true),
        None => (rng.random_range(0..lanes.len()), false),
    };

    let width = width.max(0.0);
    let travel = surface_width.max(0.0) + width;
    let (speed, appear_ms) = if travel > 0.0 && timing.duration_ms > 0.0 {
        let speed = travel / timing.duration_ms;
        (speed, width / speed)
    } else {
        (0.0, 0.0)
    };

    Some(Placement {
        lane,
        was_free,
        start_ms: now,
        appear_ms,
        available_at: now + appear_ms + timing.margin_ms,
        end_ms: now + timing.duration_ms,
        speed,
    })
}

/// Owns the lane table of one display surface.
#[derive(Debug, Clone)]
pub struct LaneScheduler {
    layout: LaneLayout,
    timing: LaneTiming,
    available_at: Vec<f64>,
    font_px: f64,
    margin_ratio: f64,
}

impl LaneScheduler {
    #[must_use]
    pub fn new(surface_height: f64, font_px: f64, margin_ratio: f64, timing: LaneTiming) -> Self {
        let layout = LaneLayout::new(surface_height, font_px, margin_ratio);
        Self { layout, timing, available_at: vec![0.0; layout.count], font_px, margin_ratio }
    }

    /// Recompute the layout for a new surface height. Every lane resets to free.
    pub fn resize(&mut self, surface_height: f64) {
        self.layout = LaneLayout::new(surface_height, self.font_px, self.margin_ratio);
        self.available_at = vec![0.0; self.layout.count];
    }

    /// Place a comment and commit the lane reservation.
    ///
    /// A surface too short for a single lane still scrolls the comment at the
    /// top of the band; nothing is reserved.
    pub fn schedule<R: Rng>(&mut self, width: f64, now: f64, surface_width: f64, rng: &mut R) -> ScrollSlot {
        let placement = match place(&self.available_at, width, now, surface_width, self.timing, rng) {
            Some(placement) => {
                if let Some(slot) = self.available_at.get_mut(placement.lane) {
                    *slot = placement.available_at;
                }
                placement
            }
            None => Placement {
                lane: 0,
                was_free: false,
                start_ms: now,
                appear_ms: 0.0,
                available_at: now,
                end_ms: now + self.timing.duration_ms,
                speed: (surface_width + width) / self.timing.duration_ms.max(1.0),
            },
        };

        ScrollSlot {
            placement,
            top: self.layout.lane_top(placement.lane),
            width,
            surface_width,
            duration_ms: self.timing.duration_ms,
        }
    }

    #[must_use]
    pub fn layout(&self) -> LaneLayout {
        self.layout
    }

    /// Current `available_at` per lane.
    #[must_use]
    pub fn lanes(&self) -> &[f64] {
        &self.available_at
    }
}

/// A scheduled scrolling comment: where it runs and how it moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollSlot {
    pub placement: Placement,
    /// Top edge in pixels.
    pub top: f64,
    /// Rendered width in pixels.
    pub width: f64,
    /// Surface width at arrival; resizes do not affect comments in flight.
    pub surface_width: f64,
    pub duration_ms: f64,
}

impl ScrollSlot {
    /// Left edge at `now`: `surface_width` at start, `-width` at the end.
    #[must_use]
    pub fn x_at(&self, now: f64) -> f64 {
        let progress = self.progress(now);
        self.surface_width - (self.surface_width + self.width) * progress
    }

    /// Linear progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now - self.placement.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn is_finished(&self, now: f64) -> bool {
        now >= self.placement.end_ms
    }
}
