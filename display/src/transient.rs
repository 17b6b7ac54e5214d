//! Transient comment layer: comments currently in flight on one surface.
//!
//! A comment enters through one of two placement policies and is discarded
//! the first tick after its animation completes. Nothing here is replayed or
//! restarted. Resizing leaves comments already in flight on the geometry they
//! were placed with. A layer has one policy for its lifetime; switching policy
//! means building a new layer, which drops whatever was in flight.

#[cfg(test)]
#[path = "transient_test.rs"]
mod transient_test;

use protocol::{FontFamily, FontSize};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::floating::{FloatParams, FloatSlot, place_floating};
use crate::lanes::{LaneScheduler, LaneTiming, ScrollSlot};

/// How a display positions incoming comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementPolicy {
    /// Right-to-left scrolling in collision-avoiding lanes.
    #[default]
    Lanes,
    /// Random position inside a safe rectangle with fade in and out.
    Floating,
}

/// Resolved style of one transient comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentStyle {
    pub color: String,
    pub font_family: FontFamily,
    pub size: FontSize,
    /// Effective font size in pixels after the size multiplier.
    pub font_px: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    Scroll(ScrollSlot),
    Float(FloatSlot),
}

impl Motion {
    fn is_finished(&self, now: f64) -> bool {
        match self {
            Self::Scroll(slot) => slot.is_finished(now),
            Self::Float(slot) => slot.is_finished(now),
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveComment {
    text: String,
    style: CommentStyle,
    motion: Motion,
}

/// One transient comment as it should be drawn at a given instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentFrame {
    pub text: String,
    #[serde(flatten)]
    pub style: CommentStyle,
    /// Left edge in pixels.
    pub x: f64,
    /// Top edge in pixels.
    pub y: f64,
    pub opacity: f64,
    /// Lane index for scrolling comments, `None` for floating ones.
    pub lane: Option<usize>,
}

enum PolicyState {
    Lanes(LaneScheduler),
    Floating(FloatParams),
}

/// Comments in flight plus the placement state that admitted them.
pub struct TransientLayer {
    policy: PolicyState,
    active: Vec<ActiveComment>,
    surface_width: f64,
    surface_height: f64,
}

impl TransientLayer {
    /// A layer using lane placement. `font_px` is the base font that sizes
    /// lanes.
    #[must_use]
    pub fn with_lanes(
        surface_width: f64,
        surface_height: f64,
        font_px: f64,
        margin_ratio: f64,
        timing: LaneTiming,
    ) -> Self {
        Self {
            policy: PolicyState::Lanes(LaneScheduler::new(surface_height, font_px, margin_ratio, timing)),
            active: Vec::new(),
            surface_width,
            surface_height,
        }
    }

    #[must_use]
    pub fn with_floating(surface_width: f64, surface_height: f64, params: FloatParams) -> Self {
        Self {
            policy: PolicyState::Floating(params),
            active: Vec::new(),
            surface_width,
            surface_height,
        }
    }

    #[must_use]
    pub fn policy(&self) -> PlacementPolicy {
        match self.policy {
            PolicyState::Lanes(_) => PlacementPolicy::Lanes,
            PolicyState::Floating(_) => PlacementPolicy::Floating,
        }
    }

    /// Place a comment that renders `width` × `height` pixels, arriving at
    /// `now`.
    pub fn spawn<R: Rng>(
        &mut self,
        text: String,
        style: CommentStyle,
        width: f64,
        height: f64,
        now: f64,
        rng: &mut R,
    ) {
        let motion = match &mut self.policy {
            PolicyState::Lanes(scheduler) => Motion::Scroll(scheduler.schedule(width, now, self.surface_width, rng)),
            PolicyState::Floating(params) => Motion::Float(place_floating(
                self.surface_width,
                self.surface_height,
                width,
                height,
                now,
                *params,
                rng,
            )),
        };
        self.active.push(ActiveComment { text, style, motion });
    }

    /// Discard every comment whose animation has completed. Returns how many
    /// were removed.
    pub fn prune(&mut self, now: f64) -> usize {
        let before = self.active.len();
        self.active.retain(|c| !c.motion.is_finished(now));
        before - self.active.len()
    }

    /// Adopt a new surface size. Lane reservations reset.
    pub fn resize(&mut self, surface_width: f64, surface_height: f64) {
        self.surface_width = surface_width;
        self.surface_height = surface_height;
        if let PolicyState::Lanes(scheduler) = &mut self.policy {
            scheduler.resize(surface_height);
        }
    }

    /// Drop every comment in flight and free every lane.
    pub fn clear(&mut self) {
        self.active.clear();
        let height = self.surface_height;
        if let PolicyState::Lanes(scheduler) = &mut self.policy {
            scheduler.resize(height);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Lane table, when lane placement is active.
    #[must_use]
    pub fn lanes(&self) -> Option<&LaneScheduler> {
        match &self.policy {
            PolicyState::Lanes(scheduler) => Some(scheduler),
            PolicyState::Floating(_) => None,
        }
    }

    /// Draw state of every comment in flight at `now`, in arrival order.
    #[must_use]
    pub fn frames(&self, now: f64) -> Vec<CommentFrame> {
        self.active
            .iter()
            .map(|c| {
                let (x, y, opacity, lane) = match c.motion {
                    Motion::Scroll(slot) => (slot.x_at(now), slot.top, 1.0, Some(slot.placement.lane)),
                    Motion::Float(slot) => (slot.x, slot.y, slot.opacity_at(now), None),
                };
                CommentFrame { text: c.text.clone(), style: c.style.clone(), x, y, opacity, lane }
            })
            .collect()
    }
}
