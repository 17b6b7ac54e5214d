//! Display core: turns hub events and clock ticks into a renderable scene.
//!
//! `DisplayCore` holds everything one surface knows: the transient layer, the
//! fixed-comment and shape tables, the sharing indicator, the last moderation
//! snapshot and the connection flag. It has no I/O and no clock of its own;
//! the host feeds it events with [`DisplayCore::handle`] and draws whatever
//! [`DisplayCore::tick`] returns.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use protocol::{CommentSubmission, FixedCommentFields, FontSize, ServerEvent};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::consts::{
    DEFAULT_COMMENT_COLOR, DEFAULT_FONT_PX, LARGE_FONT_SCALE, NARROW_GLYPH_RATIO, SHARED_FIXED_ID,
    VERTICAL_MARGIN_RATIO,
};
use crate::doc::{FixedComment, ObjectTables, Shape};
use crate::floating::FloatParams;
use crate::lanes::LaneTiming;
use crate::transient::{CommentFrame, CommentStyle, PlacementPolicy, TransientLayer};

/// Measures the rendered width of a line of text.
pub trait TextMeasure {
    fn width(&self, text: &str, font_px: f64) -> f64;
}

/// Glyph-class estimate for hosts without a text shaper: ASCII glyphs are
/// narrow, everything else is a full em.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasure;

impl TextMeasure for ApproxMeasure {
    fn width(&self, text: &str, font_px: f64) -> f64 {
        text.chars()
            .map(|c| if c.is_ascii() { font_px * NARROW_GLYPH_RATIO } else { font_px })
            .sum()
    }
}

/// Static configuration of one display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayConfig {
    pub width: f64,
    pub height: f64,
    /// Base font size in pixels. Lane height derives from it.
    pub font_px: f64,
    /// Fraction of the height kept clear above and below the lanes.
    pub margin_ratio: f64,
    pub policy: PlacementPolicy,
    pub timing: LaneTiming,
    pub float: FloatParams,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            font_px: DEFAULT_FONT_PX,
            margin_ratio: VERTICAL_MARGIN_RATIO,
            policy: PlacementPolicy::default(),
            timing: LaneTiming::default(),
            float: FloatParams::default(),
        }
    }
}

/// What the host should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    RenderNeeded,
    /// The hub announced a listener move; reconnect on `port`.
    Disconnected { port: u16 },
}

/// Everything to draw at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub now: f64,
    pub connected: bool,
    pub comments: Vec<CommentFrame>,
    pub fixed: Vec<FixedComment>,
    pub shapes: Vec<Shape>,
    /// Opaque payload of the sharing indicator while it is shown.
    pub indicator: Option<serde_json::Value>,
}

pub struct DisplayCore {
    config: DisplayConfig,
    transient: TransientLayer,
    tables: ObjectTables,
    indicator: Option<serde_json::Value>,
    banned: Vec<String>,
    connected: bool,
    measure: Box<dyn TextMeasure + Send>,
    rng: StdRng,
}

impl DisplayCore {
    /// A display seeded from the operating system's entropy source.
    #[must_use]
    pub fn new(config: DisplayConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// A display with a fixed random seed, for reproducible placement.
    #[must_use]
    pub fn with_seed(config: DisplayConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: DisplayConfig, rng: StdRng) -> Self {
        Self {
            config,
            transient: build_layer(&config),
            tables: ObjectTables::new(),
            indicator: None,
            banned: Vec::new(),
            connected: true,
            measure: Box::new(ApproxMeasure),
            rng,
        }
    }

    /// Replace the text measurer, e.g. with one backed by a real font.
    pub fn set_measure(&mut self, measure: Box<dyn TextMeasure + Send>) {
        self.measure = measure;
    }

    // --- Event input ---

    /// Apply one hub event received at `now` (milliseconds on the host clock).
    pub fn handle(&mut self, event: ServerEvent, now: f64) -> Action {
        match event {
            ServerEvent::NewComment(submission) => self.accept_comment(submission, now),
            ServerEvent::ModerationListSnapshot(list) => {
                self.banned = list.words;
                Action::None
            }
            ServerEvent::CreateFixed(fields) => {
                self.tables.create_fixed(&fields);
                Action::RenderNeeded
            }
            ServerEvent::UpdateFixed(fields) => {
                self.tables.update_fixed(&fields);
                Action::RenderNeeded
            }
            ServerEvent::DeleteFixed(target) => changed(self.tables.delete_fixed(&target.id)),
            ServerEvent::CreateShape(fields) => {
                self.tables.create_shape(&fields);
                Action::RenderNeeded
            }
            ServerEvent::UpdateShape(fields) => {
                self.tables.update_shape(&fields);
                Action::RenderNeeded
            }
            ServerEvent::DeleteShape(target) => changed(self.tables.delete_shape(&target.id)),
            ServerEvent::ClearFixed => {
                self.tables.clear_fixed();
                Action::RenderNeeded
            }
            ServerEvent::ClearShapes => {
                self.tables.clear_shapes();
                Action::RenderNeeded
            }
            ServerEvent::ShowIndicator(indicator) => {
                self.indicator = Some(indicator.payload);
                Action::RenderNeeded
            }
            ServerEvent::HideIndicator => changed(self.indicator.take().is_some()),
            ServerEvent::ServerClosing(notice) => {
                self.connected = false;
                Action::Disconnected { port: notice.port }
            }
        }
    }

    fn accept_comment(&mut self, submission: CommentSubmission, now: f64) -> Action {
        if submission.is_fixed {
            let fields = FixedCommentFields {
                id: submission.id.unwrap_or_else(|| SHARED_FIXED_ID.to_owned()),
                text: submission.text,
                color: submission.color,
                font_family: submission.font_family,
                size: submission.size,
                x: submission.x,
                y: submission.y.or(submission.position),
            };
            self.tables.create_fixed(&fields);
            return Action::RenderNeeded;
        }

        let Some(text) = submission.text.filter(|t| !t.is_empty()) else {
            return Action::None;
        };
        let size = submission.size.unwrap_or_default();
        let font_px = match size {
            FontSize::Normal => self.config.font_px,
            FontSize::Large => self.config.font_px * LARGE_FONT_SCALE,
        };
        let style = CommentStyle {
            color: submission.color.unwrap_or_else(|| DEFAULT_COMMENT_COLOR.to_owned()),
            font_family: submission.font_family.unwrap_or_default(),
            size,
            font_px,
        };
        let width = self.measure.width(&text, font_px);
        self.transient.spawn(text, style, width, font_px, now, &mut self.rng);
        Action::RenderNeeded
    }

    // --- Host lifecycle ---

    /// Advance to `now`: drop finished comments and return the scene to draw.
    pub fn tick(&mut self, now: f64) -> Scene {
        self.transient.prune(now);
        Scene {
            now,
            connected: self.connected,
            comments: self.transient.frames(now),
            fixed: self.tables.sorted_fixed().into_iter().cloned().collect(),
            shapes: self.tables.sorted_shapes().into_iter().cloned().collect(),
            indicator: self.indicator.clone(),
        }
    }

    /// Adopt a new surface size. Lanes re-initialise; comments in flight keep
    /// their original geometry.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.config.width = width;
        self.config.height = height;
        self.transient.resize(width, height);
    }

    /// Switch placement policy. Comments in flight are dropped.
    pub fn set_policy(&mut self, policy: PlacementPolicy) {
        self.config.policy = policy;
        self.transient = build_layer(&self.config);
    }

    /// Start over after reconnecting: every table, animation and overlay is
    /// discarded.
    pub fn reset(&mut self) {
        self.tables.reset();
        self.transient.clear();
        self.indicator = None;
        self.banned.clear();
        self.connected = true;
    }

    // --- Queries ---

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Moderation list from the most recent snapshot.
    #[must_use]
    pub fn banned_words(&self) -> &[String] {
        &self.banned
    }

    #[must_use]
    pub fn config(&self) -> DisplayConfig {
        self.config
    }

    /// Fixed comments and shapes currently shown.
    #[must_use]
    pub fn tables(&self) -> &ObjectTables {
        &self.tables
    }

    #[must_use]
    pub fn transient(&self) -> &TransientLayer {
        &self.transient
    }
}

fn build_layer(config: &DisplayConfig) -> TransientLayer {
    match config.policy {
        PlacementPolicy::Lanes => {
            TransientLayer::with_lanes(config.width, config.height, config.font_px, config.margin_ratio, config.timing)
        }
        PlacementPolicy::Floating => TransientLayer::with_floating(config.width, config.height, config.float),
    }
}

fn changed(did_change: bool) -> Action {
    if did_change { Action::RenderNeeded } else { Action::None }
}
