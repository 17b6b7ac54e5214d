//! Shared numeric constants for the display crate.

// ── Typography ──────────────────────────────────────────────────

/// Base comment font size in CSS pixels.
pub const DEFAULT_FONT_PX: f64 = 48.0;

/// Lane height as a multiple of the font size.
pub const LANE_HEIGHT_RATIO: f64 = 1.5;

/// Font multiplier applied to comments submitted with `size: large`.
pub const LARGE_FONT_SCALE: f64 = 1.5;

/// Average advance of a narrow (ASCII) glyph as a fraction of the font size.
pub const NARROW_GLYPH_RATIO: f64 = 0.6;

// ── Scrolling lanes ─────────────────────────────────────────────

/// Fraction of the surface height kept clear at the top and at the bottom.
pub const VERTICAL_MARGIN_RATIO: f64 = 0.1;

/// Time for a comment to cross the whole surface, in milliseconds.
pub const SCROLL_DURATION_MS: f64 = 5000.0;

/// Gap added after a comment has fully entered before its lane frees up.
pub const LANE_MARGIN_MS: f64 = 200.0;

// ── Free-floating placement ─────────────────────────────────────

/// Fraction of each surface dimension kept clear around floating comments.
pub const FLOAT_MARGIN_RATIO: f64 = 0.1;

/// Shortest lifetime of a floating comment, in milliseconds.
pub const FLOAT_MIN_DURATION_MS: f64 = 4000.0;

/// Longest lifetime of a floating comment, in milliseconds.
pub const FLOAT_MAX_DURATION_MS: f64 = 7000.0;

/// Fade-in and fade-out time of a floating comment, in milliseconds.
pub const FLOAT_FADE_MS: f64 = 500.0;

// ── Persistent-object defaults ──────────────────────────────────

/// Comment color when the sender did not pick one.
pub const DEFAULT_COMMENT_COLOR: &str = "#ffffff";

/// Shape stroke color when the sender did not pick one.
pub const DEFAULT_SHAPE_COLOR: &str = "#ff0000";

/// Key of the fixed comment a sender pins without naming one. Each such
/// submission replaces the previous one on every display.
pub const SHARED_FIXED_ID: &str = "fixed-comment";

/// Horizontal position (percent) of a fixed comment created without one.
pub const DEFAULT_FIXED_X: f64 = 50.0;

/// Vertical position (percent) of a fixed comment created without one.
pub const DEFAULT_FIXED_Y: f64 = 10.0;

/// Center position (percent) of a shape created without geometry.
pub const DEFAULT_SHAPE_POS: f64 = 50.0;

/// Edge length (percent) of a shape created without geometry.
pub const DEFAULT_SHAPE_EXTENT: f64 = 10.0;
