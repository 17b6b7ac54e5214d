//! Display-side scheduling for the livewall overlay.
//!
//! A display is a full-screen surface that receives every hub broadcast and
//! renders it independently of every other display. This crate holds all of
//! its logic and none of its drawing: the host (a browser page, a headless
//! console) feeds [`engine::DisplayCore`] hub events and clock ticks and draws
//! the [`engine::Scene`] it gets back.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::DisplayCore`], event handling and scene assembly |
//! | [`lanes`] | Pure lane placement and the per-surface lane table |
//! | [`floating`] | Free-floating placement with fade in and out |
//! | [`transient`] | Comments in flight under either placement policy |
//! | [`doc`] | Fixed-comment and shape tables with upsert semantics |
//! | [`consts`] | Shared numeric constants (font, margins, timings, defaults) |

pub mod consts;
pub mod doc;
pub mod engine;
pub mod floating;
pub mod lanes;
pub mod transient;
