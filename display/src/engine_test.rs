#![allow(clippy::float_cmp)]

use protocol::{ClosingNotice, IndicatorPayload, ModerationList, ObjectRef, ShapeFields};

use super::*;

fn config() -> DisplayConfig {
    DisplayConfig { width: 900.0, height: 900.0, ..DisplayConfig::default() }
}

fn core() -> DisplayCore {
    DisplayCore::with_seed(config(), 11)
}

fn comment(text: &str) -> ServerEvent {
    ServerEvent::NewComment(CommentSubmission::text(text))
}

fn shape(id: &str) -> ServerEvent {
    ServerEvent::CreateShape(ShapeFields { id: id.into(), ..ShapeFields::default() })
}

fn fixed(id: &str) -> ServerEvent {
    ServerEvent::CreateFixed(FixedCommentFields { id: id.into(), ..FixedCommentFields::default() })
}

// =============================================================
// Measurement
// =============================================================

#[test]
fn approx_measure_uses_narrow_ascii_and_full_width_others() {
    let m = ApproxMeasure;
    assert_eq!(m.width("ab", 10.0), 12.0);
    assert_eq!(m.width("あい", 10.0), 20.0);
    assert_eq!(m.width("", 10.0), 0.0);
}

#[test]
fn large_comment_measures_wider() {
    let mut d = core();
    d.handle(comment("hello"), 0.0);
    let large = CommentSubmission { size: Some(FontSize::Large), ..CommentSubmission::text("hello") };
    d.handle(ServerEvent::NewComment(large), 0.0);

    let scene = d.tick(0.0);
    assert_eq!(scene.comments[0].style.font_px, 48.0);
    assert_eq!(scene.comments[1].style.font_px, 72.0);
}

struct FixedWidth(f64);

impl TextMeasure for FixedWidth {
    fn width(&self, _text: &str, _font_px: f64) -> f64 {
        self.0
    }
}

#[test]
fn custom_measure_drives_scroll_geometry() {
    let mut d = core();
    d.set_measure(Box::new(FixedWidth(100.0)));
    d.handle(comment("x"), 0.0);
    // Halfway through a 5 s run: 900 - (900 + 100) / 2.
    assert_eq!(d.tick(2_500.0).comments[0].x, 400.0);
}

// =============================================================
// Transient comments
// =============================================================

#[test]
fn new_comment_enters_with_default_style() {
    let mut d = core();
    assert_eq!(d.handle(comment("hi"), 0.0), Action::RenderNeeded);
    let scene = d.tick(0.0);
    assert_eq!(scene.comments.len(), 1);
    let c = &scene.comments[0];
    assert_eq!(c.text, "hi");
    assert_eq!(c.style.color, "#ffffff");
    assert_eq!(c.x, 900.0);
    assert_eq!(c.y, 90.0);
}

#[test]
fn empty_comment_is_ignored() {
    let mut d = core();
    assert_eq!(d.handle(comment(""), 0.0), Action::None);
    assert!(d.tick(0.0).comments.is_empty());
}

#[test]
fn comment_disappears_after_its_run() {
    let mut d = core();
    d.handle(comment("bye"), 0.0);
    assert_eq!(d.tick(4_999.0).comments.len(), 1);
    assert!(d.tick(5_000.0).comments.is_empty());
    assert!(d.transient().is_empty());
}

#[test]
fn floating_policy_places_without_lanes() {
    let mut d = core();
    d.set_policy(PlacementPolicy::Floating);
    d.handle(comment("float"), 0.0);
    let scene = d.tick(0.0);
    assert_eq!(scene.comments[0].lane, None);
    assert_eq!(scene.comments[0].opacity, 0.0);
}

#[test]
fn switching_policy_drops_comments_in_flight() {
    let mut d = core();
    d.handle(comment("lane"), 0.0);
    assert_eq!(d.transient().len(), 1);
    d.set_policy(PlacementPolicy::Floating);
    assert!(d.transient().is_empty());
    assert_eq!(d.transient().policy(), PlacementPolicy::Floating);
}

// =============================================================
// Persistent objects
// =============================================================

#[test]
fn fixed_submission_creates_fixed_comment_instead_of_scrolling() {
    let mut d = core();
    let sub = CommentSubmission {
        id: Some("pin".into()),
        is_fixed: true,
        position: Some(70.0),
        ..CommentSubmission::text("pinned")
    };
    d.handle(ServerEvent::NewComment(sub), 0.0);

    let scene = d.tick(0.0);
    assert!(scene.comments.is_empty());
    assert_eq!(scene.fixed.len(), 1);
    assert_eq!(scene.fixed[0].id, "pin");
    assert_eq!(scene.fixed[0].text, "pinned");
    assert_eq!((scene.fixed[0].x, scene.fixed[0].y), (50.0, 70.0));
}

#[test]
fn fixed_submission_without_id_replaces_the_shared_one() {
    let mut d = core();
    let first = CommentSubmission { is_fixed: true, ..CommentSubmission::text("first") };
    let second = CommentSubmission { is_fixed: true, ..CommentSubmission::text("second") };
    d.handle(ServerEvent::NewComment(first), 0.0);
    d.handle(ServerEvent::NewComment(second), 0.0);
    assert_eq!(d.tables().fixed_len(), 1);
    assert_eq!(d.tables().fixed(SHARED_FIXED_ID).map(|c| c.text.as_str()), Some("second"));
}

#[test]
fn displays_fed_the_same_events_agree_on_fixed_comments() {
    let mut a = DisplayCore::with_seed(DisplayConfig::default(), 1);
    let mut b = DisplayCore::with_seed(DisplayConfig::default(), 2);
    let sub = CommentSubmission { is_fixed: true, ..CommentSubmission::text("pin") };
    for d in [&mut a, &mut b] {
        d.handle(ServerEvent::NewComment(sub.clone()), 0.0);
    }
    assert_eq!(a.tables(), b.tables());
    assert_eq!(a.tick(0.0).fixed, b.tick(0.0).fixed);

    for d in [&mut a, &mut b] {
        d.handle(ServerEvent::DeleteFixed(ObjectRef { id: SHARED_FIXED_ID.into() }), 0.0);
    }
    assert_eq!(a.tables().fixed_len(), 0);
    assert_eq!(b.tables().fixed_len(), 0);
}

#[test]
fn explicit_y_wins_over_position() {
    let mut d = core();
    let sub = CommentSubmission {
        id: Some("f".into()),
        is_fixed: true,
        position: Some(70.0),
        y: Some(20.0),
        ..CommentSubmission::text("t")
    };
    d.handle(ServerEvent::NewComment(sub), 0.0);
    assert_eq!(d.tables().fixed("f").map(|c| c.y), Some(20.0));
}

#[test]
fn delete_of_unknown_fixed_id_changes_nothing() {
    let mut d = core();
    d.handle(fixed("a"), 0.0);
    let before = d.tick(0.0);
    let action = d.handle(ServerEvent::DeleteFixed(ObjectRef { id: "ghost".into() }), 0.0);
    assert_eq!(action, Action::None);
    assert_eq!(d.tick(0.0), before);
}

#[test]
fn clear_shapes_keeps_fixed_and_transient() {
    let mut d = core();
    for id in ["s1", "s2", "s3"] {
        d.handle(shape(id), 0.0);
    }
    d.handle(fixed("f1"), 0.0);
    d.handle(fixed("f2"), 0.0);
    d.handle(comment("flying"), 0.0);

    d.handle(ServerEvent::ClearShapes, 10.0);

    let scene = d.tick(10.0);
    assert!(scene.shapes.is_empty());
    assert_eq!(scene.fixed.len(), 2);
    assert_eq!(scene.comments.len(), 1);
}

#[test]
fn update_before_create_materialises_shape() {
    let mut d = core();
    let update = ServerEvent::UpdateShape(ShapeFields { id: "s".into(), x: Some(12.0), ..ShapeFields::default() });
    d.handle(update.clone(), 0.0);
    d.handle(update, 0.0);
    let scene = d.tick(0.0);
    assert_eq!(scene.shapes.len(), 1);
    assert_eq!(scene.shapes[0].x, 12.0);
}

// =============================================================
// Indicator, moderation snapshot, connection
// =============================================================

#[test]
fn indicator_show_and_hide() {
    let mut d = core();
    let payload = serde_json::json!({"source": "screen-1"});
    d.handle(ServerEvent::ShowIndicator(IndicatorPayload { payload: payload.clone() }), 0.0);
    assert_eq!(d.tick(0.0).indicator, Some(payload));
    assert_eq!(d.handle(ServerEvent::HideIndicator, 0.0), Action::RenderNeeded);
    assert_eq!(d.tick(0.0).indicator, None);
    assert_eq!(d.handle(ServerEvent::HideIndicator, 0.0), Action::None);
}

#[test]
fn moderation_snapshot_is_recorded() {
    let mut d = core();
    let list = ModerationList { words: vec!["damn".into()] };
    assert_eq!(d.handle(ServerEvent::ModerationListSnapshot(list), 0.0), Action::None);
    assert_eq!(d.banned_words(), ["damn".to_owned()]);
}

#[test]
fn server_closing_disconnects_and_reset_starts_over() {
    let mut d = core();
    d.handle(fixed("f"), 0.0);
    d.handle(shape("s"), 0.0);
    d.handle(comment("c"), 0.0);

    let action = d.handle(ServerEvent::ServerClosing(ClosingNotice { port: 4000 }), 0.0);
    assert_eq!(action, Action::Disconnected { port: 4000 });
    assert!(!d.tick(0.0).connected);

    d.reset();
    let scene = d.tick(0.0);
    assert!(scene.connected);
    assert!(scene.fixed.is_empty() && scene.shapes.is_empty() && scene.comments.is_empty());
}

#[test]
fn resize_recomputes_lanes() {
    let mut d = core();
    d.resize(1200.0, 450.0);
    assert_eq!(d.transient().lanes().map(|l| l.layout().count), Some(5));
    assert_eq!(d.config().width, 1200.0);
}
