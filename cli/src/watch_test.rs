use protocol::{CommentSubmission, FixedCommentFields, IndicatorPayload, ShapeFields};

use super::*;

fn core() -> DisplayCore {
    DisplayCore::with_seed(DisplayConfig::default(), 7)
}

#[test]
fn empty_scene_summary() {
    let scene = core().tick(0.0);
    assert_eq!(describe(&scene), "connected comments=0 fixed=0 shapes=0 indicator=off");
}

#[test]
fn summary_counts_every_layer_and_lists_fixed_text() {
    let mut core = core();
    core.handle(ServerEvent::NewComment(CommentSubmission::text("hi")), 0.0);
    core.handle(
        ServerEvent::CreateFixed(FixedCommentFields { id: "a".into(), text: Some("pinned".into()), ..Default::default() }),
        0.0,
    );
    core.handle(ServerEvent::CreateShape(ShapeFields { id: "s".into(), ..Default::default() }), 0.0);
    core.handle(ServerEvent::ShowIndicator(IndicatorPayload { payload: serde_json::json!({}) }), 0.0);

    let line = describe(&core.tick(10.0));
    assert_eq!(line, "connected comments=1 fixed=1 shapes=1 indicator=on | a: pinned");
}

#[test]
fn summary_is_stable_while_comments_move() {
    let mut core = core();
    core.handle(ServerEvent::NewComment(CommentSubmission::text("moving")), 0.0);
    assert_eq!(describe(&core.tick(100.0)), describe(&core.tick(200.0)));
}

#[test]
fn closing_notice_shows_disconnected() {
    let mut core = core();
    let action = core.handle(ServerEvent::ServerClosing(protocol::ClosingNotice { port: 4100 }), 0.0);
    assert_eq!(action, Action::Disconnected { port: 4100 });
    assert!(describe(&core.tick(0.0)).starts_with("disconnected"));
}
