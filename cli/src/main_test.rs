use clap::CommandFactory;

use super::*;

fn parse(args: &[&str]) -> Command {
    let mut argv = vec!["livewall-cli"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).expect("parse").command
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn send_builds_a_fixed_submission() {
    let Command::Send(args) = parse(&["send", "hello", "--fixed", "--position", "30", "--size", "large", "--id", "f1"])
    else {
        panic!("expected send");
    };
    let comment = submission(args);
    assert_eq!(comment.text.as_deref(), Some("hello"));
    assert!(comment.is_fixed);
    assert_eq!(comment.position, Some(30.0));
    assert_eq!(comment.size, Some(FontSize::Large));
    assert_eq!(comment.id.as_deref(), Some("f1"));
}

#[test]
fn pinned_send_without_id_carries_a_generated_one() {
    let Command::Send(args) = parse(&["send", "pin", "--fixed"]) else {
        panic!("expected send");
    };
    let comment = submission(args);
    assert!(comment.id.as_deref().is_some_and(|id| !id.is_empty()));
}

#[test]
fn scrolling_send_has_no_id() {
    let Command::Send(args) = parse(&["send", "hello"]) else {
        panic!("expected send");
    };
    assert!(submission(args).id.is_none());
}

#[test]
fn update_requires_an_id() {
    assert!(Cli::try_parse_from(["livewall-cli", "fixed", "update", "--text", "x"]).is_err());
    assert!(Cli::try_parse_from(["livewall-cli", "shape", "update", "--x", "5"]).is_err());
}

#[test]
fn unknown_font_is_rejected_by_the_parser() {
    let argv = ["livewall-cli", "send", "hi", "--font", "comic"];
    assert!(Cli::try_parse_from(argv).is_err());
}

#[test]
fn fixed_update_keeps_absent_fields_unset() {
    let Command::Fixed(fixed) = parse(&["fixed", "update", "--id", "a", "--x", "12.5"]) else {
        panic!("expected fixed");
    };
    let ClientEvent::UpdateFixed(fields) = fixed_event(fixed.command) else {
        panic!("expected update_fixed");
    };
    assert_eq!(fields.id, "a");
    assert_eq!(fields.x, Some(12.5));
    assert!(fields.text.is_none());
    assert!(fields.y.is_none());
}

#[test]
fn create_without_id_generates_one() {
    let Command::Shape(shape) = parse(&["shape", "create", "--type", "circle"]) else {
        panic!("expected shape");
    };
    let ClientEvent::CreateShape(fields) = shape_event(shape.command) else {
        panic!("expected create_shape");
    };
    assert!(!fields.id.is_empty());
    assert_eq!(fields.kind, Some(ShapeKind::Circle));
}

#[test]
fn delete_and_clear_map_to_their_events() {
    let Command::Fixed(fixed) = parse(&["fixed", "delete", "a"]) else {
        panic!("expected fixed");
    };
    assert_eq!(fixed_event(fixed.command), ClientEvent::DeleteFixed(ObjectRef { id: "a".into() }));

    let Command::Shape(shape) = parse(&["shape", "clear"]) else {
        panic!("expected shape");
    };
    assert_eq!(shape_event(shape.command), ClientEvent::ClearShapes);
}

#[test]
fn indicator_payload_is_parsed_as_json() {
    let show = IndicatorSubcommand::Show { payload: Some(r#"{"who":"alice"}"#.into()) };
    let ClientEvent::ShowIndicator(indicator) = indicator_event(show).expect("event") else {
        panic!("expected show_indicator");
    };
    assert_eq!(indicator.payload["who"], "alice");

    let bad = IndicatorSubcommand::Show { payload: Some("{".into()) };
    assert!(matches!(indicator_event(bad), Err(CliError::InvalidJson(_))));
}

#[test]
fn indicator_without_payload_sends_empty_object() {
    let ClientEvent::ShowIndicator(indicator) = indicator_event(IndicatorSubcommand::Show { payload: None }).expect("event")
    else {
        panic!("expected show_indicator");
    };
    assert_eq!(indicator.payload, serde_json::json!({}));
}

#[test]
fn word_list_skips_blanks_and_comments() {
    let words = parse_word_list("damn\n\n  # swear words\n spoiler \n");
    assert_eq!(words, ["damn", "spoiler"]);
}

#[test]
fn moderate_words_and_file_conflict() {
    let argv = ["livewall-cli", "moderate", "a", "--file", "words.txt"];
    assert!(Cli::try_parse_from(argv).is_err());
}

#[test]
fn watch_defaults_to_lanes() {
    let Command::Watch(args) = parse(&["watch"]) else {
        panic!("expected watch");
    };
    assert_eq!(args.policy, PlacementPolicy::Lanes);
    assert_eq!(args.tick_ms, 250);

    let Command::Watch(args) = parse(&["watch", "--policy", "floating"]) else {
        panic!("expected watch");
    };
    assert_eq!(args.policy, PlacementPolicy::Floating);
}
