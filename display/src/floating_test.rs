#![allow(clippy::float_cmp)]

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

fn slot(duration_ms: f64, fade_ms: f64) -> FloatSlot {
    FloatSlot { x: 0.0, y: 0.0, start_ms: 1_000.0, duration_ms, fade_ms }
}

#[test]
fn placement_stays_inside_safe_rectangle() {
    let mut rng = StdRng::seed_from_u64(3);
    for i in 0..500 {
        let s = place_floating(1000.0, 800.0, 120.0, 50.0, f64::from(i), FloatParams::default(), &mut rng);
        assert!(s.x >= 100.0 && s.x + 120.0 <= 900.0, "x out of bounds: {}", s.x);
        assert!(s.y >= 80.0 && s.y + 50.0 <= 720.0, "y out of bounds: {}", s.y);
        assert!(s.duration_ms >= 4000.0 && s.duration_ms < 7000.0);
        assert_eq!(s.start_ms, f64::from(i));
    }
}

#[test]
fn oversized_item_is_pinned_to_corner() {
    let mut rng = StdRng::seed_from_u64(3);
    let s = place_floating(200.0, 100.0, 500.0, 500.0, 0.0, FloatParams::default(), &mut rng);
    assert_eq!(s.x, 20.0);
    assert_eq!(s.y, 10.0);
}

#[test]
fn fixed_duration_window_is_respected() {
    let params = FloatParams { min_duration_ms: 3000.0, max_duration_ms: 3000.0, ..FloatParams::default() };
    let mut rng = StdRng::seed_from_u64(9);
    let s = place_floating(1000.0, 800.0, 10.0, 10.0, 0.0, params, &mut rng);
    assert_eq!(s.duration_ms, 3000.0);
}

#[test]
fn opacity_fades_in_holds_and_fades_out() {
    let s = slot(5_000.0, 500.0);
    assert_eq!(s.opacity_at(1_000.0), 0.0);
    assert_eq!(s.opacity_at(1_250.0), 0.5);
    assert_eq!(s.opacity_at(1_500.0), 1.0);
    assert_eq!(s.opacity_at(3_000.0), 1.0);
    assert_eq!(s.opacity_at(5_750.0), 0.5);
    assert_eq!(s.opacity_at(6_000.0), 0.0);
}

#[test]
fn opacity_is_zero_before_start() {
    assert_eq!(slot(5_000.0, 500.0).opacity_at(0.0), 0.0);
}

#[test]
fn short_lifetime_never_reaches_full_hold() {
    let s = slot(400.0, 500.0);
    assert_eq!(s.opacity_at(1_200.0), 1.0);
    assert_eq!(s.opacity_at(1_100.0), 0.5);
}

#[test]
fn finished_after_lifetime() {
    let s = slot(5_000.0, 500.0);
    assert!(!s.is_finished(5_999.0));
    assert!(s.is_finished(6_000.0));
}
