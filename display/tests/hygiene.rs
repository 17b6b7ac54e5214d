//! Hygiene: source budgets for the display crate.
//!
//! Scans production sources under `src/` for patterns that either crash a
//! display mid-show or swallow failures. Each pattern has a budget; the budget
//! only ever goes down.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::Path;

// Crashes.
const MAX_UNWRAP: usize = 0;
const MAX_EXPECT: usize = 0;
const MAX_PANIC: usize = 0;
const MAX_UNREACHABLE: usize = 0;
const MAX_TODO: usize = 0;

// Silent loss.
const MAX_SILENT_DISCARD: usize = 0;
const MAX_DOT_OK: usize = 0;

// Output belongs to the host, never to the library.
const MAX_PRINT: usize = 0;

const MAX_ALLOW_DEAD_CODE: usize = 0;

/// Production `.rs` files under `src/`, as `(path, content)`. Sibling
/// `*_test.rs` modules are skipped.
fn sources() -> Vec<(String, String)> {
    let mut out = Vec::new();
    walk(Path::new("src"), &mut out);
    out
}

fn walk(dir: &Path, out: &mut Vec<(String, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out);
            continue;
        }
        let name = path.to_string_lossy().to_string();
        if path.extension().is_some_and(|e| e == "rs") && !name.ends_with("_test.rs") {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push((name, content));
            }
        }
    }
}

/// Assert that `pattern` appears on at most `max` lines across all sources.
fn assert_budget(pattern: &str, max: usize) {
    let hits: Vec<(String, usize)> = sources()
        .into_iter()
        .filter_map(|(path, content)| {
            let count = content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then_some((path, count))
        })
        .collect();
    let total: usize = hits.iter().map(|(_, c)| c).sum();
    let listing = hits
        .iter()
        .map(|(path, count)| format!("  {path}: {count}"))
        .collect::<Vec<_>>()
        .join("\n");
    assert!(total <= max, "`{pattern}` budget exceeded: found {total}, max {max}.\n{listing}");
}

#[test]
fn sources_are_found() {
    assert!(sources().iter().any(|(path, _)| path.ends_with("lanes.rs")));
}

#[test]
fn unwrap_budget() {
    assert_budget(".unwrap()", MAX_UNWRAP);
}

#[test]
fn expect_budget() {
    assert_budget(".expect(", MAX_EXPECT);
}

#[test]
fn panic_budget() {
    assert_budget("panic!(", MAX_PANIC);
}

#[test]
fn unreachable_budget() {
    assert_budget("unreachable!(", MAX_UNREACHABLE);
}

#[test]
fn todo_budget() {
    assert_budget("todo!(", MAX_TODO);
}

#[test]
fn silent_discard_budget() {
    assert_budget("let _ =", MAX_SILENT_DISCARD);
}

#[test]
fn dot_ok_budget() {
    assert_budget(".ok()", MAX_DOT_OK);
}

#[test]
fn print_budget() {
    assert_budget("println!(", MAX_PRINT);
    assert_budget("eprintln!(", MAX_PRINT);
}

#[test]
fn allow_dead_code_budget() {
    assert_budget("#[allow(dead_code)]", MAX_ALLOW_DEAD_CODE);
}
