//! Layering Rules
//!
//! - `presenter-core` is headless: no terminal UI crates, in code or manifest
//! - The reveal scheduler and the avatar animator take `now` as a parameter
//!   and never touch the async runtime, so they run on a hand-advanced clock
//! - Production code propagates errors instead of unwrapping

use std::fs;

use architectural_enforcement::{assert_clean, scan, workspace_root};

const PURE_STATE_MACHINES: &[&str] = &[
    "presenter/core/src/reveal/scheduler.rs",
    "presenter/core/src/animator.rs",
];

#[test]
fn test_core_has_no_ui_crates() {
    let violations = scan(&["presenter/core/src"], |_, code| {
        code.contains("ratatui") || code.contains("crossterm")
    });
    assert_clean("presenter-core does not use terminal UI crates", &violations);

    let manifest = fs::read_to_string(workspace_root().join("presenter/core/Cargo.toml")).unwrap();
    assert!(!manifest.contains("ratatui"));
    assert!(!manifest.contains("crossterm"));
}

#[test]
fn test_state_machines_are_runtime_free() {
    let violations = scan(&["presenter/core/src"], |path, code| {
        let pure = PURE_STATE_MACHINES.iter().any(|p| path.ends_with(p));
        pure && (code.contains("tokio") || code.contains("Instant::now()"))
    });
    assert_clean("scheduler and animator take time as a parameter", &violations);
}

#[test]
fn test_no_unwrap_in_production_code() {
    let violations = scan(&["presenter/core/src", "tui/src"], |_, code| {
        code.contains(".unwrap()") || code.contains(".expect(")
    });
    assert_clean("no unwrap()/expect() in production code", &violations);
}
