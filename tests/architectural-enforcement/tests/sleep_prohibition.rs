//! Sleep Prohibition
//!
//! Reveal pacing and mouth swaps are deadline-driven (`sleep_until` on the
//! scheduler's next deadline). Nothing in production code may block a thread
//! or poll with a fixed sleep; the only fixed sleep allowed is the TUI frame
//! tick in `tui/src/app.rs`.

use architectural_enforcement::{assert_clean, scan};

#[test]
fn test_no_thread_sleep() {
    let violations = scan(&["presenter/core/src", "tui/src"], |_, code| {
        code.contains("thread::sleep")
    });
    assert_clean("no std::thread::sleep in production code", &violations);
}

#[test]
fn test_fixed_sleeps_only_for_frame_tick() {
    let violations = scan(&["presenter/core/src", "tui/src"], |path, code| {
        let sleeps = code.contains("::sleep(") || code.contains(" sleep(");
        let frame_tick = path.ends_with("tui/src/app.rs") && code.contains("sleep(FRAME)");
        sleeps && !frame_tick
    });
    assert_clean("fixed sleeps only for the TUI frame tick", &violations);
}
