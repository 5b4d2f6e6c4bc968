//! Blocking I/O Prohibition
//!
//! The TUI redraws every frame and the reveal drivers share its runtime, so
//! production code must not block on the filesystem, sockets or child
//! processes.
//!
//! Allowed:
//! - Setup in `tui/src/main.rs` that runs before the event loop (log file)
//! - Configuration loading in `presenter/core/src/config/`, which `main`
//!   calls before the event loop starts
//!
//! Even there, blocking calls must sit in a non-async function.
//!
//! Use instead:
//! - `tokio::fs::read_to_string` / `tokio::fs::write`
//! - `tokio::task::spawn_blocking` for unavoidable blocking work
//! - `reqwest::Client` (async) for HTTP

use std::path::Path;

use architectural_enforcement::{assert_clean, production_lines, scan};

const SCANNED: &[&str] = &["presenter/core/src", "tui/src"];

fn is_blocking_io(code: &str) -> bool {
    if code.contains("tokio::fs::") {
        return false;
    }
    code.contains("std::fs")
        || code.contains("File::create(")
        || code.contains("File::open(")
        || code.contains("std::net::")
        || code.contains("reqwest::blocking")
        || code.contains("std::process::Command")
}

fn is_setup_file(path: &Path) -> bool {
    path.ends_with("tui/src/main.rs")
        || path
            .to_string_lossy()
            .contains("presenter/core/src/config/")
}

/// Whether the nearest enclosing `fn` above `line` is async
fn enclosed_by_async_fn(lines: &[(usize, String)], line: usize) -> bool {
    lines
        .iter()
        .rev()
        .filter(|(number, _)| *number < line)
        .find(|(_, code)| code.contains("fn "))
        .is_some_and(|(_, code)| code.contains("async fn "))
}

#[test]
fn test_no_blocking_io_outside_setup() {
    let violations = scan(SCANNED, |path, code| {
        is_blocking_io(code) && !is_setup_file(path)
    });
    assert_clean(
        "no blocking file, network or process I/O outside startup setup",
        &violations,
    );
}

#[test]
fn test_setup_blocking_io_stays_out_of_async_fns() {
    let violations = scan(SCANNED, |path, code| {
        if !is_setup_file(path) || !is_blocking_io(code) {
            return false;
        }
        let lines = production_lines(path);
        let Some(line) = lines.iter().find(|(_, c)| c == code).map(|(n, _)| *n) else {
            return false;
        };
        enclosed_by_async_fn(&lines, line)
    });
    assert_clean(
        "startup blocking I/O only in non-async functions",
        &violations,
    );
}

#[test]
fn test_sprite_files_load_asynchronously() {
    let lines = production_lines(
        &architectural_enforcement::workspace_root().join("tui/src/avatar/sprites.rs"),
    );
    assert!(
        lines
            .iter()
            .any(|(_, code)| code.contains("tokio::fs::read_to_string")),
        "sprite files must be read with tokio::fs"
    );
}

#[test]
fn test_enclosing_fn_detection() {
    let lines: Vec<(usize, String)> = [
        "fn setup() {",
        "    std::fs::read(\"a\");",
        "}",
        "async fn run() {",
        "    std::fs::read(\"b\");",
        "}",
    ]
    .iter()
    .enumerate()
    .map(|(i, l)| (i + 1, (*l).to_string()))
    .collect();

    assert!(!enclosed_by_async_fn(&lines, 2));
    assert!(enclosed_by_async_fn(&lines, 5));
    assert!(is_blocking_io(&lines[1].1));
    assert!(!is_blocking_io("tokio::fs::read_to_string(path).await"));
}
