//! Architectural Enforcement Integration Tests
//!
//! Source scans that keep the workspace layered the way it was designed:
//! - No blocking sleeps in production code (pacing is deadline-driven)
//! - No blocking I/O outside startup setup
//! - The reveal scheduler and the avatar animator stay runtime-free
//! - The presenter core stays free of terminal UI crates
//! - No `unwrap()`/`expect()` in production code
//!
//! The scanning helpers live here; the rules live in `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root (two levels above this package)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// One offending source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File, relative to the workspace root
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.file.display(), self.line, self.text)
    }
}

/// All `.rs` files under `dir` (relative to the workspace root)
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    if !root.exists() {
        return Vec::new();
    }
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Production lines of a file: everything before the first `#[cfg(test)]`,
/// with `//` comments stripped
pub fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(idx, line)| {
            let code = line.split("//").next().unwrap_or(line);
            (idx + 1, code.to_string())
        })
        .collect()
}

/// Scan production lines of every file under `dirs` with `matcher`
pub fn scan<F>(dirs: &[&str], matcher: F) -> Vec<Violation>
where
    F: Fn(&Path, &str) -> bool,
{
    let root = workspace_root();
    let mut violations = Vec::new();
    for dir in dirs {
        for file in rust_files(dir) {
            for (line, code) in production_lines(&file) {
                if matcher(&file, &code) {
                    violations.push(Violation {
                        file: file.strip_prefix(&root).unwrap_or(&file).to_path_buf(),
                        line,
                        text: code.trim().to_string(),
                    });
                }
            }
        }
    }
    violations
}

/// Fail with a readable list if there are violations
pub fn assert_clean(rule: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\nViolations of rule: {rule}\n");
    for v in violations {
        eprintln!("  {v}");
    }
    panic!("{} violation(s) of: {rule}", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
        assert!(!rust_files("presenter/core/src").is_empty());
    }

    #[test]
    fn test_production_lines_stop_at_tests() {
        let dir = std::env::temp_dir().join("arch-enforcement-scan");
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("sample.rs");
        fs::write(&file, "fn a() {} // x.unwrap()\n#[cfg(test)]\nmod tests {}\n").unwrap();

        let lines = production_lines(&file);
        assert_eq!(lines.len(), 1);
        assert!(!lines[0].1.contains("unwrap"));
    }
}
