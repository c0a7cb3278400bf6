//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The catalog core stays free of terminal dependencies
//! - Production async code does not do blocking I/O
//!
//! The helpers here do a line-oriented scan of source files. They are
//! deliberately simple: test modules are recognised by a `#[cfg(test)]`
//! line and everything after it in the file is skipped.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, resolved from this crate's manifest directory
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// A rule violation at a source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: PathBuf,
    pub line: usize,
    pub text: String,
    pub reason: &'static str,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.reason,
            self.text
        )
    }
}

/// Every `.rs` file under `dir` (relative to the workspace root)
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let path = workspace_root().join(dir);
    if !path.exists() {
        return Vec::new();
    }

    walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Source lines up to the first `#[cfg(test)]`
pub fn production_lines(path: &Path) -> Vec<String> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };

    content
        .lines()
        .take_while(|line| line.trim() != "#[cfg(test)]")
        .map(str::to_string)
        .collect()
}

/// Code portion of a line, without a trailing `//` comment
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// `Some(true)` for an `async fn` signature, `Some(false)` for a plain
/// `fn`, `None` for anything else
pub fn fn_signature(line: &str) -> Option<bool> {
    let mut rest = line.trim();
    for prefix in ["pub(crate) ", "pub(super) ", "pub ", "const ", "unsafe "] {
        rest = rest.strip_prefix(prefix).unwrap_or(rest);
    }
    if rest.starts_with("async fn ") {
        Some(true)
    } else if rest.starts_with("fn ") {
        Some(false)
    } else {
        None
    }
}

/// Is line `idx` inside the body of an `async fn`?
pub fn in_async_fn(lines: &[String], idx: usize) -> bool {
    lines[..=idx]
        .iter()
        .rev()
        .find_map(|line| fn_signature(line))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        src.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_fn_signature() {
        assert_eq!(fn_signature("    pub async fn start(self) {"), Some(true));
        assert_eq!(fn_signature("fn main() -> Result<()> {"), Some(false));
        assert_eq!(fn_signature("pub(crate) fn decode(bytes: &[u8])"), Some(false));
        assert_eq!(fn_signature("let f = 1;"), None);
    }

    #[test]
    fn test_in_async_fn() {
        let src = lines("fn setup() {\n    open();\n}\nasync fn run() {\n    read();\n}");
        assert!(!in_async_fn(&src, 1));
        assert!(in_async_fn(&src, 4));
    }

    #[test]
    fn test_code_part_drops_comment() {
        assert_eq!(code_part("let x = 1; // std::fs"), "let x = 1; ");
    }
}
