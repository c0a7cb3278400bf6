//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: production async code must not block the runtime.
//! **Required**: `tokio::fs`, `tokio::net`, `tokio::process` inside `async fn`.
//!
//! Blocking calls are acceptable in plain functions that run before the
//! runtime starts (config loading, log file setup) and in test code.

use architectural_enforcement::{code_part, in_async_fn, production_lines, rust_files, Violation};

const CHECKED_DIRS: &[&str] = &["catalog/core/src", "catalog/daemon/src", "tui/src"];

const BLOCKING_PATTERNS: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("fs::read_to_string(", "Blocking file I/O"),
    ("std::net::TcpStream", "Blocking network I/O"),
    ("std::net::TcpListener", "Blocking network I/O"),
    ("std::process::Command", "Blocking process I/O"),
    ("reqwest::blocking", "Blocking HTTP client"),
    ("std::thread::sleep", "Blocking sleep"),
];

fn find_blocking_io_violations() -> Vec<Violation> {
    let mut violations = Vec::new();

    for dir in CHECKED_DIRS {
        for path in rust_files(dir) {
            let lines = production_lines(&path);
            for (idx, line) in lines.iter().enumerate() {
                if !in_async_fn(&lines, idx) {
                    continue;
                }
                let code = code_part(line);
                for (pattern, reason) in BLOCKING_PATTERNS {
                    // tokio::fs::read_to_string is fine
                    if code.contains(pattern) && !code.contains(&format!("tokio::{pattern}")) {
                        violations.push(Violation {
                            path: path.clone(),
                            line: idx + 1,
                            text: line.trim().to_string(),
                            reason,
                        });
                    }
                }
            }
        }
    }

    violations
}

#[test]
fn test_no_blocking_io_in_async_production_code() {
    let violations = find_blocking_io_violations();

    if !violations.is_empty() {
        eprintln!("\nBlocking I/O calls found in async production code:\n");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nUse tokio::fs, tokio::net, tokio::time::sleep instead.");

        panic!(
            "Found {} blocking I/O violation(s) in production code",
            violations.len()
        );
    }
}
