//! Integration Test: Headless Core
//!
//! `catalog-core` must run without a terminal. Rendering and terminal I/O
//! belong to the TUI crate; the core only sees `SessionEvent`s and exposes
//! state.

use architectural_enforcement::{code_part, production_lines, rust_files, workspace_root};

const FORBIDDEN_CRATES: &[&str] = &["ratatui", "crossterm"];

#[test]
fn test_core_manifest_has_no_terminal_crates() {
    let manifest = workspace_root().join("catalog/core/Cargo.toml");
    let content = std::fs::read_to_string(&manifest).expect("read catalog/core/Cargo.toml");

    for line in content.lines() {
        let name = line.split('=').next().unwrap_or("").trim();
        assert!(
            !FORBIDDEN_CRATES.contains(&name),
            "catalog-core depends on terminal crate `{name}`"
        );
    }
}

#[test]
fn test_core_sources_do_not_use_terminal_crates() {
    let files = rust_files("catalog/core/src");
    assert!(!files.is_empty(), "no sources found under catalog/core/src");

    let mut violations = Vec::new();
    for path in files {
        for (idx, line) in production_lines(&path).iter().enumerate() {
            let code = code_part(line);
            for krate in FORBIDDEN_CRATES {
                if code.contains(&format!("{krate}::")) {
                    violations.push(format!("{}:{} - {}", path.display(), idx + 1, line.trim()));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "terminal crates used in catalog-core:\n  {}",
        violations.join("\n  ")
    );
}
