//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: async functions MUST NOT use blocking terminal or file I/O.
//! The bar is drawn through `tokio::io::AsyncWrite` and the CLI reads input
//! with `tokio::io::stdin`.
//! **Exceptions**: sync functions (config loading runs before the runtime does
//! any rendering), test code

use architectural_enforcement::{assert_clean, production_dirs, scan, SourceLine};

const BLOCKING_PATTERNS: &[(&str, &str)] = &[
    ("std::io::stdout()", "blocking stdout"),
    ("std::io::stdin()", "blocking stdin"),
    ("io::stdout().lock()", "blocking stdout"),
    ("println!(", "blocking stdout"),
    ("print!(", "blocking stdout"),
    ("std::fs::", "blocking file I/O"),
    ("fs::read_to_string(", "blocking file I/O"),
];

fn blocking_rule(line: &SourceLine<'_>) -> Option<&'static str> {
    if line.in_test || !line.in_async {
        return None;
    }
    BLOCKING_PATTERNS
        .iter()
        .find(|(pattern, _)| line.code.contains(pattern))
        .map(|(_, rule)| *rule)
}

/// Test that async functions do not perform blocking I/O
#[test]
fn test_no_blocking_io_in_async() {
    let violations = scan(&production_dirs(), blocking_rule);

    assert_clean(
        &violations,
        "CRITICAL: Blocking I/O found in async functions!",
        &[
            "✅ Write frames with tokio::io::AsyncWriteExt",
            "✅ Read input with tokio::io::stdin() and AsyncBufReadExt",
            "✅ Load files in sync code before spawning the renderer",
        ],
    );
}

#[test]
fn test_blocking_rule_flags_async_println() {
    let line = SourceLine {
        code: "    println!(\"{frame}\");",
        in_test: false,
        in_async: true,
    };
    assert_eq!(blocking_rule(&line), Some("blocking stdout"));
}

#[test]
fn test_blocking_rule_allows_sync_fs() {
    let line = SourceLine {
        code: "    let content = std::fs::read_to_string(path)?;",
        in_test: false,
        in_async: false,
    };
    assert_eq!(blocking_rule(&line), None);
}
