//! Architectural Enforcement
//!
//! Source scanners used by the integration tests in `tests/` to enforce the
//! rules the progress bar relies on:
//! - The screen is cleared with control sequences, never by spawning a process
//! - Frame pacing waits on `tokio::time::interval`, never on sleep calls
//! - Async code does not touch blocking stdin/stdout
//!
//! Test code (everything from a `#[cfg(test)]` marker onward, and
//! `#[test]`/`#[tokio::test]` functions) is exempt.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["shellbar/core/src", "shellbar/cli/src"];

/// A rule violation found in a source file
#[derive(Debug, Clone)]
pub struct Violation {
    /// File containing the violation
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Which rule was broken
    pub rule: &'static str,
    /// The offending source line, trimmed
    pub text: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.rule,
            self.text
        )
    }
}

/// One line of source with the context a rule needs
#[derive(Debug, Clone, Copy)]
pub struct SourceLine<'a> {
    /// Code with any trailing `//` comment removed
    pub code: &'a str,
    /// Whether the line belongs to test code
    pub in_test: bool,
    /// Whether the enclosing function is `async`
    pub in_async: bool,
}

/// Workspace root (two levels above this crate)
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Absolute paths of [`PRODUCTION_DIRS`]
#[must_use]
pub fn production_dirs() -> Vec<PathBuf> {
    let root = workspace_root();
    PRODUCTION_DIRS.iter().map(|dir| root.join(dir)).collect()
}

/// Scan every `.rs` file under `dirs` with `rule`
///
/// `rule` returns the name of the broken rule, or `None` if the line is fine.
pub fn scan<F>(dirs: &[PathBuf], rule: F) -> Vec<Violation>
where
    F: Fn(&SourceLine<'_>) -> Option<&'static str>,
{
    let mut violations = Vec::new();

    for dir in dirs {
        for entry in walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }
            let Ok(content) = fs::read_to_string(path) else {
                continue;
            };
            violations.extend(scan_source(path, &content, &rule));
        }
    }

    violations
}

/// Scan a single file's content
pub fn scan_source<F>(path: &Path, content: &str, rule: &F) -> Vec<Violation>
where
    F: Fn(&SourceLine<'_>) -> Option<&'static str>,
{
    let lines: Vec<&str> = content.lines().collect();
    let test_start = lines
        .iter()
        .position(|l| l.trim().starts_with("#[cfg(test)]"))
        .unwrap_or(lines.len());

    let mut violations = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let source = SourceLine {
            code: strip_comment(line),
            in_test: idx >= test_start || is_in_test_function(&lines, idx),
            in_async: is_in_async_function(&lines, idx),
        };
        if let Some(rule_name) = rule(&source) {
            violations.push(Violation {
                path: path.to_path_buf(),
                line: idx + 1,
                rule: rule_name,
                text: line.trim().to_string(),
            });
        }
    }
    violations
}

/// Panic with a readable report if `violations` is not empty
pub fn assert_clean(violations: &[Violation], headline: &str, guidance: &[&str]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {headline}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!();
    for hint in guidance {
        eprintln!("  {hint}");
    }

    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}

fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with("//") {
        return "";
    }
    line.split(" //").next().unwrap_or(line)
}

/// Check if line is inside a `#[test]` or `#[tokio::test]` function
#[must_use]
pub fn is_in_test_function(lines: &[&str], current_idx: usize) -> bool {
    let Some(fn_idx) = enclosing_fn(lines, current_idx) else {
        return false;
    };

    for i in (0..fn_idx).rev() {
        let line = lines[i].trim();
        if line.starts_with("#[test]") || line.starts_with("#[tokio::test") {
            return true;
        }
        if !line.starts_with("#[") && !line.starts_with("///") {
            break;
        }
    }
    false
}

/// Check if line is inside an async function
#[must_use]
pub fn is_in_async_function(lines: &[&str], current_idx: usize) -> bool {
    enclosing_fn(lines, current_idx).is_some_and(|i| lines[i].contains("async fn "))
}

/// Index of the nearest function signature at or above `current_idx`
fn enclosing_fn(lines: &[&str], current_idx: usize) -> Option<usize> {
    for i in (0..=current_idx).rev() {
        let line = lines[i].trim();

        if line.starts_with("fn ") || line.contains(" fn ") {
            return Some(i);
        }

        // Stop at module/impl boundaries
        if line.starts_with("mod ") || (line.starts_with("impl") && line.contains('{')) {
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(code: &str) -> Vec<Violation> {
        scan_source(Path::new("sample.rs"), code, &|line: &SourceLine<'_>| {
            (!line.in_test && line.code.contains("forbidden()")).then_some("forbidden call")
        })
    }

    #[test]
    fn test_async_function_detection() {
        let code = vec!["async fn render() {", "    draw().await;", "}"];
        assert!(is_in_async_function(&code, 1));

        let code = vec!["fn load() {", "    read();", "}"];
        assert!(!is_in_async_function(&code, 1));
    }

    #[test]
    fn test_test_function_detection() {
        let code = vec![
            "#[tokio::test]",
            "async fn test_something() {",
            "    forbidden();",
            "}",
        ];
        assert!(is_in_test_function(&code, 2));
    }

    #[test]
    fn test_production_violation_reported() {
        let violations = check("fn main() {\n    forbidden();\n}\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, 2);
    }

    #[test]
    fn test_cfg_test_module_exempt() {
        let violations = check("fn main() {}\n\n#[cfg(test)]\nmod tests {\n    fn helper() { forbidden(); }\n}\n");
        assert!(violations.is_empty());
    }

    #[test]
    fn test_comments_ignored() {
        let violations = check("fn main() {\n    // forbidden() used to live here\n}\n");
        assert!(violations.is_empty());
    }

    #[test]
    fn test_production_dirs_exist() {
        for dir in production_dirs() {
            assert!(dir.is_dir(), "missing production dir {}", dir.display());
        }
    }
}
