//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. Frame pacing waits
//! on a `tokio::time::interval` tick raced against the stop signal, so a stop
//! request is observed without sitting out a full sleep.
//! **Exceptions**: test code

use architectural_enforcement::{assert_clean, production_dirs, scan, SourceLine};

const SLEEP_PATTERNS: &[&str] = &[
    "thread::sleep(",
    "time::sleep(",
    "tokio::time::sleep",
    "sleep_until(",
];

fn sleep_rule(line: &SourceLine<'_>) -> Option<&'static str> {
    if line.in_test {
        return None;
    }
    SLEEP_PATTERNS
        .iter()
        .any(|p| line.code.contains(p))
        .then_some("sleep call")
}

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan(&production_dirs(), sleep_rule);

    assert_clean(
        &violations,
        "CRITICAL: Sleep calls found in production code!",
        &[
            "✅ Pace frames with tokio::time::interval() inside tokio::select!",
            "✅ Wait for stop requests on tokio::sync::Notify",
            "❌ Sleep in the render loop delays stop by a whole tick",
        ],
    );
}

#[test]
fn test_sleep_rule_flags_render_loop_sleep() {
    let line = SourceLine {
        code: "        tokio::time::sleep(options.tick_interval).await;",
        in_test: false,
        in_async: true,
    };
    assert_eq!(sleep_rule(&line), Some("sleep call"));
}

#[test]
fn test_sleep_rule_allows_interval_and_tests() {
    let interval = SourceLine {
        code: "    let mut ticker = tokio::time::interval(options.tick_interval);",
        in_test: false,
        in_async: true,
    };
    assert_eq!(sleep_rule(&interval), None);

    let in_test = SourceLine {
        code: "        std::thread::sleep(Duration::from_millis(5));",
        in_test: true,
        in_async: false,
    };
    assert_eq!(sleep_rule(&in_test), None);
}
