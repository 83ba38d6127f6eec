//! Failure report formatting.
//!
//! The report is plain text with a fixed line structure so it can be
//! pattern-matched by tooling and pasted straight into a regression test:
//!
//! ```text
//! property failed after 3/100 runs
//! seed: 123456
//! shrinks: 7
//! counterexample: 42
//! replay: replay(arb, prop, 123456, 100)
//! ```

use serde::Serialize;

use crate::execution::PropertyFailure;

fn render_value<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "<unserializable>".to_string())
}

/// Render the canonical failure report for a shrunk property failure.
pub fn render_failure<T: Serialize>(failure: &PropertyFailure<T>) -> String {
    format!(
        "property failed after {}/{} runs\nseed: {}\nshrinks: {}\ncounterexample: {}\nreplay: replay(arb, prop, {}, {})",
        failure.iterations,
        failure.runs,
        failure.seed,
        failure.shrinks,
        render_value(&failure.counterexample),
        failure.seed,
        failure.runs,
    )
}
