//! Model failure report formatting.
//!
//! Same line discipline as the core property report, with the failing
//! command sequence spelled out:
//!
//! ```text
//! model failed after 4/100 runs
//! seed: 42
//! shrinks: 9
//! sequence:
//!   1. increment(17)
//!   2. reset  <-- check failed
//! replay: replay_model(spec, 42, 100)
//! ```

use crate::execution::ModelFailure;

/// Longest rendered parameter before truncation.
const MAX_PARAM_CHARS: usize = 80;

fn render_param(param: &serde_json::Value) -> String {
    let rendered = param.to_string();
    if rendered.chars().count() > MAX_PARAM_CHARS {
        let truncated: String = rendered.chars().take(MAX_PARAM_CHARS).collect();
        format!("{}...", truncated)
    } else {
        rendered
    }
}

/// Render the canonical failure report for a shrunk model failure.
pub fn render_model_failure(failure: &ModelFailure) -> String {
    let mut out = format!(
        "model failed after {}/{} runs\nseed: {}\nshrinks: {}\nsequence:",
        failure.iterations, failure.runs, failure.seed, failure.shrinks,
    );
    for (index, step) in failure.sequence.iter().enumerate() {
        out.push('\n');
        match &step.param {
            Some(param) => {
                out.push_str(&format!("  {}. {}({})", index + 1, step.name, render_param(param)));
            }
            None => {
                out.push_str(&format!("  {}. {}", index + 1, step.name));
            }
        }
        if failure.failed_step == Some(index) {
            out.push_str("  <-- check failed");
        }
    }
    out.push_str(&format!(
        "\nreplay: replay_model(spec, {}, {})",
        failure.seed, failure.runs
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::RecordedStep;
    use serde_json::json;

    fn sample() -> ModelFailure {
        ModelFailure {
            seed: 42,
            runs: 100,
            iterations: 4,
            shrinks: 9,
            sequence: vec![
                RecordedStep {
                    name: "increment".to_string(),
                    param: Some(json!(17)),
                },
                RecordedStep {
                    name: "reset".to_string(),
                    param: None,
                },
            ],
            failed_step: Some(1),
            error: None,
        }
    }

    #[test]
    fn report_has_the_documented_line_structure() {
        let report = render_model_failure(&sample());
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "model failed after 4/100 runs");
        assert_eq!(lines[1], "seed: 42");
        assert_eq!(lines[2], "shrinks: 9");
        assert_eq!(lines[3], "sequence:");
        assert_eq!(lines[4], "  1. increment(17)");
        assert_eq!(lines[5], "  2. reset  <-- check failed");
        assert_eq!(lines[6], "replay: replay_model(spec, 42, 100)");
    }

    #[test]
    fn long_parameters_are_truncated() {
        let mut failure = sample();
        failure.sequence[0].param = Some(json!("x".repeat(200)));
        let report = render_model_failure(&failure);
        let line = report.lines().nth(4).unwrap();
        assert!(line.ends_with("...)"));
        assert!(line.len() < 120);
    }
}
