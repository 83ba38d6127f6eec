//! Error types and property verdicts.

use std::fmt;

/// Errors surfaced by the engine.
///
/// `Config` and `Generation` are unrecoverable and returned as `Err` from
/// the run entry points; a failing property is not an error at the `run`
/// level and only becomes one (`Failed`) at the `assert_*` boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyError {
    /// Invalid run configuration, rejected before any generation.
    Config {
        message: String,
        field: Option<String>,
    },

    /// A generator exhausted its retry budget (filter predicate never
    /// satisfied, unique collection could not reach its minimum size).
    Generation { message: String },

    /// A property failed; carries the full formatted report and the
    /// failing predicate's own error text, if any.
    Failed {
        report: String,
        cause: Option<String>,
    },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyError::Config { message, field } => {
                write!(f, "configuration error: {}", message)?;
                if let Some(field) = field {
                    write!(f, " (field: {})", field)?;
                }
                Ok(())
            }
            PropertyError::Generation { message } => {
                write!(f, "generation error: {}", message)
            }
            PropertyError::Failed { report, cause } => {
                write!(f, "{}", report)?;
                if let Some(cause) = cause {
                    write!(f, "\ncaused by: {}", cause)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for PropertyError {}

impl PropertyError {
    /// Create a configuration error naming the offending field.
    pub fn config(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a generation error.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }
}

/// Outcome of checking a property against one input.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Pass,
    Fail { error: Option<String> },
}

impl Verdict {
    pub fn is_fail(&self) -> bool {
        matches!(self, Verdict::Fail { .. })
    }
}

/// Conversion from the values a property body may return.
///
/// `false` fails; `true`, `()` and `Ok(())` pass; `Err` fails and the error
/// text is preserved on the eventual failure.
pub trait IntoVerdict {
    fn into_verdict(self) -> Verdict;
}

impl IntoVerdict for Verdict {
    fn into_verdict(self) -> Verdict {
        self
    }
}

impl IntoVerdict for bool {
    fn into_verdict(self) -> Verdict {
        if self {
            Verdict::Pass
        } else {
            Verdict::Fail { error: None }
        }
    }
}

impl IntoVerdict for () {
    fn into_verdict(self) -> Verdict {
        Verdict::Pass
    }
}

impl<E: fmt::Display> IntoVerdict for Result<(), E> {
    fn into_verdict(self) -> Verdict {
        match self {
            Ok(()) => Verdict::Pass,
            Err(e) => Verdict::Fail {
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_verdicts() {
        assert_eq!(true.into_verdict(), Verdict::Pass);
        assert!(false.into_verdict().is_fail());
    }

    #[test]
    fn result_verdict_keeps_error_text() {
        let verdict = Result::<(), &str>::Err("boom").into_verdict();
        assert_eq!(
            verdict,
            Verdict::Fail {
                error: Some("boom".to_string())
            }
        );
    }

    #[test]
    fn config_error_display_names_field() {
        let err = PropertyError::config("runs must be positive", "runs");
        let text = err.to_string();
        assert!(text.contains("configuration error"));
        assert!(text.contains("runs"));
    }

    #[test]
    fn failed_display_appends_cause() {
        let err = PropertyError::Failed {
            report: "property failed after 1/1 runs".to_string(),
            cause: Some("index out of bounds".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("caused by: index out of bounds"));
    }
}
