use std::{fmt, str::FromStr};

use thiserror::Error;

pub const PLAN_MODE_NAMES: [&str; 3] = ["summary", "simple", "full"];

#[derive(Debug, Error, Clone, PartialEq)]
/// Enumerates failures raised while preparing a plan summary.
pub enum PlanError {
    #[error("mode `{value}` is invalid, required one of [summary,simple,full]")]
    InvalidMode { value: String },
    #[error("failed to compile plan line pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Verbosity of the rendered plan, from least to most verbose.
pub enum PlanMode {
    Summary,
    Simple,
    Full,
}

impl PlanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Simple => "simple",
            Self::Full => "full",
        }
    }
}

impl FromStr for PlanMode {
    type Err = PlanError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "summary" => Ok(Self::Summary),
            "simple" => Ok(Self::Simple),
            "full" => Ok(Self::Full),
            other => Err(PlanError::InvalidMode {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PlanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{PlanError, PlanMode, PLAN_MODE_NAMES};

    #[test]
    fn unit_plan_mode_parses_every_known_name() {
        for name in PLAN_MODE_NAMES {
            let mode: PlanMode = name.parse().expect("known mode");
            assert_eq!(mode.as_str(), name);
        }
    }

    #[test]
    fn regression_plan_mode_is_case_sensitive_and_rejects_padding() {
        assert!("Full".parse::<PlanMode>().is_err());
        assert!(" full".parse::<PlanMode>().is_err());
        assert!("".parse::<PlanMode>().is_err());
    }

    #[test]
    fn functional_invalid_mode_error_names_value_and_accepted_set() {
        let error = "verbose".parse::<PlanMode>().expect_err("invalid mode");
        assert_eq!(
            error,
            PlanError::InvalidMode {
                value: "verbose".to_string()
            }
        );
        let message = error.to_string();
        assert!(message.contains("`verbose`"));
        assert!(message.contains("[summary,simple,full]"));
    }
}
