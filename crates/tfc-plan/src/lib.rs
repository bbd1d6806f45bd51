//! Terraform plan rendering for the plan commenter.
//! This crate classifies `terraform show -no-color` output line by line and
//! renders the mode-specific markdown message published on pull requests.

pub mod line_classifier;
pub mod plan_artifact;
pub mod plan_mode;
pub mod plan_summary;

pub use line_classifier::{classify_line, LineEmission, LinePatterns};
pub use plan_artifact::{plan_artifact_path, DEFAULT_TF_DATA_DIR};
pub use plan_mode::{PlanError, PlanMode};
pub use plan_summary::{render_plan_message, summarize_plan, PlanSummarizer};
