use crate::line_classifier::{classify_line, LinePatterns};
use crate::plan_mode::{PlanError, PlanMode};

/// Renders raw `terraform show -no-color` output for one mode.
#[derive(Debug, Clone)]
pub struct PlanSummarizer {
    mode: PlanMode,
    patterns: LinePatterns,
}

impl PlanSummarizer {
    pub fn new(mode: PlanMode) -> Result<Self, PlanError> {
        let patterns = LinePatterns::compile()?;
        Ok(Self { mode, patterns })
    }

    /// Projects `raw` into the mode body. Single forward pass, input order.
    pub fn summarize(&self, raw: &str) -> String {
        let mut body = String::new();
        for line in raw.lines() {
            classify_line(line, self.mode, &self.patterns).write_to(line, &mut body);
        }
        body
    }

    pub fn render(&self, raw: &str, title: &str) -> String {
        render_plan_message(title, &self.summarize(raw))
    }
}

/// Wraps a mode body in the titled, diff-fenced comment message.
pub fn render_plan_message(title: &str, body: &str) -> String {
    format!("## {title}\n\n```diff\n{body}```\n")
}

/// Parses `mode` before touching `raw`, then renders the titled message.
pub fn summarize_plan(raw: &str, mode: &str, title: &str) -> Result<String, PlanError> {
    let mode: PlanMode = mode.parse()?;
    let summarizer = PlanSummarizer::new(mode)?;
    Ok(summarizer.render(raw, title))
}
