use regex::Regex;

use crate::plan_mode::PlanMode;

const SYMBOL_LINE_PATTERN: &str = r"^\s{2}[\+\-~#]";
const RESOURCE_HEADER_PATTERN: &str = r"^#";
const PLAN_TOTALS_PATTERN: &str = r"^Plan:";
const NO_CHANGES_PATTERN: &str = r"This plan does nothing\.";

/// Line patterns shared by every classification of a run.
///
/// Compiled once by [`LinePatterns::compile`] and reused for each line.
#[derive(Debug, Clone)]
pub struct LinePatterns {
    symbol_line: Regex,
    resource_header: Regex,
    plan_totals: Regex,
    no_changes: Regex,
}

impl LinePatterns {
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            symbol_line: Regex::new(SYMBOL_LINE_PATTERN)?,
            resource_header: Regex::new(RESOURCE_HEADER_PATTERN)?,
            plan_totals: Regex::new(PLAN_TOTALS_PATTERN)?,
            no_changes: Regex::new(NO_CHANGES_PATTERN)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a single raw line appears in the rendered body.
pub enum LineEmission {
    Skip,
    Trimmed,
    Verbatim,
    BlankThenTrimmed,
}

impl LineEmission {
    /// Appends the emitted form of `line` to `out`, newline terminated.
    pub fn write_to(self, line: &str, out: &mut String) {
        match self {
            Self::Skip => {}
            Self::Trimmed => {
                out.push_str(line.trim_start());
                out.push('\n');
            }
            Self::Verbatim => {
                out.push_str(line);
                out.push('\n');
            }
            Self::BlankThenTrimmed => {
                out.push('\n');
                out.push_str(line.trim_start());
                out.push('\n');
            }
        }
    }
}

/// Decides how `line` is rendered in `mode`. The first matching rule wins.
pub fn classify_line(line: &str, mode: PlanMode, patterns: &LinePatterns) -> LineEmission {
    let trimmed = line.trim_start();
    match mode {
        PlanMode::Full => {
            if patterns.symbol_line.is_match(line) {
                LineEmission::Trimmed
            } else {
                LineEmission::Verbatim
            }
        }
        PlanMode::Simple => {
            if patterns.resource_header.is_match(trimmed) {
                LineEmission::Trimmed
            } else if patterns.plan_totals.is_match(trimmed) {
                LineEmission::BlankThenTrimmed
            } else if patterns.no_changes.is_match(line) {
                LineEmission::Verbatim
            } else {
                LineEmission::Skip
            }
        }
        PlanMode::Summary => {
            if patterns.plan_totals.is_match(trimmed) {
                LineEmission::Trimmed
            } else if patterns.no_changes.is_match(line) {
                LineEmission::Verbatim
            } else {
                LineEmission::Skip
            }
        }
    }
}
