#![no_main]

use libfuzzer_sys::fuzz_target;
use tfc_plan::{PlanMode, PlanSummarizer};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    for mode in [PlanMode::Summary, PlanMode::Simple, PlanMode::Full] {
        let summarizer = PlanSummarizer::new(mode).expect("patterns compile");
        let body = summarizer.summarize(&raw);
        assert!(body.is_empty() || body.ends_with('\n'));
        let message = summarizer.render(&raw, "Plan");
        assert!(message.starts_with("## Plan\n\n```diff\n"));
        assert!(message.ends_with("```\n"));
    }
});
