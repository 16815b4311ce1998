use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::plan::{Plan, PlanSource, Step};

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("url pattern compiles"));

static READ_INTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(read|reading|extract|extracting|get|getting)\b")
        .expect("read intent pattern compiles")
});

/// Search engines recognised by name, checked in order.
const SEARCH_ENGINES: [(&str, &str); 3] = [
    ("google", "https://www.google.com"),
    ("bing", "https://www.bing.com"),
    ("duckduckgo", "https://duckduckgo.com"),
];

/// Deterministic planner used when no generative backend is configured or
/// its answer cannot be used.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedPlanner;

impl RuleBasedPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(&self, task: &str) -> Plan {
        let steps = Self::steps_for(task);
        debug!(steps = steps.len(), "Built rule-based plan");
        Plan::new(steps, "Fallback plan: the requested page is reached", PlanSource::Fallback)
    }

    fn steps_for(task: &str) -> Vec<Step> {
        if let Some(found) = URL_PATTERN.find(task) {
            let mut steps = vec![Step::navigate(found.as_str()).with_reason("Open the URL named in the task")];
            if READ_INTENT.is_match(task) {
                steps.push(Step::extract_text("body").with_reason("Read the page content"));
            }
            return steps;
        }

        let lowered = task.to_lowercase();
        let engine = SEARCH_ENGINES.iter().find(|(name, _)| {
            lowered
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == *name)
        });
        if let Some((name, url)) = engine {
            return vec![Step::navigate(*url).with_reason(format!("Open {name}"))];
        }

        vec![Step::noop().with_reason("No deterministic plan for this task")]
    }
}
