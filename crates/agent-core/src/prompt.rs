//! Prompt templates for planning, step correction, evaluation and task analysis.
//!
//! Every builder is a pure function of its inputs so prompts can be asserted on
//! in tests without a live model.

/// System prompt for plan generation.
pub const PLANNER_SYSTEM_PROMPT: &str = r#"You are an expert browser automation planner. Your job is to create precise, executable plans for web automation tasks.

You will receive:
1. A task description from the user
2. Current page analysis with available interactive elements
3. Previously executed steps (if any)

Your responsibilities:
- Find the RIGHT selectors for each action in the page analysis
- Think a few steps ahead: what will the page look like after each action?
- Provide a fallback strategy for each step
- Be specific with selectors: use ids when available, then names, then classes
- Consider timing: some actions need a wait for elements to appear

Available actions:
- navigate: Go to a URL (put the URL in "value")
- click: Click an element (requires selector)
- fill: Type into an input (requires selector and value)
- extract_text: Read text from an element (requires selector)
- wait: Wait for an element to appear (requires selector)
- screenshot: Capture the page
- scroll: Scroll to an element (requires selector)

IMPORTANT: Only use selectors that exist in the page analysis. Don't guess selectors."#;

/// System prompt for judging a single executed step.
pub const EVALUATOR_SYSTEM_PROMPT: &str = r#"You are an evaluation agent for a browser automation system.

After each step is executed, you must evaluate:

1. SUCCESS: Did the action complete without errors? Was the element found, did the action run, did the page respond as expected?
2. TASK COMPLETION: Is the user's original task now complete? Do we have the information or result that was requested?
3. RE-PLANNING: Should a new plan be created? Did the page change unexpectedly or is the current plan no longer valid?

Be precise and conservative. Only mark task_complete=true when you are confident the original goal has been achieved, and report confidence as a number between 0 and 1."#;

/// System prompt for one-shot task analysis.
pub const ORCHESTRATOR_SYSTEM_PROMPT: &str = r#"You are an orchestrator that coordinates a browser automation system made of a planner, an executor and an evaluator.

Your role is to analyze the user's task, break it into sub-goals, anticipate failures, and decide what success looks like. Think step by step and explain your reasoning."#;

const NO_PAGE_MARKER: &str = "No page loaded yet - start with a 'navigate' action";

pub fn planning_prompt(task: &str, page_context: Option<&str>, executed: &str, lookahead: usize) -> String {
    format!(
        "{PLANNER_SYSTEM_PROMPT}\n\n\
         ## TASK\n{task}\n\n\
         ## CURRENT PAGE STATE\n{}\n\n\
         ## PREVIOUSLY EXECUTED STEPS\n{executed}\n\n\
         ## YOUR TASK\n\
         Create a plan with up to {lookahead} steps to accomplish the task.\n\
         For each step, specify the exact selector from the page analysis above.\n\
         Think about what will happen after each step and plan accordingly.",
        page_context.unwrap_or(NO_PAGE_MARKER)
    )
}

pub fn correction_prompt(step: &str, error: &str, page_context: Option<&str>) -> String {
    format!(
        "The following browser action failed:\n\n\
         Step: {step}\n\
         Error: {error}\n\n\
         Current page:\n{}\n\n\
         Suggest a single corrected step that might work, using the same fields as a plan step.",
        page_context.unwrap_or(NO_PAGE_MARKER)
    )
}

pub fn evaluation_prompt(
    task: &str,
    step: &str,
    result: &str,
    page_context: Option<&str>,
    remaining_steps: usize,
) -> String {
    format!(
        "{EVALUATOR_SYSTEM_PROMPT}\n\n\
         ## ORIGINAL TASK\n{task}\n\n\
         ## STEP EXECUTED\n{step}\n\n\
         ## EXECUTION RESULT\n{result}\n\n\
         ## CURRENT PAGE STATE\n{}\n\n\
         ## REMAINING PLANNED STEPS\n{remaining_steps}\n\n\
         Evaluate this step and provide your assessment.",
        page_context.unwrap_or("Unavailable")
    )
}

pub fn completion_prompt(task: &str, execution_log: &str, current_url: Option<&str>) -> String {
    let url_line = current_url
        .map(|url| format!("Current page: {url}\n\n"))
        .unwrap_or_default();
    format!(
        "Review this task execution and determine if the task was completed:\n\n\
         Task: {task}\n\n\
         {url_line}Execution log:\n{execution_log}\n\n\
         Was the task completed successfully? What was the final result?"
    )
}

pub fn analysis_prompt(task: &str) -> String {
    format!(
        "Analyze this task and describe your approach:\n\n\
         Task: {task}\n\n\
         Provide:\n\
         1. Main goal\n\
         2. Sub-goals to achieve\n\
         3. Potential challenges\n\
         4. Success criteria"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planning_prompt_marks_missing_page() {
        let prompt = planning_prompt("find docs", None, "None", 4);
        assert!(prompt.starts_with(PLANNER_SYSTEM_PROMPT));
        assert!(prompt.contains("## TASK\nfind docs"));
        assert!(prompt.contains(NO_PAGE_MARKER));
        assert!(prompt.contains("up to 4 steps"));
    }

    #[test]
    fn completion_prompt_mentions_url_only_when_known() {
        assert!(completion_prompt("t", "[]", Some("https://a.test")).contains("Current page: https://a.test"));
        assert!(!completion_prompt("t", "[]", None).contains("Current page"));
    }
}
