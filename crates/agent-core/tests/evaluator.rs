mod common;

use agent_core::{
    EvaluationRequest, ExecutionLogEntry, ResultEvaluator, Step, StepExecutor, StepResult,
};
use common::{click, mock_llm, FakePage, ScriptedActions};

async fn run(step: &Step, extract_text: &str) -> StepResult {
    StepExecutor::new()
        .with_actions(ScriptedActions::new(extract_text))
        .execute(step, None)
        .await
}

fn request<'a>(step: &'a Step, result: &'a StepResult, remaining: usize) -> EvaluationRequest<'a> {
    EvaluationRequest {
        step,
        result,
        page: None,
        task: "read the page",
        remaining_steps: remaining,
        structure: None,
    }
}

#[tokio::test]
async fn failed_step_always_requests_replan() {
    let evaluator = ResultEvaluator::new().with_llm(mock_llm([r#"{"success": true, "task_complete": true}"#]));
    for step in [click(Some("#missing")), click(None), Step::noop()] {
        let result = StepExecutor::new()
            .with_actions(ScriptedActions::new(""))
            .execute(&step, None)
            .await;
        let evaluation = evaluator.evaluate(request(&step, &result, 0)).await;
        assert!(!evaluation.success);
        assert!(evaluation.should_replan);
        assert!(!evaluation.task_complete);
        let reason = evaluation.replan_reason.unwrap();
        assert!(reason.starts_with("step failed: "));
        assert!(reason.contains(result.error.as_deref().unwrap()));
    }
}

#[tokio::test]
async fn long_extraction_with_nothing_left_completes_task() {
    let text = "The quick brown fox jumps over the lazy dog!!";
    assert_eq!(text.len(), 45);
    let step = Step::extract_text("body");
    let result = run(&step, text).await;

    let evaluation = ResultEvaluator::new().evaluate(request(&step, &result, 0)).await;

    assert!(evaluation.success);
    assert!(evaluation.task_complete);
    assert_eq!(evaluation.result.as_deref(), Some(text));
    assert_eq!(evaluation.confidence, Some(0.7));
}

#[tokio::test]
async fn short_or_early_extraction_does_not_complete() {
    let step = Step::extract_text("body");
    let short = run(&step, "tiny").await;
    let long = run(&step, "a long enough passage of text").await;
    let evaluator = ResultEvaluator::new();

    let evaluation = evaluator.evaluate(request(&step, &short, 0)).await;
    assert!(evaluation.task_complete);
    assert_eq!(evaluation.result, None);
    assert_eq!(evaluation.confidence, Some(0.5));

    let evaluation = evaluator.evaluate(request(&step, &long, 2)).await;
    assert!(evaluation.success);
    assert!(!evaluation.task_complete);
}

#[tokio::test]
async fn llm_judgment_is_used_when_valid() {
    let llm = mock_llm([r#"{"success": true, "task_complete": true, "confidence": 0.9, "result": "42"}"#]);
    let evaluator = ResultEvaluator::new().with_llm(llm.clone());
    let step = Step::navigate("https://a.test");
    let result = run(&step, "").await;
    assert!(result.page.is_some());

    let evaluation = evaluator.evaluate(request(&step, &result, 1)).await;

    assert!(evaluation.task_complete);
    assert_eq!(evaluation.result.as_deref(), Some("42"));
    let prompt = llm.call_history()[0].prompt().to_string();
    assert!(prompt.contains("## ORIGINAL TASK\nread the page"));
    assert!(prompt.contains("## REMAINING PLANNED STEPS\n1"));
    assert!(prompt.contains("\"navigated\""));
    assert!(!prompt.contains("\"page\""));
}

#[tokio::test]
async fn llm_page_context_comes_from_the_page() {
    let llm = mock_llm([r#"{"success": true, "task_complete": false}"#]);
    let evaluator = ResultEvaluator::new().with_llm(llm.clone());
    let step = click(Some("#go"));
    let result = run(&step, "").await;
    let page = FakePage::new("https://ctx.test").handle();

    let mut req = request(&step, &result, 0);
    req.page = Some(&page);
    evaluator.evaluate(req).await;

    assert!(llm.call_history()[0].prompt().contains("URL: https://ctx.test"));
}

#[tokio::test]
async fn bad_judgments_degrade_without_halting() {
    let step = click(Some("#go"));
    let result = run(&step, "").await;
    for raw in [
        "{{{",
        r#"{"task_complete": true}"#,
        r#"{"success": true, "task_complete": true, "confidence": 1.5}"#,
    ] {
        let evaluator = ResultEvaluator::new().with_llm(mock_llm([raw]));
        let evaluation = evaluator.evaluate(request(&step, &result, 0)).await;
        assert!(evaluation.success, "case {raw}");
        assert!(!evaluation.task_complete, "case {raw}");
        assert!(evaluation
            .error
            .as_deref()
            .unwrap()
            .starts_with("evaluation failed: "));
    }
}

#[tokio::test]
async fn completion_check_scans_log_for_extraction() {
    let nav = Step::navigate("https://a.test");
    let read = Step::extract_text("body");
    let nav_result = run(&nav, "").await;
    let read_result = run(&read, "Welcome to the docs").await;
    let evaluator = ResultEvaluator::new();

    let without = vec![ExecutionLogEntry::Execution {
        step: nav.clone(),
        result: nav_result.clone(),
    }];
    let check = evaluator.check_task_completion("t", &without, None).await;
    assert!(!check.complete);
    assert!(check.reason.is_some());

    let with = vec![
        ExecutionLogEntry::Execution {
            step: nav,
            result: nav_result,
        },
        ExecutionLogEntry::Replanning {
            reason: "x".into(),
        },
        ExecutionLogEntry::Execution {
            step: read,
            result: read_result,
        },
    ];
    let check = evaluator.check_task_completion("t", &with, None).await;
    assert!(check.complete);
    assert_eq!(check.result.as_deref(), Some("Welcome to the docs"));
}

#[tokio::test]
async fn completion_check_with_llm_degrades_on_failure() {
    let evaluator = ResultEvaluator::new().with_llm(mock_llm(["nope"]));
    let check = evaluator.check_task_completion("t", &[], None).await;
    assert!(!check.complete);
    assert_eq!(check.reason.as_deref(), Some("evaluation failed"));

    let evaluator =
        ResultEvaluator::new().with_llm(mock_llm([r#"{"complete": true, "result": "done"}"#]));
    let check = evaluator.check_task_completion("t", &[], None).await;
    assert!(check.complete);
    assert_eq!(check.result.as_deref(), Some("done"));
}
