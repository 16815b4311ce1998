mod common;

use action_primitives::ActionKind;
use agent_core::{
    MockCall, PlanGenerator, PlanResponse, PlanSource, PlannerConfig, RuleBasedPlanner,
};
use common::mock_llm;
use perceiver_structural::PageStructure;
use serde_json::{json, Value};

const TWO_STEP_PLAN: &str = r##"{
  "steps": [
    {"step_number": 1, "action": "fill", "selector": "#q", "value": "rust traits", "reason": "type query", "fallback": "input[name=\"q\"]"},
    {"step_number": 2, "action": "click", "selector": "#go", "reason": "submit", "expected_outcome": "results page"}
  ],
  "success_criteria": "results are listed"
}"##;

#[tokio::test]
async fn fallback_plan_for_url_and_read() {
    let plan = PlanGenerator::default()
        .plan("Open https://example.com and read", None, &[])
        .await;

    assert_eq!(plan.source(), PlanSource::Fallback);
    let pairs: Vec<(Option<ActionKind>, Value)> = plan
        .steps()
        .iter()
        .map(|s| (s.action, Value::Object(s.args.clone())))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (Some(ActionKind::Navigate), json!({ "url": "https://example.com" })),
            (Some(ActionKind::ExtractText), json!({ "selector": "body" })),
        ]
    );
}

#[test]
fn fallback_first_step_navigates_to_literal_url() {
    let planner = RuleBasedPlanner::new();
    for task in [
        "go to https://docs.rs/regex/latest and summarise",
        "http://localhost:8080/health please",
        "check https://example.org/a?b=c#frag",
    ] {
        let literal = task
            .split_whitespace()
            .find(|w| w.starts_with("http"))
            .unwrap();
        let plan = planner.plan(task);
        assert_eq!(plan.steps()[0].action, Some(ActionKind::Navigate));
        assert_eq!(plan.steps()[0].arg_str("url"), Some(literal));
    }
}

#[tokio::test]
async fn generated_plan_maps_items_to_steps() {
    let llm = mock_llm([TWO_STEP_PLAN]);
    let planner = PlanGenerator::new(PlannerConfig::default()).with_llm(llm.clone());

    let plan = planner.plan("search for rust traits", None, &[]).await;

    assert_eq!(plan.source(), PlanSource::Generated);
    assert_eq!(plan.success_criteria(), "results are listed");
    assert_eq!(plan.len(), 2);
    let fill = &plan.steps()[0];
    assert_eq!(fill.action, Some(ActionKind::Fill));
    assert_eq!(fill.arg_str("selector"), Some("#q"));
    assert_eq!(fill.arg_str("text"), Some("rust traits"));
    assert_eq!(fill.metadata.fallback.as_deref(), Some("input[name=\"q\"]"));
    assert_eq!(
        plan.steps()[1].metadata.expected_outcome.as_deref(),
        Some("results page")
    );

    let history = llm.call_history();
    assert_eq!(history.len(), 1);
    match &history[0] {
        MockCall::CompleteJson { prompt, schema } => {
            assert!(prompt.contains("## TASK\nsearch for rust traits"));
            assert!(prompt.contains("No page loaded yet"));
            assert!(prompt.contains("## PREVIOUSLY EXECUTED STEPS\nNone"));
            assert_eq!(schema["required"], json!(["steps", "success_criteria"]));
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn prompt_includes_page_context() {
    let llm = mock_llm([TWO_STEP_PLAN]);
    let planner = PlanGenerator::default().with_llm(llm.clone());
    let structure = PageStructure {
        url: "https://search.test/".into(),
        title: "Search".into(),
        ..PageStructure::default()
    };

    planner.plan("search", Some(&structure), &[]).await;

    let prompt = llm.call_history()[0].prompt().to_string();
    assert!(prompt.contains("URL: https://search.test/"));
    assert!(!prompt.contains("No page loaded yet"));
}

#[tokio::test]
async fn plan_is_truncated_to_lookahead() {
    let steps: Vec<Value> = (1..=6)
        .map(|n| json!({ "step_number": n, "action": "scroll", "selector": format!("#s{n}"), "reason": "r" }))
        .collect();
    let response = json!({ "steps": steps, "success_criteria": "c" }).to_string();
    let planner = PlanGenerator::new(PlannerConfig { lookahead_steps: 3 }).with_llm(mock_llm([response]));

    let plan = planner.plan("scroll around", None, &[]).await;
    assert_eq!(plan.len(), 3);
    assert_eq!(plan.steps()[2].arg_str("selector"), Some("#s3"));
}

#[tokio::test]
async fn unusable_responses_fall_back_to_rules() {
    let cases = [
        "not json at all",
        r#"{"steps": [{"action": "hover", "reason": "r"}], "success_criteria": "c"}"#,
        r#"{"steps": [], "success_criteria": "c"}"#,
        r##"{"steps": [{"action": "click", "selector": "#a", "reason": "r"}]}"##,
        r#"{"action": "noop", "reason": "mock response"}"#,
    ];
    for raw in cases {
        let planner = PlanGenerator::default().with_llm(mock_llm([raw]));
        let plan = planner.plan("Open https://example.com and read", None, &[]).await;
        assert_eq!(plan.source(), PlanSource::Fallback, "case {raw}");
        assert_eq!(plan.len(), 2, "case {raw}");
    }
}

#[test]
fn argument_mapping_is_deterministic() {
    let parsed: PlanResponse = serde_json::from_str(TWO_STEP_PLAN).unwrap();
    let first: Vec<_> = parsed.steps.iter().map(|item| item.to_step()).collect();

    let reserialized = serde_json::to_value(&parsed).unwrap();
    let reparsed: PlanResponse = serde_json::from_value(reserialized).unwrap();
    let second: Vec<_> = reparsed.steps.iter().map(|item| item.to_step()).collect();

    let pairs = |steps: &[agent_core::Step]| {
        steps
            .iter()
            .map(|s| (s.action, s.args.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(pairs(&first), pairs(&second));
    assert_eq!(first, second);
}
