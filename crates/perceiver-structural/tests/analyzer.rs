use std::collections::HashMap;

use async_trait::async_trait;
use perceiver_structural::{scripts, AnalyzerConfig, StructuralAnalyzer};
use pilot_core_types::{BrowserPage, PageError, PageId};
use serde_json::{json, Value};

/// Page whose script results are fixed up front, keyed by script text
#[derive(Debug, Default)]
struct ScriptedPage {
    id: PageId,
    responses: HashMap<&'static str, Value>,
    elements: HashMap<String, Value>,
}

impl ScriptedPage {
    fn respond(mut self, script: &'static str, value: Value) -> Self {
        self.responses.insert(script, value);
        self
    }

    fn element(mut self, selector: &str, state: Value) -> Self {
        self.elements.insert(selector.to_string(), state);
        self
    }
}

#[async_trait]
impl BrowserPage for ScriptedPage {
    fn id(&self) -> &PageId {
        &self.id
    }

    async fn url(&self) -> Result<String, PageError> {
        Ok("https://shop.test/".to_string())
    }

    async fn title(&self) -> Result<String, PageError> {
        Ok("Shop".to_string())
    }

    async fn evaluate(&self, script: &str, arg: Option<Value>) -> Result<Value, PageError> {
        if script == scripts::ELEMENT_STATE {
            let selector = arg.as_ref().and_then(Value::as_str).unwrap_or_default();
            return Ok(self.elements.get(selector).cloned().unwrap_or(Value::Null));
        }
        self.responses
            .get(script)
            .cloned()
            .ok_or_else(|| PageError::Evaluation("script not scripted".to_string()))
    }
}

fn candidate(tag: &str, id: &str, width: f64) -> Value {
    json!({
        "tag": tag,
        "id": id,
        "name": "",
        "classes": [],
        "index": 1,
        "inputType": "",
        "text": format!("{tag} {id}"),
        "href": "",
        "placeholder": "",
        "boundingBox": { "x": 0.0, "y": 0.0, "width": width, "height": 10.0 }
    })
}

#[tokio::test]
async fn analyze_builds_capped_snapshot() {
    let mut candidates = vec![
        candidate("button", "buy", 40.0),
        candidate("button", "hidden", 0.0),
        candidate("button", "buy", 40.0),
        json!({
            "tag": "input", "id": "", "name": "q", "classes": ["search"], "index": 2,
            "inputType": "", "text": "", "href": "", "placeholder": "Search",
            "boundingBox": { "x": 1.0, "y": 2.0, "width": 100.0, "height": 20.0 }
        }),
        json!({
            "tag": "a", "id": "", "name": "", "classes": ["nav", "item", "active"],
            "index": 4, "inputType": "", "text": "y".repeat(300), "href": "https://shop.test/a",
            "placeholder": "",
            "boundingBox": { "x": 0.0, "y": 0.0, "width": 10.0, "height": 10.0 }
        }),
    ];
    for i in 0..60 {
        candidates.push(candidate("button", &format!("extra{i}"), 5.0));
    }

    let links: Vec<Value> = (0..30)
        .map(|i| json!({ "text": format!("{}{}", "L".repeat(60), i), "href": format!("/l{i}") }))
        .collect();
    let headings: Vec<Value> = (0..20)
        .map(|i| json!({ "level": "H2", "text": format!("Heading {i}") }))
        .collect();

    let page = ScriptedPage::default()
        .respond(scripts::INTERACTIVE_CANDIDATES, Value::Array(candidates))
        .respond(
            scripts::FORMS,
            json!([{ "action": "/search", "method": "get",
                     "fields": [{ "name": "q", "type": "text", "required": true, "placeholder": "" }] }]),
        )
        .respond(scripts::NAVIGATION_LINKS, Value::Array(links))
        .respond(scripts::HEADINGS, Value::Array(headings))
        .respond(scripts::MAIN_CONTENT, json!("z".repeat(2500)));

    let structure = StructuralAnalyzer::new().analyze(&page).await;

    assert_eq!(structure.url, "https://shop.test/");
    assert_eq!(structure.title, "Shop");
    assert_eq!(structure.interactive_elements.len(), 50);
    assert_eq!(structure.interactive_elements[0].selector, "#buy");
    assert_eq!(structure.interactive_elements[1].selector, "input[name=\"q\"]");
    assert_eq!(structure.interactive_elements[1].kind, "text");
    assert_eq!(structure.interactive_elements[2].selector, "a.nav.item");
    assert_eq!(structure.interactive_elements[2].kind, "link");
    assert_eq!(structure.interactive_elements[2].text.chars().count(), 100);
    assert!(structure
        .interactive_elements
        .iter()
        .all(|e| e.selector != "#hidden"));
    assert_eq!(structure.navigation_links.len(), 20);
    assert_eq!(structure.navigation_links[0].text.chars().count(), 50);
    assert_eq!(structure.headings.len(), 15);
    assert_eq!(structure.main_content_text.len(), 2000);
    assert_eq!(structure.forms[0].fields[0].field_type, "text");
}

#[tokio::test]
async fn analyze_degrades_to_empty_fields() {
    let page = ScriptedPage::default().respond(scripts::MAIN_CONTENT, json!("Hello"));

    let structure = StructuralAnalyzer::new().analyze(&page).await;

    assert_eq!(structure.main_content_text, "Hello");
    assert!(structure.interactive_elements.is_empty());
    assert!(structure.forms.is_empty());
    assert!(structure.headings.is_empty());
}

#[tokio::test]
async fn config_caps_are_honoured() {
    let candidates: Vec<Value> = (0..10)
        .map(|i| candidate("button", &format!("b{i}"), 5.0))
        .collect();
    let page = ScriptedPage::default()
        .respond(scripts::INTERACTIVE_CANDIDATES, Value::Array(candidates))
        .respond(scripts::MAIN_CONTENT, json!("abcdef"));
    let analyzer = StructuralAnalyzer::with_config(
        AnalyzerConfig::default()
            .with_max_elements(3)
            .with_max_content_chars(4),
    );

    let structure = analyzer.analyze(&page).await;
    assert_eq!(structure.interactive_elements.len(), 3);
    assert_eq!(structure.main_content_text, "abcd");
}

#[tokio::test]
async fn element_context_reports_live_state() {
    let page = ScriptedPage::default().element(
        "#email",
        json!({
            "visible": true, "enabled": false, "text": "", "value": "a@b.c",
            "tagName": "input", "type": "email",
            "boundingBox": { "x": 0.0, "y": 0.0, "width": 120.0, "height": 30.0 }
        }),
    );
    let analyzer = StructuralAnalyzer::new();

    let ctx = analyzer.element_context(&page, "#email").await;
    assert!(ctx.exists);
    assert!(ctx.visible);
    assert!(!ctx.enabled);
    assert_eq!(ctx.kind, "email");
    assert_eq!(ctx.value, "a@b.c");

    let missing = analyzer.element_context(&page, "#nope").await;
    assert!(!missing.exists);
}

#[tokio::test]
async fn element_context_accepts_numeric_values() {
    let page = ScriptedPage::default().element(
        "progress",
        json!({
            "visible": true, "enabled": true, "text": "", "value": 42,
            "tagName": "progress", "type": null,
            "boundingBox": { "x": 0.0, "y": 0.0, "width": 80.0, "height": 8.0 }
        }),
    );

    let ctx = StructuralAnalyzer::new().element_context(&page, "progress").await;
    assert!(ctx.exists);
    assert_eq!(ctx.value, "42");
    assert_eq!(ctx.kind, "progress");
}

#[tokio::test]
async fn analyze_tolerates_non_string_properties() {
    let page = ScriptedPage::default().respond(
        scripts::INTERACTIVE_CANDIDATES,
        json!([{
            "tag": "a", "id": "", "name": "", "classes": ["icon"], "index": 1,
            "inputType": "", "text": 7, "href": { "baseVal": "#x" }, "placeholder": null,
            "boundingBox": { "x": 0.0, "y": 0.0, "width": 16.0, "height": 16.0 }
        }]),
    );

    let structure = StructuralAnalyzer::new().analyze(&page).await;
    assert_eq!(structure.interactive_elements.len(), 1);
    assert_eq!(structure.interactive_elements[0].text, "7");
    assert!(!structure.interactive_elements[0].attributes.contains_key("href"));
    assert!(!structure.interactive_elements[0].attributes.contains_key("placeholder"));
}

#[tokio::test]
async fn element_context_absorbs_evaluation_errors() {
    #[derive(Debug, Default)]
    struct BrokenPage {
        id: PageId,
    }

    #[async_trait]
    impl BrowserPage for BrokenPage {
        fn id(&self) -> &PageId {
            &self.id
        }
        async fn url(&self) -> Result<String, PageError> {
            Err(PageError::Closed("gone".into()))
        }
        async fn title(&self) -> Result<String, PageError> {
            Err(PageError::Closed("gone".into()))
        }
        async fn evaluate(&self, _: &str, _: Option<Value>) -> Result<Value, PageError> {
            Err(PageError::Closed("gone".into()))
        }
    }

    let analyzer = StructuralAnalyzer::new();
    let page = BrokenPage::default();
    assert!(!analyzer.element_context(&page, "#x").await.exists);
    let structure = analyzer.analyze(&page).await;
    assert!(structure.url.is_empty());
    assert!(structure.main_content_text.is_empty());
}
