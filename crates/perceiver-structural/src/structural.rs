use std::collections::{BTreeMap, HashSet};

use pilot_core_types::BrowserPage;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::PerceiverError;
use crate::model::{
    ElementContext, FormDescriptor, Heading, InteractiveElement, NavigationLink, PageStructure,
    RawCandidate, RawElementState,
};
use crate::scripts;
use crate::selector::{element_kind, generate_selector, truncate_chars, SelectorInput};

const NAV_LINK_TEXT_CHARS: usize = 50;

/// Caps applied to every snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub max_elements: usize,
    pub max_navigation_links: usize,
    pub max_headings: usize,
    pub max_content_chars: usize,
    pub max_text_chars: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_elements: 50,
            max_navigation_links: 20,
            max_headings: 15,
            max_content_chars: 2000,
            max_text_chars: 100,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_max_elements(mut self, max: usize) -> Self {
        self.max_elements = max;
        self
    }

    pub fn with_max_content_chars(mut self, max: usize) -> Self {
        self.max_content_chars = max;
        self
    }
}

/// Read-only page analyzer.
///
/// Extraction failures never escape: a sub-field that cannot be read is
/// left empty and the rest of the snapshot is still returned.
#[derive(Debug, Clone, Default)]
pub struct StructuralAnalyzer {
    config: AnalyzerConfig,
}

impl StructuralAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub async fn analyze(&self, page: &dyn BrowserPage) -> PageStructure {
        let (url, title, candidates, forms, links, headings, content) = futures::join!(
            page.url(),
            page.title(),
            evaluate::<Vec<RawCandidate>>(page, scripts::INTERACTIVE_CANDIDATES, None),
            evaluate::<Vec<FormDescriptor>>(page, scripts::FORMS, None),
            evaluate::<Vec<NavigationLink>>(page, scripts::NAVIGATION_LINKS, None),
            evaluate::<Vec<Heading>>(page, scripts::HEADINGS, None),
            evaluate::<String>(page, scripts::MAIN_CONTENT, None),
        );

        let structure = PageStructure {
            url: or_empty(url.map_err(PerceiverError::from), "url"),
            title: or_empty(title.map_err(PerceiverError::from), "title"),
            main_content_text: truncate_chars(
                &or_empty(content, "main content"),
                self.config.max_content_chars,
            ),
            interactive_elements: self.build_elements(or_empty(candidates, "interactive elements")),
            forms: or_empty(forms, "forms"),
            navigation_links: self.cap_links(or_empty(links, "navigation links")),
            headings: self.cap_headings(or_empty(headings, "headings")),
        };

        debug!(
            page = %page.id(),
            elements = structure.interactive_elements.len(),
            forms = structure.forms.len(),
            headings = structure.headings.len(),
            "Analyzed page structure"
        );
        structure
    }

    /// Live state of `selector`; `exists == false` when it cannot be read
    pub async fn element_context(&self, page: &dyn BrowserPage, selector: &str) -> ElementContext {
        let state = evaluate::<Option<RawElementState>>(
            page,
            scripts::ELEMENT_STATE,
            Some(json!(selector)),
        )
        .await;

        match state {
            Ok(Some(state)) => ElementContext {
                exists: true,
                visible: state.visible,
                enabled: state.enabled,
                text: truncate_chars(&state.text, self.config.max_text_chars),
                value: state.value,
                kind: element_kind(&state.tag_name, &state.input_type),
                tag: state.tag_name,
                bounding_box: state.bounding_box,
            },
            Ok(None) => ElementContext::missing(),
            Err(err) => {
                debug!(selector, error = %err, "Element context unavailable");
                ElementContext::missing()
            }
        }
    }

    fn build_elements(&self, candidates: Vec<RawCandidate>) -> Vec<InteractiveElement> {
        let mut seen = HashSet::new();
        let mut elements = Vec::new();

        for candidate in candidates {
            if elements.len() >= self.config.max_elements {
                break;
            }
            if !candidate.bounding_box.is_rendered() {
                continue;
            }
            let selector = generate_selector(SelectorInput {
                tag: &candidate.tag,
                id: &candidate.id,
                name: &candidate.name,
                classes: &candidate.classes,
                index: candidate.index,
            });
            if !seen.insert(selector.clone()) {
                continue;
            }

            let mut attributes = BTreeMap::new();
            for (key, value) in [
                ("type", &candidate.input_type),
                ("name", &candidate.name),
                ("href", &candidate.href),
                ("placeholder", &candidate.placeholder),
            ] {
                if !value.is_empty() {
                    attributes.insert(key.to_string(), value.clone());
                }
            }

            elements.push(InteractiveElement {
                kind: element_kind(&candidate.tag, &candidate.input_type),
                text: truncate_chars(&candidate.text, self.config.max_text_chars),
                tag: candidate.tag.to_ascii_lowercase(),
                selector,
                attributes,
                is_visible: candidate.bounding_box.is_rendered(),
                bounding_box: Some(candidate.bounding_box),
            });
        }
        elements
    }

    fn cap_links(&self, links: Vec<NavigationLink>) -> Vec<NavigationLink> {
        links
            .into_iter()
            .take(self.config.max_navigation_links)
            .map(|link| NavigationLink {
                text: truncate_chars(&link.text, NAV_LINK_TEXT_CHARS),
                href: link.href,
            })
            .collect()
    }

    fn cap_headings(&self, headings: Vec<Heading>) -> Vec<Heading> {
        headings
            .into_iter()
            .take(self.config.max_headings)
            .map(|heading| Heading {
                text: truncate_chars(&heading.text, self.config.max_text_chars),
                level: heading.level,
            })
            .collect()
    }
}

async fn evaluate<T: DeserializeOwned>(
    page: &dyn BrowserPage,
    script: &str,
    arg: Option<Value>,
) -> Result<T, PerceiverError> {
    let value = page.evaluate(script, arg).await?;
    Ok(serde_json::from_value(value)?)
}

fn or_empty<T: Default>(result: Result<T, PerceiverError>, what: &str) -> T {
    result.unwrap_or_else(|err| {
        warn!(field = what, error = %err, "Structure extraction degraded");
        T::default()
    })
}
