use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Zero-area boxes belong to elements that are not rendered
    pub fn is_rendered(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// A visible element the agent can act on
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractiveElement {
    pub tag: String,
    pub selector: String,
    pub text: String,
    /// `link`, `button`, `select`, or the input type for `<input>`
    pub kind: String,
    #[serde(default)]
    pub attributes: std::collections::BTreeMap<String, String>,
    /// Always true for analyzer output; zero-area elements are skipped
    pub is_visible: bool,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    pub placeholder: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDescriptor {
    pub action: String,
    pub method: String,
    pub fields: Vec<FormField>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationLink {
    pub text: String,
    pub href: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heading {
    /// Tag name, e.g. `H1`
    pub level: String,
    pub text: String,
}

/// Snapshot of a page used to ground planning
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageStructure {
    pub url: String,
    pub title: String,
    pub main_content_text: String,
    pub interactive_elements: Vec<InteractiveElement>,
    pub forms: Vec<FormDescriptor>,
    pub navigation_links: Vec<NavigationLink>,
    pub headings: Vec<Heading>,
}

/// Live state of the element behind one selector
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementContext {
    pub exists: bool,
    pub visible: bool,
    pub enabled: bool,
    pub text: String,
    pub value: String,
    pub tag: String,
    pub kind: String,
    pub bounding_box: Option<BoundingBox>,
}

impl ElementContext {
    pub fn missing() -> Self {
        Self::default()
    }
}

/// Element description as reported by the page script, before selector
/// generation and capping.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawCandidate {
    pub tag: String,
    pub id: String,
    pub name: String,
    pub classes: Vec<String>,
    pub index: usize,
    pub input_type: String,
    #[serde(deserialize_with = "scalar_string")]
    pub text: String,
    #[serde(deserialize_with = "scalar_string")]
    pub href: String,
    #[serde(deserialize_with = "scalar_string")]
    pub placeholder: String,
    pub bounding_box: BoundingBox,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawElementState {
    pub visible: bool,
    pub enabled: bool,
    #[serde(deserialize_with = "scalar_string")]
    pub text: String,
    #[serde(deserialize_with = "scalar_string")]
    pub value: String,
    pub tag_name: String,
    #[serde(rename = "type", deserialize_with = "scalar_string")]
    pub input_type: String,
    pub bounding_box: Option<BoundingBox>,
}

/// DOM properties such as `value` are numbers on `<progress>` or `<li>`;
/// read any scalar as text and anything else as empty.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}
