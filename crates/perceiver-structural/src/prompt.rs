use crate::model::PageStructure;
use crate::selector::truncate_chars;

const PROMPT_HEADINGS: usize = 10;
const PROMPT_FORMS: usize = 5;
const PROMPT_ELEMENT_TEXT: usize = 50;
const PROMPT_CONTENT_PREVIEW: usize = 500;

impl PageStructure {
    /// Elements rendered by [`PageStructure::prompt_context`]
    pub const DEFAULT_PROMPT_ELEMENTS: usize = 20;

    pub fn prompt_context(&self) -> String {
        self.to_prompt_context(Self::DEFAULT_PROMPT_ELEMENTS)
    }

    /// Markdown summary of the snapshot for generative prompts
    pub fn to_prompt_context(&self, max_elements: usize) -> String {
        let mut lines = vec![
            "## Current Page Analysis".to_string(),
            format!("URL: {}", self.url),
            format!("Title: {}", self.title),
            String::new(),
            "### Page Headings:".to_string(),
        ];

        for heading in self.headings.iter().take(PROMPT_HEADINGS) {
            lines.push(format!("  - [{}] {}", heading.level, heading.text));
        }

        lines.push(String::new());
        lines.push("### Interactive Elements (buttons, links, inputs):".to_string());
        for (i, element) in self.interactive_elements.iter().take(max_elements).enumerate() {
            lines.push(format!(
                "  {}. [{}] selector='{}' text='{}'",
                i + 1,
                element.kind,
                element.selector,
                truncate_chars(&element.text, PROMPT_ELEMENT_TEXT)
            ));
        }
        if self.interactive_elements.len() > max_elements {
            lines.push(format!(
                "  ... and {} more elements",
                self.interactive_elements.len() - max_elements
            ));
        }

        if !self.forms.is_empty() {
            lines.push(String::new());
            lines.push("### Forms on Page:".to_string());
            for form in self.forms.iter().take(PROMPT_FORMS) {
                let action = if form.action.is_empty() {
                    "no action"
                } else {
                    form.action.as_str()
                };
                lines.push(format!(
                    "  - Form: {} with {} fields",
                    action,
                    form.fields.len()
                ));
            }
        }

        lines.push(String::new());
        lines.push("### Main Content Preview:".to_string());
        if self.main_content_text.chars().count() > PROMPT_CONTENT_PREVIEW {
            let preview: String = self
                .main_content_text
                .chars()
                .take(PROMPT_CONTENT_PREVIEW)
                .collect();
            lines.push(format!("{preview}..."));
        } else {
            lines.push(self.main_content_text.clone());
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{FormDescriptor, Heading, InteractiveElement, PageStructure};

    fn element(i: usize) -> InteractiveElement {
        InteractiveElement {
            tag: "button".into(),
            selector: format!("#b{i}"),
            text: format!("Button {i}"),
            kind: "button".into(),
            attributes: Default::default(),
            is_visible: true,
            bounding_box: None,
        }
    }

    #[test]
    fn renders_sections_and_overflow() {
        let structure = PageStructure {
            url: "https://example.com".into(),
            title: "Example".into(),
            main_content_text: "x".repeat(600),
            interactive_elements: (0..3).map(element).collect(),
            forms: vec![FormDescriptor::default()],
            headings: vec![Heading {
                level: "H1".into(),
                text: "Welcome".into(),
            }],
            ..PageStructure::default()
        };

        let rendered = structure.to_prompt_context(2);
        assert!(rendered.starts_with("## Current Page Analysis\nURL: https://example.com"));
        assert!(rendered.contains("  - [H1] Welcome"));
        assert!(rendered.contains("  1. [button] selector='#b0' text='Button 0'"));
        assert!(!rendered.contains("#b2"));
        assert!(rendered.contains("  ... and 1 more elements"));
        assert!(rendered.contains("  - Form: no action with 0 fields"));
        assert!(rendered.ends_with(&format!("{}...", "x".repeat(500))));
    }

    #[test]
    fn empty_structure_still_renders() {
        let rendered = PageStructure::default().prompt_context();
        assert!(rendered.contains("### Main Content Preview:"));
        assert!(!rendered.contains("### Forms on Page:"));
    }
}
