//! Stable selector generation for extracted elements

/// Identifying features of an element, as far as selector choice is concerned
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectorInput<'a> {
    pub tag: &'a str,
    pub id: &'a str,
    pub name: &'a str,
    pub classes: &'a [String],
    /// 1-based position among the parent's children
    pub index: usize,
}

/// Pick a selector: `#id` (or `[id="…"]` when the id is not a plain CSS
/// identifier), then `tag[name="…"]`, then `tag.c1.c2`, then
/// `tag:nth-child(n)`.
pub fn generate_selector(input: SelectorInput<'_>) -> String {
    let tag = input.tag.to_ascii_lowercase();

    let id = input.id.trim();
    if !id.is_empty() && !id.contains(char::is_whitespace) {
        if is_css_identifier(id) {
            return format!("#{id}");
        }
        return format!("[id=\"{}\"]", quote_attribute(id));
    }

    let name = input.name.trim();
    if !name.is_empty() {
        return format!("{tag}[name=\"{}\"]", quote_attribute(name));
    }

    let classes: Vec<&str> = input
        .classes
        .iter()
        .map(|c| c.trim())
        .filter(|c| is_css_identifier(c))
        .take(2)
        .collect();
    if !classes.is_empty() {
        return format!("{tag}.{}", classes.join("."));
    }

    format!("{tag}:nth-child({})", input.index.max(1))
}

/// True when `value` can follow `#` or `.` without escaping: no leading
/// digit (also after a single `-`), and only `-`, `_`, alphanumerics or
/// non-ASCII characters.
fn is_css_identifier(value: &str) -> bool {
    let body = value.strip_prefix('-').unwrap_or(value);
    let Some(first) = body.chars().next() else {
        return false;
    };
    if first.is_ascii_digit() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii())
}

fn quote_attribute(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Element kind: input type for inputs (default `text`), `link` for anchors,
/// otherwise the tag itself.
pub fn element_kind(tag: &str, input_type: &str) -> String {
    let tag = tag.to_ascii_lowercase();
    match tag.as_str() {
        "input" if input_type.trim().is_empty() => "text".to_string(),
        "input" => input_type.trim().to_ascii_lowercase(),
        "a" => "link".to_string(),
        _ => tag,
    }
}

/// Trim and cut to at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}
