/// Pull the first JSON object out of a model answer that may wrap it in a
/// code fence or surrounding prose.
pub fn extract_json_object(raw: &str) -> Option<String> {
    if raw.trim_start().starts_with('{') {
        return Some(trim_fence(raw));
    }

    let fence = "```";
    if let Some(start) = raw.find(fence) {
        let after_fence = &raw[start + fence.len()..];
        let body = after_fence.trim_start_matches(|c: char| c.is_alphanumeric() || c == '_');
        if let Some(end) = body.find(fence) {
            let block = &body[..end];
            if block.contains('{') {
                return Some(trim_fence(block));
            }
        }
    }

    let start = raw.find('{')?;
    let mut depth = 0i32;
    for (idx, ch) in raw[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(raw[start..=start + idx].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

fn trim_fence(value: &str) -> String {
    value.trim().trim_matches('`').trim().to_string()
}
