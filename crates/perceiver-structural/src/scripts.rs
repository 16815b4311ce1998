//! In-page extraction scripts.
//!
//! Each constant is a JavaScript function expression evaluated through
//! [`pilot_core_types::BrowserPage::evaluate`]. Scripts only read the DOM;
//! capping, selector choice and filtering happen on the Rust side.

/// Raw candidates for interactive elements, in query order
pub const INTERACTIVE_CANDIDATES: &str = r#"() => {
  const queries = ['button', 'a[href]', 'input:not([type="hidden"])', 'select',
    'textarea', '[role="button"]', '[onclick]'];
  const out = [];
  const visited = new Set();
  for (const query of queries) {
    for (const node of document.querySelectorAll(query)) {
      if (visited.has(node)) continue;
      visited.add(node);
      const rect = node.getBoundingClientRect();
      const parent = node.parentElement;
      const cls = typeof node.className === 'string' ? node.className.trim() : '';
      out.push({
        tag: node.tagName.toLowerCase(),
        id: node.id || '',
        name: node.getAttribute('name') || '',
        classes: cls ? cls.split(/\s+/) : [],
        index: parent ? Array.from(parent.children).indexOf(node) + 1 : 1,
        inputType: node.tagName === 'INPUT' ? (node.getAttribute('type') || '') : '',
        text: String(node.innerText || node.value || node.placeholder || '').trim().substring(0, 200),
        href: typeof node.href === 'string' ? node.href : '',
        placeholder: String(node.placeholder ?? ''),
        boundingBox: { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
      });
      if (out.length >= 500) return out;
    }
  }
  return out;
}"#;

pub const FORMS: &str = r#"() => Array.from(document.querySelectorAll('form')).map((form) => ({
  action: form.action || '',
  method: form.method || 'get',
  fields: Array.from(form.querySelectorAll('input, select, textarea'))
    .filter((f) => f.type !== 'hidden')
    .map((f) => ({
      name: f.name || '',
      type: f.type || f.tagName.toLowerCase(),
      required: !!f.required,
      placeholder: f.placeholder || '',
    })),
}))"#;

pub const NAVIGATION_LINKS: &str = r#"() => Array.from(
  document.querySelectorAll('nav a, header a, [role="navigation"] a'))
  .filter((a) => a.href && a.innerText.trim())
  .map((a) => ({ text: a.innerText.trim(), href: a.href }))"#;

pub const HEADINGS: &str = r#"() => Array.from(document.querySelectorAll('h1, h2, h3'))
  .map((h) => ({ level: h.tagName, text: h.innerText.trim() }))
  .filter((h) => h.text)"#;

pub const MAIN_CONTENT: &str = r#"() => {
  const main = document.querySelector('main, [role="main"], article, .content, #content');
  const root = main || document.body;
  return root ? root.innerText.trim() : '';
}"#;

/// Takes the selector as its argument; `null` when nothing matches
pub const ELEMENT_STATE: &str = r#"(selector) => {
  const el = document.querySelector(selector);
  if (!el) return null;
  const rect = el.getBoundingClientRect();
  return {
    visible: rect.width > 0 && rect.height > 0,
    enabled: !el.disabled,
    text: String(el.innerText ?? el.textContent ?? '').trim(),
    value: String(el.value ?? ''),
    tagName: el.tagName.toLowerCase(),
    type: String(el.type ?? ''),
    boundingBox: { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
  };
}"#;
