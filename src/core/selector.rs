//! Selector strings in the style the section catalogs are written in.
//!
//! A selector is a chain of parts separated by ` >> `. Each part is resolved
//! against the matches of the previous one:
//!
//! * `css` or `css=...`, optionally filtered with `:has-text("...")`
//! * `text=Foo` (substring) or `text="Foo"` (exact)
//! * `//xpath` or `xpath=...`
//! * `nth=N`
//! * `frame=css` enters the document of the first matching iframe
//!
//! Selectors are never resolved on the Rust side; they compile to a small
//! JavaScript resolver that runs in the page on every query.

use crate::errors::{E2eError, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectorPart {
    Css { css: String, has_text: Vec<String> },
    Text { text: String, exact: bool },
    Xpath { xpath: String },
    Nth { index: i64 },
    Frame { css: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    raw: String,
    parts: Vec<SelectorPart>,
}

fn has_text_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#":has-text\((?:"([^"]*)"|'([^']*)')\)"#).expect("static regex is valid")
    })
}

impl Selector {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(E2eError::InvalidSelector("empty selector".to_string()));
        }

        let parts = split_chain(trimmed)?
            .into_iter()
            .map(|part| parse_part(part, raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: trimmed.to_string(),
            parts,
        })
    }

    pub fn parts(&self) -> &[SelectorPart] {
        &self.parts
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Appends `next` to this chain.
    pub fn chain(&self, next: &Selector) -> Selector {
        let mut parts = self.parts.clone();
        parts.extend(next.parts.iter().cloned());
        Selector {
            raw: format!("{} >> {}", self.raw, next.raw),
            parts,
        }
    }

    pub fn nth(&self, index: i64) -> Selector {
        let mut parts = self.parts.clone();
        parts.push(SelectorPart::Nth { index });
        Selector {
            raw: format!("{} >> nth={}", self.raw, index),
            parts,
        }
    }

    /// JavaScript expression evaluating to the array of matched elements.
    pub fn to_js(&self) -> String {
        let parts = serde_json::to_string(&self.parts).unwrap_or_else(|_| "[]".to_string());
        format!("({})({})", RESOLVER_JS, parts)
    }
}

impl FromStr for Selector {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Splits on `>>` outside of quotes and parentheses. A quote only opens a
/// string at the start of a value (after `(`, `[`, `=`, `,` or whitespace), so
/// an apostrophe inside plain text such as `text=Don't` stays literal.
fn split_chain(raw: &str) -> Result<Vec<&str>> {
    let bytes = raw.as_bytes();
    let mut parts = Vec::new();
    let mut quote: Option<u8> = None;
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i];
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                b'"' | b'\'' if opens_value(bytes, i) => quote = Some(c),
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth = depth.saturating_sub(1),
                b'>' if depth == 0 && bytes.get(i + 1) == Some(&b'>') => {
                    parts.push(raw[start..i].trim());
                    i += 2;
                    start = i;
                    continue;
                }
                _ => {}
            },
        }
        i += 1;
    }

    if let Some(q) = quote {
        return Err(E2eError::InvalidSelector(format!(
            "unterminated {} in '{}'",
            q as char, raw
        )));
    }
    parts.push(raw[start..].trim());
    Ok(parts)
}

fn opens_value(bytes: &[u8], at: usize) -> bool {
    match at.checked_sub(1).map(|prev| bytes[prev]) {
        None => true,
        Some(prev) => matches!(prev, b'(' | b'[' | b'=' | b',') || prev.is_ascii_whitespace(),
    }
}

fn unquote(value: &str) -> (String, bool) {
    let value = value.trim();
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return (value[1..value.len() - 1].to_string(), true);
        }
    }
    (value.to_string(), false)
}

fn parse_part(part: &str, raw: &str) -> Result<SelectorPart> {
    if part.is_empty() {
        return Err(E2eError::InvalidSelector(format!(
            "empty part in '{}'",
            raw
        )));
    }

    if let Some(text) = part.strip_prefix("text=") {
        let (text, exact) = unquote(text);
        if text.is_empty() {
            return Err(E2eError::InvalidSelector(format!("empty text= in '{}'", raw)));
        }
        return Ok(SelectorPart::Text { text, exact });
    }

    if let Some(xpath) = part.strip_prefix("xpath=") {
        return Ok(SelectorPart::Xpath {
            xpath: xpath.trim().to_string(),
        });
    }

    if part.starts_with("//") || part.starts_with("(//") || part.starts_with("..") {
        return Ok(SelectorPart::Xpath {
            xpath: part.to_string(),
        });
    }

    if let Some(index) = part.strip_prefix("nth=") {
        let index = index.trim().parse::<i64>().map_err(|_| {
            E2eError::InvalidSelector(format!("bad nth= index '{}' in '{}'", index, raw))
        })?;
        return Ok(SelectorPart::Nth { index });
    }

    if let Some(css) = part.strip_prefix("frame=") {
        let css = css.trim();
        if css.is_empty() {
            return Err(E2eError::InvalidSelector(format!("empty frame= in '{}'", raw)));
        }
        return Ok(SelectorPart::Frame {
            css: css.to_string(),
        });
    }

    let css = part.strip_prefix("css=").unwrap_or(part);
    let has_text = has_text_pattern()
        .captures_iter(css)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .collect::<Vec<_>>();
    let stripped = has_text_pattern().replace_all(css, "").trim().to_string();
    let stripped = if stripped.is_empty() {
        "*".to_string()
    } else {
        stripped
    };

    Ok(SelectorPart::Css {
        css: stripped,
        has_text,
    })
}

/// Resolver run in the page. Takes the serialized parts and returns the
/// matched elements in document order.
const RESOLVER_JS: &str = r#"function(parts) {
    const norm = (s) => (s || '').replace(/\s+/g, ' ').trim().toLowerCase();
    const uniq = (list) => Array.from(new Set(list));
    let roots = [document];
    for (const part of parts) {
        let next = [];
        if (part.kind === 'css') {
            for (const root of roots) {
                for (const el of root.querySelectorAll(part.css)) {
                    const text = norm(el.textContent);
                    if (part.has_text.every((t) => text.includes(norm(t)))) next.push(el);
                }
            }
        } else if (part.kind === 'text') {
            const wanted = norm(part.text);
            const hit = (el) => part.exact ? norm(el.textContent) === wanted : norm(el.textContent).includes(wanted);
            for (const root of roots) {
                const scope = root.body || root;
                for (const el of scope.querySelectorAll('*')) {
                    if (['SCRIPT', 'STYLE', 'NOSCRIPT'].includes(el.tagName)) continue;
                    if (!hit(el)) continue;
                    if (Array.from(el.children).some(hit)) continue;
                    next.push(el);
                }
            }
        } else if (part.kind === 'xpath') {
            for (const root of roots) {
                const doc = root.ownerDocument || root;
                const found = doc.evaluate(part.xpath, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                for (let i = 0; i < found.snapshotLength; i++) next.push(found.snapshotItem(i));
            }
        } else if (part.kind === 'nth') {
            const i = part.index < 0 ? roots.length + part.index : part.index;
            next = (i >= 0 && i < roots.length && roots[i] !== document) ? [roots[i]] : [];
        } else if (part.kind === 'frame') {
            for (const root of roots) {
                const frame = root.querySelector(part.css);
                if (frame && frame.contentDocument) { next.push(frame.contentDocument); break; }
            }
        }
        roots = uniq(next);
    }
    return roots.filter((el) => el !== document && el.nodeType === 1);
}"#;
