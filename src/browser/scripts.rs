//! Page-side snippets used by the Chrome driver. Every snippet evaluates to a
//! JSON string so results come back by value regardless of their shape.

use crate::core::Selector;

fn with_first(selector: &Selector, body: &str) -> String {
    format!(
        r#"(function() {{
            const els = {};
            const el = els[0];
            {}
        }})()"#,
        selector.to_js(),
        body
    )
}

fn quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

pub fn json_wrapped(script: &str) -> String {
    format!(
        r#"(function() {{
            const value = ({});
            return JSON.stringify(value === undefined ? null : value);
        }})()"#,
        script
    )
}

pub fn probe(selector: &Selector) -> String {
    with_first(
        selector,
        r#"if (!el) return JSON.stringify({ count: 0, attached: false, visible: false, enabled: false });
            const style = el.ownerDocument.defaultView.getComputedStyle(el);
            const rect = el.getBoundingClientRect();
            const visible = style.visibility !== 'hidden' && style.display !== 'none'
                && rect.width > 0 && rect.height > 0;
            const enabled = !el.disabled && el.getAttribute('aria-disabled') !== 'true';
            return JSON.stringify({ count: els.length, attached: el.isConnected, visible, enabled });"#,
    )
}

/// Scrolls the element into view and returns its box in top-level viewport
/// coordinates, adding the offsets of any enclosing iframes.
pub fn bounding_box(selector: &Selector) -> String {
    with_first(
        selector,
        r#"if (!el) return JSON.stringify(null);
            el.scrollIntoView({ block: 'center', inline: 'center' });
            const rect = el.getBoundingClientRect();
            let x = rect.x, y = rect.y;
            let win = el.ownerDocument.defaultView;
            while (win && win.frameElement) {
                const frameRect = win.frameElement.getBoundingClientRect();
                x += frameRect.x;
                y += frameRect.y;
                win = win.parent;
            }
            return JSON.stringify({ x, y, width: rect.width, height: rect.height });"#,
    )
}

/// Like `bounding_box`, plus whether the element (or a descendant) is what a
/// pointer at its center would hit.
pub fn click_point(selector: &Selector) -> String {
    with_first(
        selector,
        r#"if (!el) return JSON.stringify(null);
            el.scrollIntoView({ block: 'center', inline: 'center' });
            const rect = el.getBoundingClientRect();
            const cx = rect.x + rect.width / 2, cy = rect.y + rect.height / 2;
            const hit = el.ownerDocument.elementFromPoint(cx, cy);
            const receives = !!hit && (hit === el || el.contains(hit));
            let blocker = null;
            if (!receives && hit) {
                blocker = hit.tagName.toLowerCase()
                    + (hit.id ? '#' + hit.id : '')
                    + (typeof hit.className === 'string' && hit.className
                        ? '.' + hit.className.trim().split(/\s+/).join('.') : '');
            }
            let x = cx, y = cy;
            let win = el.ownerDocument.defaultView;
            while (win && win.frameElement) {
                const frameRect = win.frameElement.getBoundingClientRect();
                x += frameRect.x;
                y += frameRect.y;
                win = win.parent;
            }
            return JSON.stringify({ x, y, receives, blocker });"#,
    )
}

pub fn dom_click(selector: &Selector) -> String {
    with_first(
        selector,
        r#"if (!el) return JSON.stringify(false);
            el.click();
            return JSON.stringify(true);"#,
    )
}

/// Sets the value through the native setter so React-controlled inputs see
/// the change.
pub fn fill(selector: &Selector, value: &str) -> String {
    with_first(
        selector,
        &format!(
            r#"if (!el) return JSON.stringify(false);
            el.focus();
            const proto = Object.getPrototypeOf(el);
            const setter = Object.getOwnPropertyDescriptor(proto, 'value');
            if (setter && setter.set) setter.set.call(el, {value}); else el.value = {value};
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return JSON.stringify(true);"#,
            value = quote(value)
        ),
    )
}

pub fn select_options(selector: &Selector, values: &[String]) -> String {
    let values = serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string());
    with_first(
        selector,
        &format!(
            r#"if (!el || !el.options) return JSON.stringify(false);
            const wanted = {};
            for (const option of el.options) {{
                option.selected = wanted.includes(option.value) || wanted.includes(option.textContent.trim());
            }}
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return JSON.stringify(true);"#,
            values
        ),
    )
}

pub fn set_checked(selector: &Selector, checked: bool) -> String {
    with_first(
        selector,
        &format!(
            r#"if (!el) return JSON.stringify(false);
            if (el.checked !== {checked}) el.click();
            return JSON.stringify(el.checked === {checked});"#,
            checked = checked
        ),
    )
}

pub fn text_content(selector: &Selector) -> String {
    with_first(
        selector,
        "return JSON.stringify(el ? el.textContent : null);",
    )
}

pub fn all_text_contents(selector: &Selector) -> String {
    with_first(
        selector,
        "return JSON.stringify(els.map((e) => e.textContent || ''));",
    )
}

pub fn input_value(selector: &Selector) -> String {
    with_first(
        selector,
        "return JSON.stringify(el ? (el.value === undefined ? null : String(el.value)) : null);",
    )
}

pub fn attribute(selector: &Selector, name: &str) -> String {
    with_first(
        selector,
        &format!(
            "return JSON.stringify(el ? el.getAttribute({}) : null);",
            quote(name)
        ),
    )
}

pub fn outer_html(selector: &Selector) -> String {
    with_first(
        selector,
        "return JSON.stringify(el ? el.outerHTML : null);",
    )
}

/// Expression for the first match, returned as a remote object reference.
pub fn element_handle(selector: &Selector) -> String {
    format!("{}[0]", selector.to_js())
}

pub fn remove_elements(css: &[String]) -> String {
    let css = serde_json::to_string(css).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"(function() {{
            let removed = 0;
            for (const sel of {}) {{
                try {{
                    document.querySelectorAll(sel).forEach((el) => {{ el.remove(); removed++; }});
                }} catch (e) {{}}
            }}
            return JSON.stringify(removed);
        }})()"#,
        css
    )
}

pub const READY_STATE: &str = "JSON.stringify(document.readyState)";

/// Counts fetch and XHR requests still in flight. Installed once per document.
pub const INSTALL_REQUEST_COUNTER: &str = r#"(function() {
    if (window.__e2eInflight !== undefined) return JSON.stringify(true);
    window.__e2eInflight = 0;
    const done = () => { window.__e2eInflight = Math.max(0, window.__e2eInflight - 1); };
    const originalFetch = window.fetch;
    if (originalFetch) {
        window.fetch = function(...args) {
            window.__e2eInflight++;
            return originalFetch.apply(this, args).finally(done);
        };
    }
    const originalSend = XMLHttpRequest.prototype.send;
    XMLHttpRequest.prototype.send = function(...args) {
        window.__e2eInflight++;
        this.addEventListener('loadend', done, { once: true });
        return originalSend.apply(this, args);
    };
    return JSON.stringify(true);
})()"#;

pub const INFLIGHT_REQUESTS: &str =
    "JSON.stringify(window.__e2eInflight === undefined ? null : window.__e2eInflight)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_json_quoted() {
        let sel = Selector::parse("#userName").unwrap();
        let js = fill(&sel, r#"O'Brien "Jr""#);
        assert!(js.contains(r#""O'Brien \"Jr\"""#));
    }

    #[test]
    fn snippets_embed_the_resolver() {
        let sel = Selector::parse("frame=#frame1 >> #sampleHeading").unwrap();
        let js = probe(&sel);
        assert!(js.contains(r#""kind":"frame""#));
        assert!(js.contains("JSON.stringify"));
    }

    #[test]
    fn remove_list_is_serialized() {
        let js = remove_elements(&["#fixedban".to_string(), "footer".to_string()]);
        assert!(js.contains(r##"["#fixedban","footer"]"##));
    }
}
