//! Minimal HTML handling for feed descriptions.

use std::sync::LazyLock;

use regex::Regex;

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a>"#)
        .expect("valid anchor regex")
});

/// Strip HTML tags, decode common entities and normalize whitespace.
pub(crate) fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    decode_entities(&out)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// `(href, anchor text)` for every `<a href>` in `html`, in document order.
pub(crate) fn extract_anchors(html: &str) -> Vec<(String, String)> {
    ANCHOR
        .captures_iter(html)
        .filter_map(|cap| {
            let href = cap.get(1)?.as_str().trim();
            let text = strip_html(cap.get(2)?.as_str());
            (!href.is_empty()).then(|| (decode_entities(href), text))
        })
        .collect()
}
