//! Recovering the digest JSON from free-form model output.

use std::sync::LazyLock;

use regex::Regex;
use topicdigest_core::DigestDocument;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z]*").expect("valid code fence regex"));

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\s*[}\]])").expect("valid trailing comma regex"));

/// Result of [`parse_digest`]. Either way the caller gets a usable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestOutcome {
    Parsed(DigestDocument),
    Placeholder(DigestDocument),
}

impl DigestOutcome {
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    #[must_use]
    pub fn into_document(self) -> DigestDocument {
        match self {
            Self::Parsed(doc) | Self::Placeholder(doc) => doc,
        }
    }
}

/// Slice from the first `{` to the last `}` inclusive.
#[must_use]
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn repair(text: &str) -> String {
    let unfenced = CODE_FENCE.replace_all(text, "");
    TRAILING_COMMA.replace_all(&unfenced, "$1").into_owned()
}

/// Parse the digest out of raw model text, falling back to a placeholder.
#[must_use]
pub fn parse_digest(raw: &str) -> DigestOutcome {
    if let Some(span) = extract_json_span(raw) {
        match serde_json::from_str::<DigestDocument>(span) {
            Ok(doc) => return DigestOutcome::Parsed(doc),
            Err(first) => {
                let repaired = repair(span);
                match serde_json::from_str::<DigestDocument>(&repaired) {
                    Ok(doc) => {
                        tracing::debug!(error = %first, "digest JSON parsed after repair");
                        return DigestOutcome::Parsed(doc);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "digest JSON unparseable after repair");
                    }
                }
            }
        }
    } else {
        tracing::warn!(raw_chars = raw.len(), "no JSON object in digest output");
    }
    DigestOutcome::Placeholder(DigestDocument::placeholder())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_ignores_surrounding_prose() {
        let raw = "Sure! Here it is:\n{\"stories\": []}\nHope that helps.";
        assert_eq!(extract_json_span(raw), Some("{\"stories\": []}"));
    }

    #[test]
    fn span_requires_both_braces() {
        assert_eq!(extract_json_span("no json here"), None);
        assert_eq!(extract_json_span("} backwards {"), None);
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let raw = r#"Here is the digest:
{"stories":[{"title":"Senate passes budget","content":"The vote was 51-49."}],"questions":["What next?"]}
Let me know if you need more."#;
        let DigestOutcome::Parsed(doc) = parse_digest(raw) else {
            panic!("expected parsed digest");
        };
        assert_eq!(doc.stories.len(), 1);
        assert_eq!(doc.stories[0].title, "Senate passes budget");
        assert_eq!(doc.stories[0].content, "The vote was 51-49.");
        assert_eq!(doc.questions, ["What next?"]);
    }

    #[test]
    fn repairs_trailing_commas() {
        let raw = r#"{"stories":[{"title":"A","content":"B",},],"questions":["Q",],}"#;
        let outcome = parse_digest(raw);
        assert!(!outcome.is_placeholder());
        assert_eq!(outcome.into_document().questions, ["Q"]);
    }

    #[test]
    fn fenced_block_is_parsed() {
        let raw = "```json\n{\"stories\":[{\"title\":\"T\",\"content\":\"C\"}]}\n```";
        let doc = parse_digest(raw).into_document();
        assert_eq!(doc.stories[0].title, "T");
    }

    #[test]
    fn missing_fields_default() {
        let doc = parse_digest(r#"{"stories":[{"title":"Only title"}]}"#).into_document();
        assert_eq!(doc.stories[0].content, "");
        assert!(doc.questions.is_empty());
    }

    #[test]
    fn no_braces_yields_placeholder() {
        let outcome = parse_digest("I could not produce a digest today.");
        assert!(outcome.is_placeholder());
        let doc = outcome.into_document();
        assert_eq!(doc.stories.len(), 1);
        assert_eq!(doc.stories[0].title, "Error");
        assert_eq!(doc.questions.len(), 3);
    }

    #[test]
    fn garbage_between_braces_yields_placeholder() {
        assert!(parse_digest("{ this is not json }").is_placeholder());
    }
}
