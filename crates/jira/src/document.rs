// Atlassian Document Format wrapper for plain-text comment bodies

use serde_json::{json, Value};

/// A single-paragraph document; Jira rejects plain strings for comment bodies.
pub fn paragraph(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [{
            "type": "paragraph",
            "content": [{ "type": "text", "text": text }]
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_document() {
        let doc = paragraph("Fixed the build");
        assert_eq!(doc["type"], "doc");
        assert_eq!(doc["version"], 1);
        assert_eq!(doc["content"][0]["type"], "paragraph");
        assert_eq!(doc["content"][0]["content"][0]["text"], "Fixed the build");
    }
}
