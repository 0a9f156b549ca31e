use serde::Serialize;

/// Pretty-printed JSON inside a fenced block, the shape every tool reply uses.
pub fn json_block<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    Ok(format!("```json\n{}\n```", serde_json::to_string_pretty(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_block() {
        let text = json_block(&json!({"a": 1})).unwrap();
        assert_eq!(text, "```json\n{\n  \"a\": 1\n}\n```");
    }
}
