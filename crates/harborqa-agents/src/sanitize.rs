//! Model output sanitation.
//!
//! Contract: remove a known markdown code-fence wrapper (```lang ... ``` or
//! bare ``` ... ```) around the whole response and trim whitespace; text
//! without a known wrapper passes through unchanged apart from the trim.
//! Fences inside the body are left alone.

/// Strips a leading fence with one of the given language tags (or no tag)
/// and a trailing bare fence.
pub fn strip_code_fences(text: &str, langs: &[&str]) -> String {
    let mut cleaned = text.trim();
    for lang in langs {
        let opener = format!("```{}", lang);
        if let Some(rest) = cleaned.strip_prefix(opener.as_str()) {
            cleaned = rest;
            break;
        }
    }
    cleaned = cleaned.strip_prefix("```").unwrap_or(cleaned);
    cleaned = cleaned.trim_end();
    cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned);
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let wrapped = "```json\n[{\"id\": \"TC-1\"}]\n```";
        assert_eq!(strip_code_fences(wrapped, &["json"]), "[{\"id\": \"TC-1\"}]");
    }

    #[test]
    fn strips_python_fence() {
        let wrapped = "```python\nprint('hi')\n```";
        assert_eq!(strip_code_fences(wrapped, &["python"]), "print('hi')");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_code_fences("```\ncontent\n```", &["json"]), "content");
    }

    #[test]
    fn unwrapped_text_passes_through() {
        assert_eq!(strip_code_fences("  plain output  ", &["json"]), "plain output");
    }

    #[test]
    fn interior_fences_are_preserved() {
        let text = "before\n```\ninner\n```\nafter";
        assert_eq!(strip_code_fences(text, &["python"]), text);
    }
}
