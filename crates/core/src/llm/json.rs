use anyhow::{bail, Context};

/// Strips a surrounding Markdown code fence (```json ... ``` or ``` ... ```), if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let mut inner = trimmed;
    if let Some(after_first) = inner.splitn(2, '\n').nth(1) {
        inner = after_first;
    } else {
        return trimmed;
    }
    if let Some(end) = inner.rfind("```") {
        inner = &inner[..end];
    }
    inner.trim()
}

/// Reads a batch reply as an ordered list of raw category strings.
///
/// Bracketed replies must be a JSON array of strings. Anything else is read one
/// category per non-blank line, with surrounding quotes removed.
pub fn parse_category_list(text: &str) -> anyhow::Result<Vec<String>> {
    let body = strip_code_fence(text);

    if body.starts_with('[') && body.ends_with(']') {
        let values = serde_json::from_str::<Vec<serde_json::Value>>(body)
            .with_context(|| format!("batch reply is not a valid JSON array: {body}"))?;
        let mut out = Vec::with_capacity(values.len());
        for (idx, value) in values.into_iter().enumerate() {
            match value {
                serde_json::Value::String(s) => out.push(s),
                other => bail!("batch reply item {} is not a string: {other}", idx + 1),
            }
        }
        return Ok(out);
    }

    Ok(body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim().trim_matches('"').trim_matches('\'').to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_array() {
        let parsed = parse_category_list(" [\"Shopping\", \"Travel\"] \n").unwrap();
        assert_eq!(parsed, vec!["Shopping", "Travel"]);
    }

    #[test]
    fn parses_fenced_json_array() {
        let fenced = "```json\n[\"Utilities\", \"Other\"]\n```\n";
        assert_eq!(
            parse_category_list(fenced).unwrap(),
            vec!["Utilities", "Other"]
        );
    }

    #[test]
    fn rejects_malformed_bracketed_reply() {
        assert!(parse_category_list("[\"Shopping\" \"Travel\"]").is_err());
        assert!(parse_category_list("[Shopping, Travel]").is_err());
    }

    #[test]
    fn rejects_non_string_items() {
        let err = parse_category_list("[\"Shopping\", 3]").unwrap_err();
        assert!(err.to_string().contains("item 2"));
    }

    #[test]
    fn falls_back_to_lines() {
        let reply = "\"Food & Dining\"\n\n  'Transportation'  \nShopping\n";
        assert_eq!(
            parse_category_list(reply).unwrap(),
            vec!["Food & Dining", "Transportation", "Shopping"]
        );
    }

    #[test]
    fn quoted_blank_line_survives_as_empty_item() {
        assert_eq!(parse_category_list("Travel\n\"\"").unwrap(), vec!["Travel", ""]);
    }

    #[test]
    fn empty_reply_yields_no_items() {
        assert!(parse_category_list("   \n ").unwrap().is_empty());
    }

    #[test]
    fn strip_code_fence_leaves_plain_text() {
        assert_eq!(strip_code_fence("  Travel \n"), "Travel");
    }
}
