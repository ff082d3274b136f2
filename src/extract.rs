//! Balanced-brace scanner for locating the JSON object inside the analysis
//! service's free-form text.

/// Returns the first balanced `{...}` region in `text`, or `None` when no
/// complete object exists. Braces inside JSON strings are skipped and
/// backslash escapes are honored, so `{"k": "a } b"}` scans correctly.
pub fn json_region(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + idx + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
