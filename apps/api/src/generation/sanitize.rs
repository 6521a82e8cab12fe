//! Response Sanitizer: strips markdown code fences and control characters
//! from a raw text blob returned by an LLM call.
//!
//! Never fails: the output is best-effort cleaned text even when fences are
//! malformed or absent, and the function is idempotent.

/// Cleans a raw model response.
///
/// 1. Trim leading/trailing whitespace.
/// 2. Drop a first/last line that starts with a triple-backtick marker
///    (optionally followed by a language hint such as `json`).
/// 3. Remove all C0 and C1 control characters (U+0000–U+001F, U+007F–U+009F).
/// 4. Defensive fallback: strip any fence markers that survived step 2.
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim();

    let mut lines: Vec<&str> = trimmed.lines().collect();
    // Single-line responses keep their content and rely on the fallback;
    // dropping the only line would drop the payload with it.
    if lines.len() > 1 {
        if lines.first().is_some_and(|l| l.starts_with("```")) {
            lines.remove(0);
        }
        if lines.last().is_some_and(|l| l.starts_with("```")) {
            lines.pop();
        }
    }
    let joined = lines.join("\n");

    let cleaned: String = joined.chars().filter(|c| !is_control(*c)).collect();

    strip_residual_fences(&cleaned).to_string()
}

fn is_control(c: char) -> bool {
    matches!(c as u32, 0x00..=0x1F | 0x7F..=0x9F)
}

/// Second pass for fences the line-based pass missed, e.g. a single-line
/// response like ```` ```json {...}``` ````.
fn strip_residual_fences(text: &str) -> &str {
    let mut out = text.trim();
    for prefix in ["```json", "```javascript", "```"] {
        if let Some(rest) = out.strip_prefix(prefix) {
            out = rest.trim_start();
            break;
        }
    }
    if let Some(rest) = out.strip_suffix("```") {
        out = rest.trim_end();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_fences_with_json_hint() {
        let input = "```json\n{\"title\": \"x\"}\n```";
        assert_eq!(sanitize(input), "{\"title\": \"x\"}");
    }

    #[test]
    fn test_strips_fences_without_hint() {
        let input = "```\n{\"title\": \"x\"}\n```";
        assert_eq!(sanitize(input), "{\"title\": \"x\"}");
    }

    #[test]
    fn test_strips_fences_with_javascript_hint() {
        let input = "```javascript\n{\"title\": \"x\"}\n```";
        assert_eq!(sanitize(input), "{\"title\": \"x\"}");
    }

    #[test]
    fn test_unfenced_input_passes_through() {
        assert_eq!(sanitize("{\"title\": \"x\"}"), "{\"title\": \"x\"}");
    }

    #[test]
    fn test_removes_c0_and_c1_control_characters() {
        let input = "{\"a\":\u{0001} \"b\u{009F}\"}";
        let out = sanitize(input);
        assert!(out.chars().all(|c| !is_control(c)));
        assert_eq!(out, "{\"a\": \"b\"}");
    }

    #[test]
    fn test_single_line_fenced_response_hits_fallback() {
        // No newlines, so the line-based pass leaves the input alone and the
        // fallback must strip both markers.
        let input = "```json {\"a\": 1}```";
        assert_eq!(sanitize(input), "{\"a\": 1}");
    }

    #[test]
    fn test_malformed_fence_never_panics() {
        assert_eq!(sanitize("```"), "");
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("``` \n"), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "```json\n{\"questions\": []}\n```",
            "plain text with no json",
            "```\n\u{0007}{\"k\": \"v\"}\n```",
            "",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_no_fence_markers_survive() {
        let inputs = [
            "```json\n{\"a\": 1}\n```",
            "```\n{\"a\": 1}\n```",
            "```json {\"a\": 1}```",
        ];
        for input in inputs {
            assert!(!sanitize(input).contains("```"));
        }
    }
}
