// Shared prompt constants and prompt-building utilities.
// Each pipeline stage's template lives in pipeline::prompts.
// This file contains cross-cutting prompt fragments.

/// System instruction sent with every model call.
pub const JSON_ONLY_SYSTEM: &str = "You are an expert career mentor and technical recruiter. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Closing line appended to every stage prompt.
pub const JSON_ONLY_FOOTER: &str = "Return ONLY valid JSON, no additional text.";

/// Joins a skill list for inline use in a prompt. Empty lists get an explicit
/// marker so the model does not see a dangling label.
pub fn join_list(items: &[String]) -> String {
    if items.is_empty() {
        "None listed".to_string()
    } else {
        items.join(", ")
    }
}

/// Substitutes `{key}` placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned, so resume text, roles, or model
/// output containing `{...}` are inserted verbatim. Braces that do not enclose
/// a known key (JSON examples in the templates) are left as they are.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (close, *value))
        });
        match hit {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
