//! Prompt construction for the rewrite call.
//!
//! The prompt structure is fixed: persona, input data, output shape,
//! formatting rules, and style prohibitions. Only the article title,
//! the (truncated) original content, and the reference excerpts vary.

/// Build the rewrite instruction prompt.
///
/// `content` must already be truncated to the configured character
/// budget; excerpts are joined with blank-line separators.
pub(crate) fn build_prompt(title: &str, content: &str, excerpts: &[String]) -> String {
    let references = excerpts.join("\n\n");

    format!(
        r#"### ROLE
You are a Senior Technical Journalist and SEO Specialist for a high-end business publication. Your goal is to produce authoritative, data-driven, and professional content.

### INPUT DATA
- **Original Title:** {title}
- **Original Content:** {content}
- **Supplementary References:** {references}

### OUTPUT SPECIFICATION
Return a strictly valid JSON object: {{ "title": "string", "body": "string" }}

1.  **"title"**:
    - Professional, concise, and SEO-focused.
    - Avoid "clickbait" sensationalism.

2.  **"body"**:
    - **Voice**: Maintain a formal, analytical, and sophisticated tone.
    - **Structure**: Use a clear hierarchy with H2 and H3 headers.
    - **Formatting**: Use Markdown. Emphasize key concepts with bolding. Use bullet points for readability.
    - **Synthesis**: Integrate the reference data seamlessly. If there are conflicting facts, use phrases like "While some sources suggest X, recent data indicates Y."

### STRICT STYLE RULES (STRICT ADHERENCE REQUIRED)
- **NO EMOJIS**: Do not use any emojis or emoticons under any circumstances.
- **NO FLUFF**: Avoid introductory filler like "In this article, we will explore..."
- **NO EXCESSIVE EXCLAMATION**: Use professional punctuation; avoid exclamation marks.
- **LANGUAGE**: Use sophisticated vocabulary (e.g., use "utilize" instead of "use," "comprehensive" instead of "big").

### FINAL JSON FORMATTING
- Output ONLY the JSON object.
- Ensure all internal double quotes are escaped (e.g., \") to prevent JSON parsing errors."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_inputs() {
        let excerpts = vec!["First reference.".to_string(), "Second reference.".to_string()];
        let prompt = build_prompt("Widget Trends", "Original body", &excerpts);

        assert!(prompt.contains("**Original Title:** Widget Trends"));
        assert!(prompt.contains("**Original Content:** Original body"));
        assert!(prompt.contains("First reference.\n\nSecond reference."));
    }

    #[test]
    fn prompt_carries_fixed_rules() {
        let prompt = build_prompt("T", "C", &[]);
        assert!(prompt.contains("NO EMOJIS"));
        assert!(prompt.contains("NO FLUFF"));
        assert!(prompt.contains(r#"{ "title": "string", "body": "string" }"#));
    }
}
