//! Fixed prompt catalog.

use crate::types::{CopyType, Language};

pub const CAPTION_PROMPT: &str = "Describe this image clearly.";

pub const TAG_PROMPT: &str = "Generate 5 short keyword tags separated by commas.";

const QUESTION_TEMPLATE: &str = "Answer this question based on the image: {question}";

/// Marketing template for `copy_type`, with `{language}` unexpanded.
pub fn marketing_template(copy_type: CopyType) -> &'static str {
    match copy_type {
        CopyType::Ecommerce => "Generate a persuasive e-commerce product description in {language}. Focus on selling points, emotions, and product value.",
        CopyType::Xiaohongshu => "Generate a trendy Xiaohongshu (RED) style lifestyle post in {language}. Tone: emotional, friendly, soft.",
        CopyType::Instagram => "Generate an Instagram caption in {language} with emojis and a stylish tone.",
        CopyType::Seo => "Write an SEO-optimized marketing paragraph in {language}. Include keywords and product benefits.",
        CopyType::Bullets => "List 5 concise bullet-point product features in {language}. Output bullet points only.",
    }
}

/// Replace `{key}` placeholders in `template`.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{}}}", key);
        rendered = rendered.replace(&placeholder, value);
    }
    rendered
}

pub fn marketing_prompt(copy_type: CopyType, language: Language) -> String {
    render(
        marketing_template(copy_type),
        &[("language", language.as_str())],
    )
}

pub fn question_prompt(question: &str) -> String {
    render(QUESTION_TEMPLATE, &[("question", question.trim())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marketing_prompt_substitutes_language() {
        let prompt = marketing_prompt(CopyType::Instagram, Language::French);
        assert_eq!(
            prompt,
            "Generate an Instagram caption in French with emojis and a stylish tone."
        );
    }

    #[test]
    fn test_every_template_mentions_language() {
        for copy_type in CopyType::ALL {
            assert!(marketing_template(copy_type).contains("{language}"));
            assert!(!marketing_prompt(copy_type, Language::Chinese).contains('{'));
        }
    }

    #[test]
    fn test_question_prompt() {
        assert_eq!(
            question_prompt("  What brand is the sofa? "),
            "Answer this question based on the image: What brand is the sofa?"
        );
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        assert_eq!(render("{a} and {b}", &[("a", "x")]), "x and {b}");
    }
}
