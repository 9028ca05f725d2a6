//! Default prompts and fixed user-facing messages
//!
//! User templates use `${name}` placeholders: `${query}` and `${document}` for the
//! grader, `${query}` and `${context}` for the generator, `${query}` for the rewriter.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([a-z_]+)\}").unwrap());

pub const GRADER_SYSTEM_PROMPT: &str = r#"You are a legal relevance assessor. Decide whether a document is related to a legal question.

## Rule
- The document discusses the same general subject as the question = relevant
- The document discusses an entirely different subject = irrelevant

## Examples
- Question about "ownership" + document about "contracts" or "rights" = relevant
- Question about "ownership" + document about "marriage" = irrelevant

## Instructions
- Answer with exactly one word: relevant or irrelevant
- When in doubt, answer relevant
- Do not be overly strict; any connection is enough"#;

pub const GRADER_USER_TEMPLATE: &str = r#"## Legal question:
${query}

## Document to assess:
${document}

## Verdict (relevant or irrelevant only):"#;

pub const GENERATOR_SYSTEM_PROMPT: &str = r#"You are a legal assistant specialised in the statutes provided to you.

## Answer rules
1. Use ONLY the information contained in the supplied documents. If the answer is not there, say so plainly.
2. Cite the article and law for every legal statement, using the document labels exactly as given, e.g. [Civil Code - Article 147 (1948)].
3. Use correct legal terminology. Distinguish conditions, effects and penalties, and mention exceptions.
4. Start with the direct answer, then the details. Close with a reminder to consult a lawyer for sensitive matters.

## Important
If the documents do not contain enough information:
- acknowledge it clearly
- do not answer from general knowledge
- suggest rephrasing the question or consulting a lawyer"#;

pub const GENERATOR_USER_TEMPLATE: &str = r#"## Legal question:
${query}

## Available legal documents:
${context}

## Your answer (with sources):"#;

pub const REWRITER_SYSTEM_PROMPT: &str = r#"You improve legal search queries.

## Task
Rephrase the legal question so that it retrieves better results.

## Strategies
- Broaden a question that is too narrow
- Narrow a question that is too broad
- Use alternative legal terms and synonyms
- Name the law most likely to govern the matter

## Instructions
- Output only the rephrased question, without explanation
- Keep the original meaning and language
- Output a single clear sentence"#;

pub const REWRITER_USER_TEMPLATE: &str = r#"## Original question that found no results:
${query}

## Rephrased question:"#;

/// Returned when generation fails or produces nothing
pub const GENERATION_FALLBACK_ANSWER: &str =
    "Sorry, an error occurred while generating the answer. Please try again.";

/// Returned by the no-answer terminal
pub const NO_ANSWER_MESSAGE: &str = "Sorry, I could not find legal information relevant to your question in the available sources.\n\n\
Please:\n\
1. Rephrase the question more specifically\n\
2. Name the law or article you are asking about, if possible\n\
3. Consult a specialised lawyer for complex cases";

/// Substitute `${name}` placeholders in a single pass. Unknown placeholders are left
/// as they are, and substituted values are never scanned again.
pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            variables
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_all_occurrences() {
        let rendered = render(
            "Q: ${query} / again ${query} / ${document}",
            &[("query", "theft"), ("document", "Article 311")],
        );

        assert_eq!(rendered, "Q: theft / again theft / Article 311");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        assert_eq!(render("${query} ${other}", &[("query", "x")]), "x ${other}");
    }

    #[test]
    fn test_render_does_not_expand_placeholders_inside_values() {
        let rendered = render(
            GENERATOR_USER_TEMPLATE,
            &[("query", "What does ${context} mean?"), ("context", "Article 147 text")],
        );

        assert!(rendered.contains("## Legal question:\nWhat does ${context} mean?\n"));
        assert_eq!(rendered.matches("Article 147 text").count(), 1);

        let rendered = render(
            "Q: ${query} D: ${document}",
            &[("query", "see ${document}"), ("document", "Article 311")],
        );
        assert_eq!(rendered, "Q: see ${document} D: Article 311");
    }

    #[test]
    fn test_default_templates_have_placeholders() {
        assert!(GRADER_USER_TEMPLATE.contains("${query}"));
        assert!(GRADER_USER_TEMPLATE.contains("${document}"));
        assert!(GENERATOR_USER_TEMPLATE.contains("${context}"));
        assert!(REWRITER_USER_TEMPLATE.contains("${query}"));
    }

    #[test]
    fn test_no_answer_message_is_fixed() {
        assert!(NO_ANSWER_MESSAGE.starts_with("Sorry, I could not find"));
        assert!(NO_ANSWER_MESSAGE.contains("Consult a specialised lawyer"));
    }
}
