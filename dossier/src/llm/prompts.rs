//! Prompt templates for the synthesis engine.
//!
//! Templates use `format!()` interpolation; a missing variable is a
//! compile-time error.

/// Prompt for the context summary over retrieved chunks.
///
/// # Example
/// ```
/// use dossier::llm::prompts::summary_prompt;
///
/// let prompt = summary_prompt("The loan matures on 2026-03-01.");
/// assert!(prompt.contains("2026-03-01"));
/// ```
pub fn summary_prompt(context: &str) -> String {
    format!(
        r#"Provide a comprehensive summary of the following documents, focusing on
key points, important dates, and notable figures or obligations.

{context}

Summary:"#
    )
}

/// Prompt for query-specific recommendations over retrieved chunks.
///
/// Each recommendation is requested on its own bulleted line so the
/// response parses into an ordered sequence.
pub fn recommendations_prompt(context: &str, query: &str) -> String {
    format!(
        r#"Based on the following documents, provide specific recommendations for
the given query. Focus on actionable insights grounded in the documents.
Write each recommendation on its own line, starting with "- ".

Documents:
{context}

Query: {query}

Recommendations:"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompt_embeds_context() {
        let prompt = summary_prompt("Quarterly revenue rose 12%.");
        assert!(prompt.contains("Quarterly revenue rose 12%."));
        assert!(prompt.contains("Summary:"));
    }

    #[test]
    fn test_recommendations_prompt_embeds_context_and_query() {
        let prompt = recommendations_prompt("Account terms.", "Should I refinance?");
        assert!(prompt.contains("Account terms."));
        assert!(prompt.contains("Should I refinance?"));
        assert!(prompt.contains("Recommendations:"));
    }
}
