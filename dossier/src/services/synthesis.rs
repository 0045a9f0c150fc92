use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;
use crate::llm::{prompts, LlmProvider};
use crate::models::{RetrievedChunk, UsageCounts};

/// Runs the two synthesis calls over retrieved context, recording token
/// usage per call.
#[derive(Clone)]
pub struct SynthesisEngine {
    llm: LlmProvider,
}

impl SynthesisEngine {
    pub fn new(llm: LlmProvider) -> Self {
        Self { llm }
    }

    pub async fn summarize(&self, chunks: &[RetrievedChunk]) -> Result<(String, UsageCounts)> {
        let context = build_context(chunks);
        let completion = self
            .llm
            .complete(&prompts::summary_prompt(&context), None)
            .await?;

        Ok((
            completion.text.trim().to_string(),
            UsageCounts::new(completion.input_tokens, completion.output_tokens),
        ))
    }

    pub async fn recommend(
        &self,
        query: &str,
        chunks: &[RetrievedChunk],
    ) -> Result<(Vec<String>, UsageCounts)> {
        let context = build_context(chunks);
        let completion = self
            .llm
            .complete(&prompts::recommendations_prompt(&context, query), None)
            .await?;

        Ok((
            parse_recommendations(&completion.text),
            UsageCounts::new(completion.input_tokens, completion.output_tokens),
        ))
    }
}

fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Splits an LLM response into an ordered sequence of recommendations.
///
/// Bulleted (`-`, `*`, `•`) and numbered (`1.`, `2)`) lines each open an
/// item; continuation lines attach to the current item; preamble before the
/// first marker is dropped. A response without markers is one item.
fn parse_recommendations(text: &str) -> Vec<String> {
    static BULLET: OnceLock<Regex> = OnceLock::new();
    let bullet = BULLET.get_or_init(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+").unwrap());

    let mut items: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if let Some(marker) = bullet.find(line) {
            if let Some(item) = current.take() {
                if !item.trim().is_empty() {
                    items.push(item.trim().to_string());
                }
            }
            current = Some(line[marker.end()..].trim().to_string());
        } else if let Some(ref mut item) = current {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                item.push(' ');
                item.push_str(trimmed);
            }
        }
    }

    if let Some(item) = current {
        if !item.trim().is_empty() {
            items.push(item.trim().to_string());
        }
    }

    if items.is_empty() {
        let whole = text.trim();
        if !whole.is_empty() {
            items.push(whole.to_string());
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str) -> RetrievedChunk {
        RetrievedChunk {
            chunk_id: "c1".into(),
            document_id: "d1".into(),
            filename: "a.txt".into(),
            position: 0,
            content: content.into(),
            score: 0.9,
        }
    }

    #[test]
    fn test_build_context_joins_with_blank_lines() {
        let context = build_context(&[chunk("First."), chunk("Second.")]);
        assert_eq!(context, "First.\n\nSecond.");
    }

    #[test]
    fn test_build_context_empty() {
        assert_eq!(build_context(&[]), "");
    }

    #[test]
    fn test_parse_bulleted_recommendations() {
        let parsed = parse_recommendations("- Refinance the loan\n- Close the idle account\n");
        assert_eq!(parsed, vec!["Refinance the loan", "Close the idle account"]);
    }

    #[test]
    fn test_parse_numbered_recommendations() {
        let parsed = parse_recommendations("1. Review the contract\n2) Negotiate the rate");
        assert_eq!(parsed, vec!["Review the contract", "Negotiate the rate"]);
    }

    #[test]
    fn test_parse_drops_preamble() {
        let parsed =
            parse_recommendations("Here are my recommendations:\n- Do the first thing\n- Do the second");
        assert_eq!(parsed, vec!["Do the first thing", "Do the second"]);
    }

    #[test]
    fn test_parse_joins_continuation_lines() {
        let parsed = parse_recommendations("- Spread the payment\n  over twelve months\n- Second item");
        assert_eq!(
            parsed,
            vec!["Spread the payment over twelve months", "Second item"]
        );
    }

    #[test]
    fn test_parse_unmarked_response_is_single_item() {
        let parsed = parse_recommendations("Consider paying the balance in full each month.");
        assert_eq!(
            parsed,
            vec!["Consider paying the balance in full each month."]
        );
    }

    #[test]
    fn test_parse_preserves_order() {
        let parsed = parse_recommendations("- c\n- a\n- b");
        assert_eq!(parsed, vec!["c", "a", "b"]);
    }
}
