use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for `POST /query`. `k` falls back to the configured
/// default when omitted; zero is rejected by the query service.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1, max = 10_000))]
    pub text: String,
    pub k: Option<u32>,
}

/// Token counts for one synthesis call. `total_tokens` is always
/// `input_tokens + output_tokens`; construct through [`UsageCounts::new`]
/// to keep the invariant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounts {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl UsageCounts {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// Per-query token accounting: one bucket per synthesis call plus the
/// combined total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub summary: UsageCounts,
    pub recommendations: UsageCounts,
    pub total: UsageCounts,
}

impl TokenUsage {
    pub fn from_calls(summary: UsageCounts, recommendations: UsageCounts) -> Self {
        Self {
            summary,
            recommendations,
            total: UsageCounts::new(
                summary.input_tokens + recommendations.input_tokens,
                summary.output_tokens + recommendations.output_tokens,
            ),
        }
    }
}

/// Assembled answer for one query. Transient — never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,
    pub k: u32,
    pub summary: String,
    pub recommendations: Vec<String>,
    pub sources: Vec<String>,
    pub token_usage: TokenUsage,
}
