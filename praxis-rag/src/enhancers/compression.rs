//! LLM-backed contextual compression.
//!
//! Long chunks are rewritten against the request query; chunks the model
//! deems irrelevant are dropped. Work runs with bounded parallelism and
//! preserves result order.

use crate::enhancer::{Enhancer, EnhancementType, ImpactEstimate, Recommendation};
use crate::{RagResponse, RetrievalMatch, ScoredMatch};
use anyhow::Result;
use async_trait::async_trait;
use praxis_core::parallel_map;
use praxis_llm::LlmClient;
use std::sync::Arc;

const IRRELEVANT_MARKER: &str = "irrelevant";

pub struct ContextualCompressionEnhancer {
    llm: Arc<dyn LlmClient>,
    /// Estimated wall time for one model call, used for impact forecasts.
    per_call_latency_ms: u64,
}

impl ContextualCompressionEnhancer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            per_call_latency_ms: 750,
        }
    }

    pub fn with_per_call_latency_ms(mut self, latency_ms: u64) -> Self {
        self.per_call_latency_ms = latency_ms;
        self
    }

    fn needs_compression(result: &ScoredMatch, min_length: usize) -> bool {
        matches!(&result.content, RetrievalMatch::Chunk(chunk) if chunk.text.len() > min_length)
    }

    fn compression_prompt(query: &str, text: &str) -> String {
        format!(
            "Compress the following content so it keeps only what matters for \
             answering the query.\n\nQuery: {query}\n\nContent:\n{text}\n\n\
             Respond with the compressed content only. If the content is not \
             relevant to the query at all, respond with the single word \
             \"{IRRELEVANT_MARKER}\"."
        )
    }
}

#[async_trait]
impl Enhancer for ContextualCompressionEnhancer {
    fn name(&self) -> &str {
        "contextual-compression"
    }

    fn enhancement_type(&self) -> EnhancementType {
        EnhancementType::Compression
    }

    fn estimate_impact(&self, response: &RagResponse) -> ImpactEstimate {
        let config = &response.request.compression;
        if !config.enabled {
            return ImpactEstimate::skip();
        }
        let long: Vec<_> = response
            .results
            .iter()
            .filter(|r| Self::needs_compression(r, config.min_length_to_compress))
            .collect();
        if long.is_empty() {
            return ImpactEstimate::skip();
        }
        let batches = long.len().div_ceil(config.max_concurrency.max(1)) as u64;
        ImpactEstimate {
            expected_quality_gain: 0.1,
            estimated_latency_ms: batches * self.per_call_latency_ms,
            estimated_token_cost: long
                .iter()
                .map(|r| r.content.text().len() as u64 / 4)
                .sum(),
            recommendation: Recommendation::Apply,
        }
    }

    async fn enhance(&self, mut response: RagResponse) -> Result<RagResponse> {
        let config = response.request.compression.clone();
        let query = response.request.query.clone();
        let results = std::mem::take(&mut response.results);

        let compressed = parallel_map(results, config.max_concurrency, |result| {
            let llm = self.llm.clone();
            let query = query.clone();
            let min_length = config.min_length_to_compress;
            async move {
                if !Self::needs_compression(&result, min_length) {
                    return Some(result);
                }
                let RetrievalMatch::Chunk(chunk) = &result.content else {
                    return Some(result);
                };
                match llm.complete(&Self::compression_prompt(&query, &chunk.text)).await {
                    Ok(completion) => {
                        let text = completion.text.trim();
                        if text.eq_ignore_ascii_case(IRRELEVANT_MARKER) {
                            None
                        } else {
                            let mut compressed_chunk = chunk.clone();
                            compressed_chunk.text = text.to_string();
                            Some(ScoredMatch {
                                content: RetrievalMatch::Chunk(compressed_chunk),
                                score: result.score,
                            })
                        }
                    }
                    Err(error) => {
                        // Keep the original content rather than lose a result.
                        tracing::warn!(%error, id = result.content.id(), "compression call failed");
                        Some(result)
                    }
                }
            }
        })
        .await;

        response.results = compressed.into_iter().flatten().collect();
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompressionConfig, RagRequest};
    use praxis_llm::ScriptedLlm;

    fn request_with_min_length(min: usize) -> RagRequest {
        RagRequest::new("what is rust", 5).with_compression(CompressionConfig {
            enabled: true,
            min_length_to_compress: min,
            max_concurrency: 2,
        })
    }

    #[tokio::test]
    async fn compresses_long_chunks_and_drops_irrelevant_ones() {
        let llm = Arc::new(ScriptedLlm::new());
        llm.push_text("rust is a systems language");
        llm.push_text(IRRELEVANT_MARKER);

        let response = RagResponse::new(
            request_with_min_length(20),
            "svc",
            vec![
                ScoredMatch::chunk("short", "tiny", 0.9),
                ScoredMatch::chunk("long-relevant", "x".repeat(40), 0.8),
                ScoredMatch::chunk("long-irrelevant", "y".repeat(40), 0.7),
            ],
        );

        let out = ContextualCompressionEnhancer::new(llm)
            .enhance(response)
            .await
            .unwrap();

        assert_eq!(out.result_ids(), vec!["short", "long-relevant"]);
        assert_eq!(out.results[0].content.text(), "tiny");
        assert_eq!(out.results[1].content.text(), "rust is a systems language");
    }

    #[tokio::test]
    async fn per_item_failure_keeps_the_original_text() {
        let llm = Arc::new(ScriptedLlm::new());
        llm.push_error("provider down");

        let original = "z".repeat(40);
        let response = RagResponse::new(
            request_with_min_length(20),
            "svc",
            vec![ScoredMatch::chunk("only", original.clone(), 0.8)],
        );

        let out = ContextualCompressionEnhancer::new(llm)
            .enhance(response)
            .await
            .unwrap();
        assert_eq!(out.results[0].content.text(), original);
    }

    #[test]
    fn estimate_skips_without_long_chunks_and_scales_with_batches() {
        let llm = Arc::new(ScriptedLlm::new());
        let enhancer = ContextualCompressionEnhancer::new(llm).with_per_call_latency_ms(500);

        let short_only = RagResponse::new(
            request_with_min_length(100),
            "svc",
            vec![ScoredMatch::chunk("a", "short", 0.9)],
        );
        assert_eq!(
            enhancer.estimate_impact(&short_only).recommendation,
            Recommendation::Skip
        );

        // Three long chunks at concurrency 2 is two batches.
        let long = RagResponse::new(
            request_with_min_length(10),
            "svc",
            vec![
                ScoredMatch::chunk("a", "x".repeat(20), 0.9),
                ScoredMatch::chunk("b", "x".repeat(20), 0.8),
                ScoredMatch::chunk("c", "x".repeat(20), 0.7),
            ],
        );
        let estimate = enhancer.estimate_impact(&long);
        assert_eq!(estimate.recommendation, Recommendation::Apply);
        assert_eq!(estimate.estimated_latency_ms, 1000);
    }
}
