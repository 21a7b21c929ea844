//! LLM-backed reranking.
//!
//! Asks the model to order results by relevance to the query. Stable: ties
//! and anything the model leaves out keep their input order, and
//! unparseable model output leaves the order untouched.

use crate::enhancer::{Enhancer, EnhancementType, ImpactEstimate, Recommendation};
use crate::RagResponse;
use anyhow::Result;
use async_trait::async_trait;
use praxis_llm::LlmClient;
use std::sync::Arc;

const SNIPPET_LENGTH: usize = 200;

pub struct RerankingEnhancer {
    llm: Arc<dyn LlmClient>,
}

impl RerankingEnhancer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn rerank_prompt(response: &RagResponse) -> String {
        let mut prompt = format!(
            "Order the following results by relevance to the query, most \
             relevant first.\n\nQuery: {}\n\n",
            response.request.query
        );
        for (index, result) in response.results.iter().enumerate() {
            let snippet: String = result.content.text().chars().take(SNIPPET_LENGTH).collect();
            prompt.push_str(&format!("{index}: {snippet}\n"));
        }
        prompt.push_str(
            "\nRespond with a JSON array of the indices in ranked order, e.g. [2, 0, 1].",
        );
        prompt
    }

    /// Indices the model returned, filtered to valid unique positions.
    fn parse_ranking(text: &str, len: usize) -> Option<Vec<usize>> {
        let start = text.find('[')?;
        let end = text.rfind(']')?;
        let indices: Vec<usize> = serde_json::from_str(&text[start..=end]).ok()?;
        let mut seen = vec![false; len];
        let mut ranking = Vec::new();
        for index in indices {
            if index < len && !seen[index] {
                seen[index] = true;
                ranking.push(index);
            }
        }
        Some(ranking)
    }
}

#[async_trait]
impl Enhancer for RerankingEnhancer {
    fn name(&self) -> &str {
        "llm-rerank"
    }

    fn enhancement_type(&self) -> EnhancementType {
        EnhancementType::Reranking
    }

    fn estimate_impact(&self, response: &RagResponse) -> ImpactEstimate {
        if response.results.len() <= 1 {
            return ImpactEstimate::skip();
        }
        ImpactEstimate {
            expected_quality_gain: 0.15,
            estimated_latency_ms: 600,
            estimated_token_cost: response.approximate_tokens(),
            recommendation: Recommendation::Apply,
        }
    }

    async fn enhance(&self, mut response: RagResponse) -> Result<RagResponse> {
        let completion = self.llm.complete(&Self::rerank_prompt(&response)).await?;
        let len = response.results.len();

        let Some(ranking) = Self::parse_ranking(&completion.text, len) else {
            tracing::debug!("unparseable ranking, keeping input order");
            return Ok(response);
        };

        let mut placed = vec![false; len];
        let mut order = Vec::with_capacity(len);
        for index in ranking {
            placed[index] = true;
            order.push(index);
        }
        // Anything the model left out keeps its relative input order.
        order.extend((0..len).filter(|i| !placed[*i]));

        let mut slots: Vec<Option<_>> = response.results.into_iter().map(Some).collect();
        response.results = order
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();
        Ok(response)
    }
}
