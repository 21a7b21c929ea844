//! Duplicate removal by match id, first occurrence wins.

use crate::enhancer::{Enhancer, EnhancementType, ImpactEstimate, Recommendation};
use crate::RagResponse;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct DedupEnhancer;

impl DedupEnhancer {
    pub fn new() -> Self {
        Self
    }

    fn duplicate_count(response: &RagResponse) -> usize {
        let mut seen = HashSet::new();
        response
            .results
            .iter()
            .filter(|r| !seen.insert(r.content.id().to_string()))
            .count()
    }
}

#[async_trait]
impl Enhancer for DedupEnhancer {
    fn name(&self) -> &str {
        "dedup"
    }

    fn enhancement_type(&self) -> EnhancementType {
        EnhancementType::Deduplication
    }

    fn estimate_impact(&self, response: &RagResponse) -> ImpactEstimate {
        let duplicates = Self::duplicate_count(response);
        if duplicates == 0 {
            return ImpactEstimate::skip();
        }
        ImpactEstimate {
            expected_quality_gain: 0.05 * duplicates as f64,
            estimated_latency_ms: 1,
            estimated_token_cost: 0,
            recommendation: Recommendation::Apply,
        }
    }

    async fn enhance(&self, mut response: RagResponse) -> Result<RagResponse> {
        let mut seen = HashSet::new();
        response
            .results
            .retain(|r| seen.insert(r.content.id().to_string()));
        Ok(response)
    }
}
