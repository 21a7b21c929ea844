//! The enhancer contract.

use crate::RagResponse;
use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnhancementType {
    Deduplication,
    Compression,
    Reranking,
    Filtering,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Apply,
    Skip,
    /// Worth applying unless the adaptive loop decides otherwise.
    Conditional,
}

/// An enhancer's own forecast of what running it would buy and cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactEstimate {
    pub expected_quality_gain: f64,
    pub estimated_latency_ms: u64,
    pub estimated_token_cost: u64,
    pub recommendation: Recommendation,
}

impl ImpactEstimate {
    /// Nothing to do for this response.
    pub fn skip() -> Self {
        Self {
            expected_quality_gain: 0.0,
            estimated_latency_ms: 0,
            estimated_token_cost: 0,
            recommendation: Recommendation::Skip,
        }
    }
}

/// One stage of the response-enhancement pipeline.
#[async_trait]
pub trait Enhancer: Send + Sync {
    fn name(&self) -> &str;

    fn enhancement_type(&self) -> EnhancementType;

    fn estimate_impact(&self, response: &RagResponse) -> ImpactEstimate;

    /// Produce the enhanced response. Errors are non-fatal to the pipeline;
    /// the previous response survives.
    async fn enhance(&self, response: RagResponse) -> Result<RagResponse>;
}
