/*!
# Praxis RAG

Adaptive response enhancement for retrieval-augmented generation. An
underlying retrieval service produces a [`RagResponse`] (with `top_k`
inflated to give the pipeline room to filter); an
[`EnhancementPipeline`](pipeline::EnhancementPipeline) then runs an ordered
list of [`Enhancer`](enhancer::Enhancer)s — deduplication, contextual
compression, reranking, filtering — skipping stages that are not worth
their latency and cutting the whole pipeline off at the request's
`desired_max_latency`.
*/

pub mod enhancer;
pub mod enhancers;
pub mod pipeline;

pub use enhancer::{Enhancer, EnhancementType, ImpactEstimate, Recommendation};
pub use enhancers::{
    ContextualCompressionEnhancer, DedupEnhancer, RerankingEnhancer, ScoreFilterEnhancer,
};
pub use pipeline::{EnhancementPipeline, PipelineConfig};

use std::collections::HashMap;
use std::time::Duration;

/// A retrieved text fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub metadata: HashMap<String, String>,
}

impl Chunk {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// What a retrieval service can hand back. Chunks dominate; whole-document
/// references appear when the service indexes at document granularity.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalMatch {
    Chunk(Chunk),
    Document {
        id: String,
        title: String,
        uri: Option<String>,
    },
}

impl RetrievalMatch {
    pub fn id(&self) -> &str {
        match self {
            RetrievalMatch::Chunk(chunk) => &chunk.id,
            RetrievalMatch::Document { id, .. } => id,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            RetrievalMatch::Chunk(chunk) => &chunk.text,
            RetrievalMatch::Document { title, .. } => title,
        }
    }
}

/// A match with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub content: RetrievalMatch,
    pub score: f64,
}

impl ScoredMatch {
    pub fn chunk(id: impl Into<String>, text: impl Into<String>, score: f64) -> Self {
        Self {
            content: RetrievalMatch::Chunk(Chunk::new(id, text)),
            score,
        }
    }
}

/// Contextual-compression knobs carried on the request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionConfig {
    pub enabled: bool,
    /// Results shorter than this are left alone.
    pub min_length_to_compress: usize,
    pub max_concurrency: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_length_to_compress: 1500,
            max_concurrency: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RagRequest {
    pub query: String,
    pub top_k: usize,
    /// Soft deadline for the enhancement pipeline.
    pub desired_max_latency: Duration,
    pub compression: CompressionConfig,
}

impl RagRequest {
    pub fn new(query: impl Into<String>, top_k: usize) -> Self {
        Self {
            query: query.into(),
            top_k,
            desired_max_latency: Duration::from_secs(5),
            compression: CompressionConfig::default(),
        }
    }

    pub fn with_desired_max_latency(mut self, latency: Duration) -> Self {
        self.desired_max_latency = latency;
        self
    }

    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = compression;
        self
    }

    /// How many results to ask the underlying service for, leaving the
    /// pipeline room to drop duplicates and low scorers.
    pub fn inflated_top_k(&self) -> usize {
        self.top_k * 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityMetrics {
    pub overall_score: f64,
}

/// Annotation left on a response by the enhancer that produced it, chaining
/// back to the response it was derived from.
#[derive(Debug, Clone)]
pub struct EnhancementRecord {
    pub enhancer: String,
    pub enhancement_type: EnhancementType,
    pub basis: Option<Box<RagResponse>>,
    pub processing_time_ms: u64,
    pub tokens_processed: u64,
}

#[derive(Debug, Clone)]
pub struct RagResponse {
    pub request: RagRequest,
    pub service: String,
    pub results: Vec<ScoredMatch>,
    pub quality: Option<QualityMetrics>,
    pub enhancement: Option<EnhancementRecord>,
}

impl RagResponse {
    pub fn new(request: RagRequest, service: impl Into<String>, results: Vec<ScoredMatch>) -> Self {
        Self {
            request,
            service: service.into(),
            results,
            quality: None,
            enhancement: None,
        }
    }

    pub fn with_quality(mut self, overall_score: f64) -> Self {
        self.quality = Some(QualityMetrics { overall_score });
        self
    }

    pub fn result_ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.content.id()).collect()
    }

    /// Names of the enhancers that produced this response, most recent first.
    pub fn enhancement_chain(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut record = self.enhancement.as_ref();
        while let Some(current) = record {
            chain.push(current.enhancer.as_str());
            record = current.basis.as_ref().and_then(|b| b.enhancement.as_ref());
        }
        chain
    }

    /// Rough token count of the carried text.
    pub fn approximate_tokens(&self) -> u64 {
        self.results
            .iter()
            .map(|r| r.content.text().len() as u64 / 4)
            .sum()
    }
}
