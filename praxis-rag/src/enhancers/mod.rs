//! The standard enhancers.

mod compression;
mod dedup;
mod filter;
mod rerank;

pub use compression::ContextualCompressionEnhancer;
pub use dedup::DedupEnhancer;
pub use filter::ScoreFilterEnhancer;
pub use rerank::RerankingEnhancer;
