//! Adaptive pipeline runner.
//!
//! Enhancers run in list order. Before each one: skip it when quality is
//! already high and the enhancer is expensive; stop the whole pipeline when
//! the request's latency budget is spent; skip when the enhancer itself
//! recommends skipping. Enhancer failures are logged and the previous
//! response carries on.

use crate::enhancer::{Enhancer, Recommendation};
use crate::{EnhancementRecord, RagResponse};
use praxis_core::{AgentEvent, EventBus, RagError};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Enable quality/latency-aware skipping.
    pub adaptive: bool,
    /// Responses scoring above this are considered good enough to skip
    /// expensive enhancers for.
    pub quality_threshold: f64,
    /// An enhancer estimating above this is "expensive".
    pub expensive_latency_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            adaptive: true,
            quality_threshold: 0.7,
            expensive_latency_ms: 1000,
        }
    }
}

pub struct EnhancementPipeline {
    enhancers: Vec<Arc<dyn Enhancer>>,
    config: PipelineConfig,
    events: Arc<EventBus>,
}

impl EnhancementPipeline {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self {
            enhancers: Vec::new(),
            config: PipelineConfig::default(),
            events,
        }
    }

    pub fn with_enhancer(mut self, enhancer: Arc<dyn Enhancer>) -> Self {
        self.enhancers.push(enhancer);
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn enhance(&self, response: RagResponse) -> RagResponse {
        let started = Instant::now();
        self.events.emit(
            None,
            AgentEvent::RagRequestReceived {
                query: response.request.query.clone(),
                top_k: response.request.top_k,
            },
        );

        let mut current = response;
        for enhancer in &self.enhancers {
            let estimate = enhancer.estimate_impact(&current);

            let quality = current.quality.map(|q| q.overall_score).unwrap_or(0.0);
            if self.config.adaptive
                && quality > self.config.quality_threshold
                && estimate.estimated_latency_ms > self.config.expensive_latency_ms
            {
                tracing::debug!(
                    enhancer = enhancer.name(),
                    quality,
                    estimated_ms = estimate.estimated_latency_ms,
                    "quality already high, skipping expensive enhancer"
                );
                continue;
            }

            if started.elapsed() > current.request.desired_max_latency {
                tracing::debug!(
                    enhancer = enhancer.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "latency budget spent, returning current response"
                );
                break;
            }

            if estimate.recommendation == Recommendation::Skip {
                tracing::debug!(enhancer = enhancer.name(), "enhancer recommends skip");
                continue;
            }

            self.events.emit(
                None,
                AgentEvent::EnhancementStarting {
                    enhancer: enhancer.name().to_string(),
                },
            );
            let step_started = Instant::now();
            let basis = current.clone();
            let tokens_processed = basis.approximate_tokens();

            match enhancer.enhance(current).await {
                Ok(mut next) => {
                    let duration_ms = step_started.elapsed().as_millis() as u64;
                    next.enhancement = Some(EnhancementRecord {
                        enhancer: enhancer.name().to_string(),
                        enhancement_type: enhancer.enhancement_type(),
                        basis: Some(Box::new(basis)),
                        processing_time_ms: duration_ms,
                        tokens_processed,
                    });
                    self.events.emit(
                        None,
                        AgentEvent::EnhancementCompleted {
                            enhancer: enhancer.name().to_string(),
                            duration_ms,
                        },
                    );
                    current = next;
                }
                Err(error) => {
                    let failure = RagError::EnhancerFailed {
                        enhancer: enhancer.name().to_string(),
                        reason: error.to_string(),
                    };
                    tracing::warn!(%failure, "enhancer failed, keeping previous response");
                    current = basis;
                }
            }
        }

        self.events.emit(
            None,
            AgentEvent::RagResponseReturned {
                service: current.service.clone(),
                result_count: current.results.len(),
            },
        );
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhancer::{EnhancementType, ImpactEstimate};
    use crate::{RagRequest, ScoredMatch};
    use anyhow::bail;
    use async_trait::async_trait;
    use std::time::Duration;

    struct TagEnhancer {
        name: String,
        latency_estimate_ms: u64,
        sleep: Duration,
    }

    impl TagEnhancer {
        fn named(name: &str) -> Self {
            Self {
                name: name.into(),
                latency_estimate_ms: 5,
                sleep: Duration::ZERO,
            }
        }

        fn slow(name: &str, sleep: Duration) -> Self {
            Self {
                name: name.into(),
                latency_estimate_ms: 5,
                sleep,
            }
        }

        fn expensive(name: &str, estimate_ms: u64) -> Self {
            Self {
                name: name.into(),
                latency_estimate_ms: estimate_ms,
                sleep: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl Enhancer for TagEnhancer {
        fn name(&self) -> &str {
            &self.name
        }

        fn enhancement_type(&self) -> EnhancementType {
            EnhancementType::Custom
        }

        fn estimate_impact(&self, _response: &RagResponse) -> ImpactEstimate {
            ImpactEstimate {
                expected_quality_gain: 0.1,
                estimated_latency_ms: self.latency_estimate_ms,
                estimated_token_cost: 0,
                recommendation: Recommendation::Apply,
            }
        }

        async fn enhance(&self, response: RagResponse) -> anyhow::Result<RagResponse> {
            tokio::time::sleep(self.sleep).await;
            Ok(response)
        }
    }

    struct FailingEnhancer;

    #[async_trait]
    impl Enhancer for FailingEnhancer {
        fn name(&self) -> &str {
            "faulty"
        }

        fn enhancement_type(&self) -> EnhancementType {
            EnhancementType::Custom
        }

        fn estimate_impact(&self, _response: &RagResponse) -> ImpactEstimate {
            ImpactEstimate {
                expected_quality_gain: 0.5,
                estimated_latency_ms: 1,
                estimated_token_cost: 0,
                recommendation: Recommendation::Apply,
            }
        }

        async fn enhance(&self, _response: RagResponse) -> anyhow::Result<RagResponse> {
            bail!("enhancer exploded")
        }
    }

    fn response(latency: Duration) -> RagResponse {
        RagResponse::new(
            RagRequest::new("query", 3).with_desired_max_latency(latency),
            "test-service",
            vec![ScoredMatch::chunk("a", "text a", 0.9)],
        )
    }

    #[tokio::test]
    async fn applies_enhancers_in_order_and_chains_bases() {
        let pipeline = EnhancementPipeline::new(Arc::new(EventBus::new()))
            .with_enhancer(Arc::new(TagEnhancer::named("first")))
            .with_enhancer(Arc::new(TagEnhancer::named("second")));

        let out = pipeline.enhance(response(Duration::from_secs(5))).await;
        assert_eq!(out.enhancement_chain(), vec!["second", "first"]);
    }

    #[tokio::test]
    async fn latency_budget_breaks_the_pipeline() {
        let pipeline = EnhancementPipeline::new(Arc::new(EventBus::new()))
            .with_enhancer(Arc::new(TagEnhancer::slow(
                "slow",
                Duration::from_millis(80),
            )))
            .with_enhancer(Arc::new(TagEnhancer::named("late")));

        let out = pipeline.enhance(response(Duration::from_millis(30))).await;
        // The slow enhancer ran; by the time `late` was considered, the
        // budget was spent.
        assert_eq!(out.enhancement_chain(), vec!["slow"]);
    }

    #[tokio::test]
    async fn high_quality_skips_expensive_enhancers_only() {
        let pipeline = EnhancementPipeline::new(Arc::new(EventBus::new()))
            .with_enhancer(Arc::new(TagEnhancer::expensive("pricey", 2_000)))
            .with_enhancer(Arc::new(TagEnhancer::named("cheap")));

        let good = response(Duration::from_secs(5)).with_quality(0.9);
        let out = pipeline.enhance(good).await;
        assert_eq!(out.enhancement_chain(), vec!["cheap"]);

        // Low quality: the expensive enhancer is worth it.
        let poor = response(Duration::from_secs(5)).with_quality(0.2);
        let out = pipeline.enhance(poor).await;
        assert_eq!(out.enhancement_chain(), vec!["cheap", "pricey"]);
    }

    #[tokio::test]
    async fn enhancer_failure_keeps_the_previous_response() {
        let pipeline = EnhancementPipeline::new(Arc::new(EventBus::new()))
            .with_enhancer(Arc::new(TagEnhancer::named("before")))
            .with_enhancer(Arc::new(FailingEnhancer))
            .with_enhancer(Arc::new(TagEnhancer::named("after")));

        let out = pipeline.enhance(response(Duration::from_secs(5))).await;
        assert_eq!(out.enhancement_chain(), vec!["after", "before"]);
        assert_eq!(out.results.len(), 1);
    }
}
