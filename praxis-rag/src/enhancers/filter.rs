//! Score-floor filtering.

use crate::enhancer::{Enhancer, EnhancementType, ImpactEstimate, Recommendation};
use crate::RagResponse;
use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug)]
pub struct ScoreFilterEnhancer {
    pub min_score: f64,
}

impl ScoreFilterEnhancer {
    pub fn new(min_score: f64) -> Self {
        Self { min_score }
    }
}

impl Default for ScoreFilterEnhancer {
    fn default() -> Self {
        Self::new(0.25)
    }
}

#[async_trait]
impl Enhancer for ScoreFilterEnhancer {
    fn name(&self) -> &str {
        "score-filter"
    }

    fn enhancement_type(&self) -> EnhancementType {
        EnhancementType::Filtering
    }

    fn estimate_impact(&self, response: &RagResponse) -> ImpactEstimate {
        let below = response
            .results
            .iter()
            .filter(|r| r.score < self.min_score)
            .count();
        ImpactEstimate {
            expected_quality_gain: 0.02 * below as f64,
            estimated_latency_ms: 1,
            estimated_token_cost: 0,
            // Cheap either way; Conditional lets it run even when there is
            // currently nothing to drop.
            recommendation: if below > 0 {
                Recommendation::Apply
            } else {
                Recommendation::Conditional
            },
        }
    }

    async fn enhance(&self, mut response: RagResponse) -> Result<RagResponse> {
        response.results.retain(|r| r.score >= self.min_score);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RagRequest, ScoredMatch};

    #[tokio::test]
    async fn drops_below_floor_preserving_order() {
        let response = RagResponse::new(
            RagRequest::new("q", 5),
            "svc",
            vec![
                ScoredMatch::chunk("a", "ok", 0.9),
                ScoredMatch::chunk("b", "weak", 0.1),
                ScoredMatch::chunk("c", "fine", 0.5),
            ],
        );
        let out = ScoreFilterEnhancer::new(0.3).enhance(response).await.unwrap();
        assert_eq!(out.result_ids(), vec!["a", "c"]);
    }

    #[test]
    fn estimate_is_apply_or_conditional_never_skip() {
        let weak = RagResponse::new(
            RagRequest::new("q", 5),
            "svc",
            vec![ScoredMatch::chunk("a", "t", 0.1)],
        );
        let strong = RagResponse::new(
            RagRequest::new("q", 5),
            "svc",
            vec![ScoredMatch::chunk("a", "t", 0.9)],
        );
        let filter = ScoreFilterEnhancer::default();
        assert_eq!(
            filter.estimate_impact(&weak).recommendation,
            Recommendation::Apply
        );
        assert_eq!(
            filter.estimate_impact(&strong).recommendation,
            Recommendation::Conditional
        );
    }
}
