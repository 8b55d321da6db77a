//! Tiered content loading.
//!
//! Essential content is the step's own text and needs no fetch. Deeper tiers
//! come from a [`ContentSource`] and are fetched concurrently.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ContentError;
use crate::journey::{JourneyStep, StepTier};

/// Source of extended and comprehensive content for a step.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the content of `tier` for `step`. Never called for the
    /// essential tier.
    async fn fetch(&self, step: &JourneyStep, tier: StepTier) -> Result<String, ContentError>;
}

/// Content for every tier the step's type calls for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieredContent {
    pub essential: String,
    pub extended: Option<String>,
    pub comprehensive: Option<String>,
}

/// Load the tiers required by `step.tier`. Any failed fetch fails the whole
/// load; a shallower tier is never substituted.
pub async fn load_tiered_content(
    source: &dyn ContentSource,
    step: &JourneyStep,
) -> Result<TieredContent, ContentError> {
    let extended = async {
        if step.tier >= StepTier::Extended {
            source.fetch(step, StepTier::Extended).await.map(Some)
        } else {
            Ok(None)
        }
    };
    let comprehensive = async {
        if step.tier == StepTier::Comprehensive {
            source.fetch(step, StepTier::Comprehensive).await.map(Some)
        } else {
            Ok(None)
        }
    };

    let (extended, comprehensive) = tokio::try_join!(extended, comprehensive)?;
    debug!(
        step_id = %step.id,
        extended = extended.is_some(),
        comprehensive = comprehensive.is_some(),
        "Tiered content loaded"
    );

    Ok(TieredContent {
        essential: step.content.clone(),
        extended,
        comprehensive,
    })
}

/// A stand-in source that derives deeper tiers from the step text after a
/// fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedContentSource {
    pub extended_delay: Duration,
    pub comprehensive_delay: Duration,
}

impl Default for SimulatedContentSource {
    fn default() -> Self {
        Self {
            extended_delay: Duration::from_millis(500),
            comprehensive_delay: Duration::from_millis(800),
        }
    }
}

#[async_trait]
impl ContentSource for SimulatedContentSource {
    async fn fetch(&self, step: &JourneyStep, tier: StepTier) -> Result<String, ContentError> {
        match tier {
            StepTier::Essential => Ok(step.content.clone()),
            StepTier::Extended => {
                tokio::time::sleep(self.extended_delay).await;
                Ok(format!(
                    "{}\n\nExtended content for {}...",
                    step.content, step.tier
                ))
            }
            StepTier::Comprehensive => {
                tokio::time::sleep(self.comprehensive_delay).await;
                Ok(format!(
                    "{}\n\nComprehensive content with detailed information...",
                    step.content
                ))
            }
        }
    }
}
