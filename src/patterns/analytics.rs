//! Analytics port: supplies the numeric inputs the pattern systems consume.
//!
//! The engine does not infer anything itself; completion rates and emotional
//! state come from whatever implements [`EngagementAnalytics`]. Methods that an
//! implementation does not provide report `NotImplemented`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::journey::User;

/// Completion rates per content tier, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionRates {
    pub essential: f64,
    pub extended: f64,
    pub comprehensive: f64,
}

/// Estimated emotional state, each dimension in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalState {
    pub anxiety: f64,
    pub curiosity: f64,
    pub motivation: f64,
    pub confidence: f64,
}

#[async_trait]
pub trait EngagementAnalytics: Send + Sync {
    async fn completion_rates(&self, _user: &User) -> Result<CompletionRates, PatternError> {
        Err(PatternError::not_implemented(
            "progressive_disclosure",
            "calculate_engagement_depth",
        ))
    }

    async fn emotional_state(&self, _user: &User) -> Result<EmotionalState, PatternError> {
        Err(PatternError::not_implemented(
            "emotional_scaffolding",
            "assess_emotional_state",
        ))
    }
}

/// Fixed stand-in values used until real analytics are wired up.
#[derive(Debug, Clone, Copy)]
pub struct StaticAnalytics {
    pub completion: CompletionRates,
    pub emotion: EmotionalState,
}

impl Default for StaticAnalytics {
    fn default() -> Self {
        Self {
            completion: CompletionRates {
                essential: 0.8,
                extended: 0.6,
                comprehensive: 0.4,
            },
            emotion: EmotionalState {
                anxiety: 0.5,
                curiosity: 0.7,
                motivation: 0.6,
                confidence: 0.5,
            },
        }
    }
}

#[async_trait]
impl EngagementAnalytics for StaticAnalytics {
    async fn completion_rates(&self, _user: &User) -> Result<CompletionRates, PatternError> {
        Ok(self.completion)
    }

    async fn emotional_state(&self, _user: &User) -> Result<EmotionalState, PatternError> {
        Ok(self.emotion)
    }
}
