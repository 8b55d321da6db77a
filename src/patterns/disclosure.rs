//! Progressive disclosure: gates deeper content tiers on engagement depth.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PatternError;
use crate::journey::{JourneyStep, StepTier, User, Visibility};

use super::Enhancer;
use super::analytics::{CompletionRates, EngagementAnalytics};
use super::tables;

const SYSTEM: &str = "progressive_disclosure";

/// Depth at which extended content opens up.
pub const EXTENDED_THRESHOLD: f64 = 0.6;
/// Depth at which comprehensive content opens up.
pub const COMPREHENSIVE_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSignals {
    pub to_extended: bool,
    pub to_comprehensive: bool,
    pub confidence: f64,
    pub triggers: Vec<String>,
}

/// Content split by tier after visibility rules. Tiers that are not shown are
/// empty rather than present-but-hidden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveDisclosure {
    pub essential_content: Vec<JourneyStep>,
    pub extended_content: Vec<JourneyStep>,
    pub comprehensive_content: Vec<JourneyStep>,
    pub transition_cues: Vec<String>,
}

impl ProgressiveDisclosure {
    /// Whether a step with this id survived the visibility rules.
    pub fn shows(&self, step_id: &str) -> bool {
        self.essential_content
            .iter()
            .chain(&self.extended_content)
            .chain(&self.comprehensive_content)
            .any(|s| s.id == step_id)
    }
}

/// Weighted engagement depth: 0.4 essential + 0.3 extended + 0.3 comprehensive.
pub fn calculate_engagement_depth(rates: &CompletionRates) -> Result<f64, PatternError> {
    let essential = PatternError::check_unit(SYSTEM, "essential_completion", rates.essential)?;
    let extended = PatternError::check_unit(SYSTEM, "extended_completion", rates.extended)?;
    let comprehensive =
        PatternError::check_unit(SYSTEM, "comprehensive_completion", rates.comprehensive)?;
    Ok(essential * 0.4 + extended * 0.3 + comprehensive * 0.3)
}

pub fn generate_transition_signals(depth: f64, persona: &str) -> TransitionSignals {
    TransitionSignals {
        to_extended: depth >= EXTENDED_THRESHOLD,
        to_comprehensive: depth >= COMPREHENSIVE_THRESHOLD,
        confidence: depth,
        triggers: tables::owned(tables::transition_triggers(persona)),
    }
}

/// Mark every step visible when `should_show`, otherwise drop them all.
pub fn apply_visibility_rules(content: Vec<JourneyStep>, should_show: bool) -> Vec<JourneyStep> {
    if !should_show {
        return Vec::new();
    }
    content
        .into_iter()
        .map(|mut step| {
            step.visibility = Visibility::Visible;
            step
        })
        .collect()
}

pub fn generate_transition_cues(signals: &TransitionSignals) -> Vec<String> {
    let mut cues = Vec::new();
    if signals.to_extended {
        cues.push("Ready for more detailed information?".to_string());
        cues.push("Want to explore this topic further?".to_string());
    }
    if signals.to_comprehensive {
        cues.push("Ready for a deep dive into this topic?".to_string());
        cues.push("Want to understand this in detail?".to_string());
    }
    cues
}

fn of_tier(content: &[JourneyStep], tier: StepTier) -> Vec<JourneyStep> {
    content.iter().filter(|s| s.tier == tier).cloned().collect()
}

pub struct ProgressiveDisclosureImpl {
    analytics: Arc<dyn EngagementAnalytics>,
}

impl ProgressiveDisclosureImpl {
    pub fn new(analytics: Arc<dyn EngagementAnalytics>) -> Self {
        Self { analytics }
    }
}

#[async_trait]
impl Enhancer for ProgressiveDisclosureImpl {
    type Output = ProgressiveDisclosure;

    fn name(&self) -> &'static str {
        SYSTEM
    }

    async fn enhance(
        &self,
        user: &User,
        content: &[JourneyStep],
    ) -> Result<ProgressiveDisclosure, PatternError> {
        let rates = self.analytics.completion_rates(user).await?;
        let depth = calculate_engagement_depth(&rates)?;
        let signals = generate_transition_signals(depth, &user.persona);

        debug!(
            user_id = %user.id,
            depth,
            to_extended = signals.to_extended,
            to_comprehensive = signals.to_comprehensive,
            "Computed disclosure signals"
        );

        Ok(ProgressiveDisclosure {
            essential_content: apply_visibility_rules(of_tier(content, StepTier::Essential), true),
            extended_content: apply_visibility_rules(
                of_tier(content, StepTier::Extended),
                signals.to_extended,
            ),
            comprehensive_content: apply_visibility_rules(
                of_tier(content, StepTier::Comprehensive),
                signals.to_comprehensive,
            ),
            transition_cues: generate_transition_cues(&signals),
        })
    }
}
