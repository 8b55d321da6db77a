//! Emotional scaffolding: attaches supportive framing to content.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::journey::{EmotionalSupport, JourneyStep, SupportType, SupportedStep, User};

use super::Enhancer;
use super::analytics::{EmotionalState, EngagementAnalytics};
use super::messages::MessagePicker;
use super::tables;

const SYSTEM: &str = "emotional_scaffolding";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportiveContext {
    pub support_type: SupportType,
    pub intensity: f64,
    /// Persona-specific framing hints.
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalScaffolding {
    pub supported_content: Vec<SupportedStep>,
    pub motivation_triggers: Vec<String>,
}

pub fn assess_emotional_state(state: EmotionalState) -> Result<EmotionalState, PatternError> {
    PatternError::check_unit(SYSTEM, "anxiety", state.anxiety)?;
    PatternError::check_unit(SYSTEM, "curiosity", state.curiosity)?;
    PatternError::check_unit(SYSTEM, "motivation", state.motivation)?;
    PatternError::check_unit(SYSTEM, "confidence", state.confidence)?;
    Ok(state)
}

/// Anxiety wins over low motivation; guidance is the default.
pub fn determine_support_type(state: &EmotionalState) -> SupportType {
    if state.anxiety > 0.7 {
        SupportType::Reassurance
    } else if state.motivation < 0.5 {
        SupportType::Encouragement
    } else {
        SupportType::Guidance
    }
}

pub fn calculate_support_intensity(state: &EmotionalState) -> f64 {
    (state.anxiety * 0.4)
        .max((1.0 - state.motivation) * 0.3)
        .max(state.curiosity * 0.3)
}

pub fn generate_supportive_context(
    state: &EmotionalState,
    persona: &str,
) -> Result<SupportiveContext, PatternError> {
    let intensity =
        PatternError::check_unit(SYSTEM, "intensity", calculate_support_intensity(state))?;
    Ok(SupportiveContext {
        support_type: determine_support_type(state),
        intensity,
        triggers: tables::owned(tables::support_triggers(persona)),
    })
}

pub fn apply_emotional_scaffolding(
    content: &[JourneyStep],
    context: &SupportiveContext,
    picker: &MessagePicker,
) -> Vec<SupportedStep> {
    content
        .iter()
        .map(|step| SupportedStep {
            step: step.clone(),
            emotional_support: EmotionalSupport {
                support_type: context.support_type,
                intensity: context.intensity,
                message: picker.pick(context.support_type),
            },
        })
        .collect()
}

pub fn generate_motivation_triggers(state: &EmotionalState, _persona: &str) -> Vec<String> {
    let mut triggers = Vec::new();
    if state.motivation < 0.6 {
        triggers.push("You're making great progress!".to_string());
        triggers.push("Let's build on what you've learned!".to_string());
    }
    if state.curiosity > 0.8 {
        triggers.push("Want to explore this further?".to_string());
        triggers.push("Here's something interesting to consider...".to_string());
    }
    triggers
}

pub struct EmotionalScaffoldingImpl {
    analytics: Arc<dyn EngagementAnalytics>,
    picker: MessagePicker,
}

impl EmotionalScaffoldingImpl {
    pub fn new(analytics: Arc<dyn EngagementAnalytics>, picker: MessagePicker) -> Self {
        Self { analytics, picker }
    }
}

#[async_trait]
impl Enhancer for EmotionalScaffoldingImpl {
    type Output = EmotionalScaffolding;

    fn name(&self) -> &'static str {
        SYSTEM
    }

    async fn enhance(
        &self,
        user: &User,
        content: &[JourneyStep],
    ) -> Result<EmotionalScaffolding, PatternError> {
        let state = assess_emotional_state(self.analytics.emotional_state(user).await?)?;
        let context = generate_supportive_context(&state, &user.persona)?;
        let supported_content = apply_emotional_scaffolding(content, &context, &self.picker);
        let motivation_triggers = generate_motivation_triggers(&state, &user.persona);

        Ok(EmotionalScaffolding {
            supported_content,
            motivation_triggers,
        })
    }
}
