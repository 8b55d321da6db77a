//! Merging the four pattern outputs into one enhanced step.
//!
//! Merging is a pure function of the four outcomes; the order in which the
//! systems finished has no influence on the result.

use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::journey::{
    AdaptationApproach, DisclosureComponents, EmotionalSupport, EnhancedStep, JourneyStep,
    PersonaComponents, SupportType, ValueComponents, VisibilityRules,
};
use crate::patterns::{
    EmotionalScaffolding, PersonaAdaptation, ProgressiveDisclosure, ValueArticulation,
};

/// What one pattern system contributed to a merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PatternOutcome<T> {
    /// The system ran and produced output.
    Enriched { output: T },
    /// The system failed; a fixed fallback enrichment stands in for it.
    Fallback { reason: String },
}

impl<T> PatternOutcome<T> {
    pub fn from_result(result: Result<T, PatternError>) -> Self {
        match result {
            Ok(output) => Self::Enriched { output },
            Err(e) => Self::Fallback {
                reason: e.to_string(),
            },
        }
    }

    pub fn output(&self) -> Option<&T> {
        match self {
            Self::Enriched { output } => Some(output),
            Self::Fallback { .. } => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Whether a merged enrichment field came from real output, was declined, or
/// was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentSource {
    Enriched,
    Declined,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentReport {
    pub value: EnrichmentSource,
    pub disclosure: EnrichmentSource,
    pub emotional: EnrichmentSource,
    pub persona: EnrichmentSource,
}

/// The raw outputs of one fan-out, keyed by system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternOutcomes {
    pub value: PatternOutcome<ValueArticulation>,
    pub disclosure: PatternOutcome<ProgressiveDisclosure>,
    pub emotional: PatternOutcome<EmotionalScaffolding>,
    pub persona: PatternOutcome<PersonaAdaptation>,
}

/// Rough per-pattern effectiveness scores for the rendered step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternMetrics {
    pub value_articulation: f64,
    pub emotional_scaffolding: f64,
    pub progressive_disclosure: f64,
    pub persona_alignment: f64,
}

impl PatternMetrics {
    /// Scores used when every system had to fall back.
    pub const FALLBACK: PatternMetrics = PatternMetrics {
        value_articulation: 0.5,
        emotional_scaffolding: 0.4,
        progressive_disclosure: 0.3,
        persona_alignment: 0.5,
    };

    pub fn for_step(step: &EnhancedStep) -> Self {
        let has_preview = step
            .value_components
            .as_ref()
            .is_some_and(|v| v.preview.is_some());
        let visible = step
            .disclosure_components
            .as_ref()
            .is_some_and(|d| d.visibility_rules.is_visible);
        Self {
            value_articulation: if has_preview { 0.8 } else { 0.5 },
            emotional_scaffolding: if step.emotional_components.is_some() { 0.7 } else { 0.4 },
            progressive_disclosure: if visible { 0.9 } else { 0.3 },
            persona_alignment: if step.persona_components.is_some() { 0.8 } else { 0.5 },
        }
    }

    /// Scores for a merged step; substituted enrichments score as fallbacks.
    pub fn from_merge(step: &EnhancedStep, report: &EnrichmentReport) -> Self {
        let mut metrics = Self::for_step(step);
        let fallback = EnrichmentSource::Fallback;
        if report.value == fallback {
            metrics.value_articulation = Self::FALLBACK.value_articulation;
        }
        if report.emotional == fallback {
            metrics.emotional_scaffolding = Self::FALLBACK.emotional_scaffolding;
        }
        if report.disclosure == fallback {
            metrics.progressive_disclosure = Self::FALLBACK.progressive_disclosure;
        }
        if report.persona == fallback {
            metrics.persona_alignment = Self::FALLBACK.persona_alignment;
        }
        metrics
    }
}

// ── Fallbacks ───────────────────────────────────────────────────────

pub fn fallback_value_components(step: &JourneyStep) -> ValueComponents {
    ValueComponents {
        preview: Some(format!("Learn about {}", step.content)),
        confirmation: Some("Great job completing this step!".to_string()),
        contextual: Some("This knowledge will help you in your journey.".to_string()),
    }
}

pub fn fallback_emotional_components() -> EmotionalSupport {
    EmotionalSupport {
        support_type: SupportType::Encouragement,
        intensity: 0.5,
        message: "You're doing great! Keep going!".to_string(),
    }
}

pub fn fallback_persona_components() -> PersonaComponents {
    PersonaComponents {
        approach: AdaptationApproach::Supportive,
        intensity: 0.5,
        adaptations: vec!["Take your time to understand this information.".to_string()],
    }
}

pub fn fallback_disclosure_components() -> DisclosureComponents {
    DisclosureComponents {
        visibility_rules: VisibilityRules { is_visible: true },
        transition_cues: Vec::new(),
    }
}

// ── Merge ───────────────────────────────────────────────────────────

/// Merge the four outcomes onto `step`.
pub fn merge_enhanced_step(
    step: &JourneyStep,
    outcomes: &PatternOutcomes,
) -> (EnhancedStep, EnrichmentReport) {
    let (value_components, value) = match &outcomes.value {
        PatternOutcome::Enriched { output } => (
            Some(ValueComponents {
                preview: Some(output.preview.clone()),
                confirmation: Some(output.confirmation.clone()),
                contextual: Some(output.context.clone()),
            }),
            EnrichmentSource::Enriched,
        ),
        PatternOutcome::Fallback { .. } => (
            Some(fallback_value_components(step)),
            EnrichmentSource::Fallback,
        ),
    };

    let (emotional_components, emotional) = match &outcomes.emotional {
        PatternOutcome::Enriched { output } => match output.supported_content.first() {
            Some(item) => (
                Some(item.emotional_support.clone()),
                EnrichmentSource::Enriched,
            ),
            None => (None, EnrichmentSource::Declined),
        },
        PatternOutcome::Fallback { .. } => (
            Some(fallback_emotional_components()),
            EnrichmentSource::Fallback,
        ),
    };

    let (persona_components, persona) = match &outcomes.persona {
        PatternOutcome::Enriched { output } => match output.adapted_content.first() {
            Some(item) => (
                Some(item.persona_adaptation.clone()),
                EnrichmentSource::Enriched,
            ),
            None => (None, EnrichmentSource::Declined),
        },
        PatternOutcome::Fallback { .. } => (
            Some(fallback_persona_components()),
            EnrichmentSource::Fallback,
        ),
    };

    let (disclosure_components, disclosure) = match &outcomes.disclosure {
        PatternOutcome::Enriched { output } => (
            Some(DisclosureComponents {
                visibility_rules: VisibilityRules {
                    is_visible: output.shows(&step.id),
                },
                transition_cues: output.transition_cues.clone(),
            }),
            EnrichmentSource::Enriched,
        ),
        PatternOutcome::Fallback { .. } => (
            Some(fallback_disclosure_components()),
            EnrichmentSource::Fallback,
        ),
    };

    let enhanced = EnhancedStep {
        step: step.clone(),
        value_components,
        emotional_components,
        disclosure_components,
        persona_components,
    };
    let report = EnrichmentReport {
        value,
        disclosure,
        emotional,
        persona,
    };
    (enhanced, report)
}
