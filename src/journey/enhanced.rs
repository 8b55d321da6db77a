//! A journey step with the enrichment produced by the pattern systems.

use serde::{Deserialize, Serialize};

use super::model::JourneyStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportType {
    Reassurance,
    Encouragement,
    Guidance,
}

impl std::fmt::Display for SupportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reassurance => write!(f, "reassurance"),
            Self::Encouragement => write!(f, "encouragement"),
            Self::Guidance => write!(f, "guidance"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationApproach {
    Direct,
    Indirect,
    Supportive,
}

impl std::fmt::Display for AdaptationApproach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Indirect => write!(f, "indirect"),
            Self::Supportive => write!(f, "supportive"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueComponents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contextual: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalSupport {
    #[serde(rename = "type")]
    pub support_type: SupportType,
    /// In `[0, 1]`.
    pub intensity: f64,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityRules {
    pub is_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisclosureComponents {
    pub visibility_rules: VisibilityRules,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transition_cues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaComponents {
    pub approach: AdaptationApproach,
    /// In `[0, 1]`.
    pub intensity: f64,
    pub adaptations: Vec<String>,
}

/// A journey step plus up to four independent enrichments.
///
/// A `None` enrichment means the corresponding pattern declined to enrich the
/// step; it is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedStep {
    #[serde(flatten)]
    pub step: JourneyStep,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_components: Option<ValueComponents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_components: Option<EmotionalSupport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclosure_components: Option<DisclosureComponents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_components: Option<PersonaComponents>,
}

impl EnhancedStep {
    /// A step with no enrichment at all.
    pub fn bare(step: JourneyStep) -> Self {
        Self {
            step,
            value_components: None,
            emotional_components: None,
            disclosure_components: None,
            persona_components: None,
        }
    }
}

/// Per-content-item emotional scaffolding as attached by the emotional pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportedStep {
    pub step: JourneyStep,
    pub emotional_support: EmotionalSupport,
}

/// Per-content-item persona adaptation as attached by the persona pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptedStep {
    pub step: JourneyStep,
    pub persona_adaptation: PersonaComponents,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::model::StepTier;

    #[test]
    fn bare_step_serializes_without_enrichment() {
        let enhanced = EnhancedStep::bare(JourneyStep::new("s1", StepTier::Essential, "Hi"));
        let json = serde_json::to_value(&enhanced).unwrap();
        assert_eq!(json["id"], "s1");
        assert_eq!(json["type"], "essential");
        assert!(json.get("value_components").is_none());
        assert!(json.get("persona_components").is_none());
    }

    #[test]
    fn emotional_support_uses_type_tag() {
        let support = EmotionalSupport {
            support_type: SupportType::Guidance,
            intensity: 0.8,
            message: "m".into(),
        };
        let json = serde_json::to_value(&support).unwrap();
        assert_eq!(json["type"], "guidance");
    }
}
