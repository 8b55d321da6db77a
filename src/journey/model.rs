//! Users, personas and journey steps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of engagement personas.
///
/// Users carry their persona as a string key so that records with unknown
/// keys still flow through the engine; every persona-keyed lookup treats an
/// unrecognized key as "no data".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    HealthAwareAvoider,
    StructuredSystemSeeker,
    BalancedLifeIntegrator,
    HealthcareProfessional,
    OverlookedRiskGroup,
}

impl Persona {
    pub const ALL: [Persona; 5] = [
        Persona::HealthAwareAvoider,
        Persona::StructuredSystemSeeker,
        Persona::BalancedLifeIntegrator,
        Persona::HealthcareProfessional,
        Persona::OverlookedRiskGroup,
    ];

    /// Resolve a persona key. Returns `None` for anything unrecognized.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "health_aware_avoider" => Some(Self::HealthAwareAvoider),
            "structured_system_seeker" => Some(Self::StructuredSystemSeeker),
            "balanced_life_integrator" => Some(Self::BalancedLifeIntegrator),
            "healthcare_professional" | "healthcare_professional_consumer_bridge" => {
                Some(Self::HealthcareProfessional)
            }
            "overlooked_risk_group" => Some(Self::OverlookedRiskGroup),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::HealthAwareAvoider => "health_aware_avoider",
            Self::StructuredSystemSeeker => "structured_system_seeker",
            Self::BalancedLifeIntegrator => "balanced_life_integrator",
            Self::HealthcareProfessional => "healthcare_professional",
            Self::OverlookedRiskGroup => "overlooked_risk_group",
        }
    }

    /// Static engagement profile for this persona.
    pub fn profile(&self) -> EngagementProfile {
        match self {
            Self::HealthcareProfessional => EngagementProfile {
                response_style: "analytical_personal",
                engagement_level: "high",
                trust_building_speed: "moderate",
                clinical_detail: "comprehensive",
                narrative_sharing: "structured",
                question_pattern: "evidence_seeking",
            },
            Self::StructuredSystemSeeker => EngagementProfile {
                response_style: "organized_systematic",
                engagement_level: "high",
                trust_building_speed: "steady",
                clinical_detail: "thorough",
                narrative_sharing: "timeline_focused",
                question_pattern: "planning_oriented",
            },
            Self::HealthAwareAvoider => EngagementProfile {
                response_style: "cautious_gradual",
                engagement_level: "variable",
                trust_building_speed: "slow",
                clinical_detail: "selective",
                narrative_sharing: "hesitant_growing",
                question_pattern: "support_seeking",
            },
            Self::BalancedLifeIntegrator => EngagementProfile {
                response_style: "reflective_holistic",
                engagement_level: "steady",
                trust_building_speed: "moderate",
                clinical_detail: "contextual",
                narrative_sharing: "wisdom_focused",
                question_pattern: "value_alignment",
            },
            Self::OverlookedRiskGroup => EngagementProfile {
                response_style: "learning_engaged",
                engagement_level: "growing",
                trust_building_speed: "accelerating",
                clinical_detail: "educational",
                narrative_sharing: "discovery_focused",
                question_pattern: "validation_seeking",
            },
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// How a persona tends to move through the journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngagementProfile {
    pub response_style: &'static str,
    pub engagement_level: &'static str,
    pub trust_building_speed: &'static str,
    pub clinical_detail: &'static str,
    pub narrative_sharing: &'static str,
    pub question_pattern: &'static str,
}

/// A journey participant. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub persona: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: impl Into<String>, persona: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            persona: persona.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn persona_kind(&self) -> Option<Persona> {
        Persona::from_key(&self.persona)
    }
}

/// Content depth. Ordered from shallowest to deepest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepTier {
    Essential,
    Extended,
    Comprehensive,
}

impl std::fmt::Display for StepTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Essential => "essential",
            Self::Extended => "extended",
            Self::Comprehensive => "comprehensive",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for StepTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "essential" => Ok(Self::Essential),
            "extended" => Ok(Self::Extended),
            "comprehensive" => Ok(Self::Comprehensive),
            other => Err(format!("unknown step tier '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    Hidden,
}

/// One piece of journey content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyStep {
    pub id: String,
    #[serde(rename = "type")]
    pub tier: StepTier,
    pub content: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JourneyStep {
    pub fn new(id: impl Into<String>, tier: StepTier, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            tier,
            content: content.into(),
            visibility: Visibility::Visible,
            created_at: now,
            updated_at: now,
        }
    }
}
