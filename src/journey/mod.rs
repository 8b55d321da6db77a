//! Journey domain types shared by every adaptation pass.

pub mod enhanced;
pub mod model;

pub use enhanced::{
    AdaptationApproach, AdaptedStep, DisclosureComponents, EmotionalSupport, EnhancedStep,
    PersonaComponents, SupportType, SupportedStep, ValueComponents, VisibilityRules,
};
pub use model::{EngagementProfile, JourneyStep, Persona, StepTier, User, Visibility};
