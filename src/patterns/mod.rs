//! Engagement pattern systems.
//!
//! Four independent enrichment pipelines share one capability contract,
//! [`Enhancer`]. Each pipeline is a fixed sequence of sub-steps implemented as
//! free functions in its module; the `*Impl` types only wire those sub-steps
//! to their collaborators.
//!
//! - `value`: value articulation (preview / confirmation / context)
//! - `disclosure`: progressive disclosure (tier gating + transition cues)
//! - `emotional`: emotional scaffolding (support type, intensity, message)
//! - `persona`: persona adaptation (approach, intensity, adaptations)

pub mod analytics;
pub mod disclosure;
pub mod emotional;
pub mod messages;
pub mod persona;
pub mod tables;
pub mod value;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::EngineConfig;
use crate::error::PatternError;
use crate::journey::{JourneyStep, User};

pub use analytics::{CompletionRates, EmotionalState, EngagementAnalytics, StaticAnalytics};
pub use disclosure::{ProgressiveDisclosure, ProgressiveDisclosureImpl, TransitionSignals};
pub use emotional::{EmotionalScaffolding, EmotionalScaffoldingImpl, SupportiveContext};
pub use messages::{MessagePicker, select_message};
pub use persona::{AdaptationStrategy, PersonaAdaptation, PersonaAdaptationImpl, PersonaProfile};
pub use value::{PersonalizedValue, ValueArticulation, ValueArticulationImpl};

/// One pattern system: a single public entry point over a fixed pipeline.
#[async_trait]
pub trait Enhancer: Send + Sync {
    type Output: Send;

    /// Stable system name, used in logs and errors.
    fn name(&self) -> &'static str;

    async fn enhance(
        &self,
        user: &User,
        content: &[JourneyStep],
    ) -> Result<Self::Output, PatternError>;
}

pub type ValueEnhancer = Arc<dyn Enhancer<Output = ValueArticulation>>;
pub type DisclosureEnhancer = Arc<dyn Enhancer<Output = ProgressiveDisclosure>>;
pub type EmotionalEnhancer = Arc<dyn Enhancer<Output = EmotionalScaffolding>>;
pub type PersonaEnhancer = Arc<dyn Enhancer<Output = PersonaAdaptation>>;

/// The four pattern systems, constructed once and shared.
#[derive(Clone)]
pub struct PatternContext {
    pub value: ValueEnhancer,
    pub disclosure: DisclosureEnhancer,
    pub emotional: EmotionalEnhancer,
    pub persona: PersonaEnhancer,
}

impl PatternContext {
    /// The production wiring: all four implementations over one analytics port.
    pub fn standard(analytics: Arc<dyn EngagementAnalytics>, config: &EngineConfig) -> Self {
        Self {
            value: Arc::new(ValueArticulationImpl::new()),
            disclosure: Arc::new(ProgressiveDisclosureImpl::new(Arc::clone(&analytics))),
            emotional: Arc::new(EmotionalScaffoldingImpl::new(
                analytics,
                MessagePicker::new(config.message_seed),
            )),
            persona: Arc::new(PersonaAdaptationImpl::new()),
        }
    }

    pub fn with_value(mut self, value: ValueEnhancer) -> Self {
        self.value = value;
        self
    }

    pub fn with_disclosure(mut self, disclosure: DisclosureEnhancer) -> Self {
        self.disclosure = disclosure;
        self
    }

    pub fn with_emotional(mut self, emotional: EmotionalEnhancer) -> Self {
        self.emotional = emotional;
        self
    }

    pub fn with_persona(mut self, persona: PersonaEnhancer) -> Self {
        self.persona = persona;
        self
    }
}
