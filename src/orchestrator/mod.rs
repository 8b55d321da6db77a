//! Journey manager. Fans a step out to the four pattern systems and merges
//! the results.
//!
//! All four `enhance` calls are started together and awaited together, so the
//! latency of one enhancement is the slowest system, not the sum. A failing or
//! slow system never fails the whole call: its slot is filled with a fixed
//! fallback enrichment and the failure is logged.

pub mod merge;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::PatternError;
use crate::journey::{EnhancedStep, JourneyStep, User};
use crate::patterns::{EngagementAnalytics, Enhancer, PatternContext};

pub use merge::{
    EnrichmentReport, EnrichmentSource, PatternMetrics, PatternOutcome, PatternOutcomes,
    merge_enhanced_step,
};

/// Everything one enhancement produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedResult {
    pub enhanced_step: EnhancedStep,
    pub outcomes: PatternOutcomes,
    pub report: EnrichmentReport,
    pub metrics: PatternMetrics,
}

/// Coordinates the four pattern systems.
pub struct JourneyManager {
    patterns: PatternContext,
    pattern_timeout: Duration,
}

impl JourneyManager {
    pub fn new(patterns: PatternContext, pattern_timeout: Duration) -> Self {
        Self {
            patterns,
            pattern_timeout,
        }
    }

    /// Standard wiring over the given analytics port.
    pub fn standard(analytics: Arc<dyn EngagementAnalytics>, config: &EngineConfig) -> Self {
        Self::new(
            PatternContext::standard(analytics, config),
            config.pattern_timeout,
        )
    }

    pub fn patterns(&self) -> &PatternContext {
        &self.patterns
    }

    /// Enhance one step for one user.
    pub async fn enhance_journey_step(&self, step: &JourneyStep, user: &User) -> EnhancedResult {
        let content = std::slice::from_ref(step);
        let timeout = self.pattern_timeout;

        let (value, disclosure, emotional, persona) = tokio::join!(
            guarded(self.patterns.value.as_ref(), timeout, user, content),
            guarded(self.patterns.disclosure.as_ref(), timeout, user, content),
            guarded(self.patterns.emotional.as_ref(), timeout, user, content),
            guarded(self.patterns.persona.as_ref(), timeout, user, content),
        );

        let outcomes = PatternOutcomes {
            value: PatternOutcome::from_result(value),
            disclosure: PatternOutcome::from_result(disclosure),
            emotional: PatternOutcome::from_result(emotional),
            persona: PatternOutcome::from_result(persona),
        };

        let (enhanced_step, report) = merge_enhanced_step(step, &outcomes);
        let metrics = PatternMetrics::from_merge(&enhanced_step, &report);

        debug!(
            step_id = %step.id,
            user_id = %user.id,
            value = ?report.value,
            disclosure = ?report.disclosure,
            emotional = ?report.emotional,
            persona = ?report.persona,
            "Journey step enhanced"
        );

        EnhancedResult {
            enhanced_step,
            outcomes,
            report,
            metrics,
        }
    }
}

/// Run one system under the timeout, logging any failure.
async fn guarded<E>(
    system: &E,
    timeout: Duration,
    user: &User,
    content: &[JourneyStep],
) -> Result<E::Output, PatternError>
where
    E: Enhancer + ?Sized,
{
    let result = with_timeout(system.name(), timeout, system.enhance(user, content)).await;
    if let Err(ref e) = result {
        warn!(
            system = system.name(),
            user_id = %user.id,
            error = %e,
            "Pattern system failed, using fallback enrichment"
        );
    }
    result
}

/// Map an elapsed timeout to `PatternError::Timeout`.
pub async fn with_timeout<T>(
    system: &'static str,
    after: Duration,
    fut: impl Future<Output = Result<T, PatternError>>,
) -> Result<T, PatternError> {
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(PatternError::Timeout { system, after }),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::journey::{AdaptationApproach, StepTier};
    use crate::patterns::{EmotionalScaffolding, StaticAnalytics, ValueArticulation};

    fn config() -> EngineConfig {
        EngineConfig {
            message_seed: Some(3),
            ..EngineConfig::default()
        }
    }

    struct NeverEnds;

    #[async_trait]
    impl Enhancer for NeverEnds {
        type Output = ValueArticulation;

        fn name(&self) -> &'static str {
            "value_articulation"
        }

        async fn enhance(
            &self,
            _user: &User,
            _content: &[JourneyStep],
        ) -> Result<ValueArticulation, PatternError> {
            std::future::pending().await
        }
    }

    struct Broken;

    #[async_trait]
    impl Enhancer for Broken {
        type Output = EmotionalScaffolding;

        fn name(&self) -> &'static str {
            "emotional_scaffolding"
        }

        async fn enhance(
            &self,
            _user: &User,
            _content: &[JourneyStep],
        ) -> Result<EmotionalScaffolding, PatternError> {
            Err(PatternError::validation(self.name(), "intensity", "out of range"))
        }
    }

    #[tokio::test]
    async fn standard_enhancement_enriches_all_four() {
        let manager = JourneyManager::standard(Arc::new(StaticAnalytics::default()), &config());
        let step = JourneyStep::new("s1", StepTier::Essential, "Welcome");
        let user = User::new("u1", "structured_system_seeker", "u1@example.com");

        let result = manager.enhance_journey_step(&step, &user).await;
        assert_eq!(result.report.value, EnrichmentSource::Enriched);
        assert_eq!(result.report.disclosure, EnrichmentSource::Enriched);
        assert_eq!(result.report.emotional, EnrichmentSource::Enriched);
        assert_eq!(result.report.persona, EnrichmentSource::Enriched);

        let persona = result.enhanced_step.persona_components.unwrap();
        assert_eq!(persona.approach, AdaptationApproach::Direct);
        let disclosure = result.enhanced_step.disclosure_components.unwrap();
        assert!(disclosure.visibility_rules.is_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_system_times_out_into_fallback() {
        let patterns = PatternContext::standard(Arc::new(StaticAnalytics::default()), &config())
            .with_value(Arc::new(NeverEnds));
        let manager = JourneyManager::new(patterns, Duration::from_millis(50));
        let step = JourneyStep::new("s1", StepTier::Essential, "sleep");
        let user = User::new("u1", "health_aware_avoider", "u1@example.com");

        let result = manager.enhance_journey_step(&step, &user).await;
        assert!(result.outcomes.value.is_fallback());
        assert_eq!(
            result.enhanced_step.value_components.unwrap().preview.as_deref(),
            Some("Learn about sleep")
        );
        assert_eq!(result.report.persona, EnrichmentSource::Enriched);
    }

    #[tokio::test]
    async fn validation_failure_only_affects_its_system() {
        let patterns = PatternContext::standard(Arc::new(StaticAnalytics::default()), &config())
            .with_emotional(Arc::new(Broken));
        let manager = JourneyManager::new(patterns, Duration::from_secs(1));
        let step = JourneyStep::new("s1", StepTier::Essential, "x");
        let user = User::new("u1", "health_aware_avoider", "u1@example.com");

        let result = manager.enhance_journey_step(&step, &user).await;
        assert_eq!(result.report.emotional, EnrichmentSource::Fallback);
        assert_eq!(result.report.value, EnrichmentSource::Enriched);
        assert_eq!(result.metrics.emotional_scaffolding, PatternMetrics::FALLBACK.emotional_scaffolding);
        match &result.outcomes.emotional {
            PatternOutcome::Fallback { reason } => assert!(reason.contains("intensity")),
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unwired_analytics_falls_back_for_dependent_systems() {
        struct Unwired;
        impl EngagementAnalytics for Unwired {}

        let manager = JourneyManager::standard(Arc::new(Unwired), &config());
        let step = JourneyStep::new("s1", StepTier::Extended, "x");
        let user = User::new("u1", "balanced_life_integrator", "u1@example.com");

        let result = manager.enhance_journey_step(&step, &user).await;
        assert_eq!(result.report.disclosure, EnrichmentSource::Fallback);
        assert_eq!(result.report.emotional, EnrichmentSource::Fallback);
        assert_eq!(result.report.value, EnrichmentSource::Enriched);
        assert_eq!(result.report.persona, EnrichmentSource::Enriched);
    }
}
