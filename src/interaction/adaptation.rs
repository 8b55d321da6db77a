//! Step transforms driven by the classified interaction pattern.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::InteractionPattern;
use crate::journey::{EmotionalSupport, EnhancedStep, SupportType};

const SCANNING_LINES: usize = 3;
const DEEP_ENGAGEMENT_SUFFIX: &str = "\n\nAdditional insights and detailed information...";
const DEEP_ENGAGEMENT_CONTEXT: &str =
    "Here are some additional insights to deepen your understanding...";
const HESITATION_MESSAGE: &str =
    "Take your time to understand this information. We're here to help guide you through it.";

/// Which transform was applied to the base step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptedPattern {
    Scanning,
    DeepEngagement,
    Hesitation,
}

impl fmt::Display for AdaptedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scanning => write!(f, "scanning"),
            Self::DeepEngagement => write!(f, "deep_engagement"),
            Self::Hesitation => write!(f, "hesitation"),
        }
    }
}

/// Shorten content to its first lines and drop secondary value text.
pub fn simplify(step: &EnhancedStep) -> EnhancedStep {
    let mut out = step.clone();
    out.step.content = step
        .step
        .content
        .split('\n')
        .take(SCANNING_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    if let Some(value) = out.value_components.as_mut() {
        value.preview = value.preview.as_deref().map(first_sentence);
        value.contextual = None;
    }
    out
}

/// Append depth to the content and, when value text exists, extra context.
pub fn enrich(step: &EnhancedStep) -> EnhancedStep {
    let mut out = step.clone();
    out.step.content.push_str(DEEP_ENGAGEMENT_SUFFIX);
    if let Some(value) = out.value_components.as_mut() {
        value.contextual = Some(DEEP_ENGAGEMENT_CONTEXT.to_string());
    }
    out
}

/// Replace emotional support with strong guidance.
pub fn add_guidance(step: &EnhancedStep) -> EnhancedStep {
    let mut out = step.clone();
    out.emotional_components = Some(EmotionalSupport {
        support_type: SupportType::Guidance,
        intensity: 0.8,
        message: HESITATION_MESSAGE.to_string(),
    });
    out
}

/// Apply at most one transform to `base`: scanning, then deep engagement,
/// then hesitation. Returns `None` when no pattern is present.
pub fn adapt_step(
    base: &EnhancedStep,
    pattern: InteractionPattern,
) -> Option<(EnhancedStep, AdaptedPattern)> {
    if pattern.scanning {
        Some((simplify(base), AdaptedPattern::Scanning))
    } else if pattern.deep_engagement {
        Some((enrich(base), AdaptedPattern::DeepEngagement))
    } else if pattern.hesitation {
        Some((add_guidance(base), AdaptedPattern::Hesitation))
    } else {
        None
    }
}

fn first_sentence(text: &str) -> String {
    let head = text.split('.').next().unwrap_or_default();
    format!("{head}.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::{JourneyStep, StepTier, ValueComponents};

    fn base() -> EnhancedStep {
        let step = JourneyStep::new("s1", StepTier::Essential, "one\ntwo\nthree\nfour\nfive");
        let mut enhanced = EnhancedStep::bare(step);
        enhanced.value_components = Some(ValueComponents {
            preview: Some("Here's what you'll learn: a, b. And more.".to_string()),
            confirmation: Some("Great job!".to_string()),
            contextual: Some("context".to_string()),
        });
        enhanced
    }

    #[test]
    fn simplify_keeps_three_lines_and_first_sentence() {
        let simplified = simplify(&base());
        assert_eq!(simplified.step.content, "one\ntwo\nthree");
        let value = simplified.value_components.unwrap();
        assert_eq!(value.preview.as_deref(), Some("Here's what you'll learn: a, b."));
        assert_eq!(value.confirmation.as_deref(), Some("Great job!"));
        assert!(value.contextual.is_none());
    }

    #[test]
    fn simplify_leaves_short_content_alone() {
        let mut step = base();
        step.step.content = "short".to_string();
        step.value_components = None;
        let simplified = simplify(&step);
        assert_eq!(simplified.step.content, "short");
        assert!(simplified.value_components.is_none());
    }

    #[test]
    fn enrich_sets_context_only_with_value_components() {
        let enriched = enrich(&base());
        assert!(enriched.step.content.ends_with(DEEP_ENGAGEMENT_SUFFIX));
        assert_eq!(
            enriched.value_components.unwrap().contextual.as_deref(),
            Some(DEEP_ENGAGEMENT_CONTEXT)
        );

        let mut bare = base();
        bare.value_components = None;
        assert!(enrich(&bare).value_components.is_none());
    }

    #[test]
    fn guidance_replaces_emotional_support() {
        let guided = add_guidance(&base());
        let support = guided.emotional_components.unwrap();
        assert_eq!(support.support_type, SupportType::Guidance);
        assert_eq!(support.intensity, 0.8);
        assert_eq!(support.message, HESITATION_MESSAGE);
    }

    #[test]
    fn scanning_wins_over_other_patterns() {
        let pattern = InteractionPattern {
            scanning: true,
            deep_engagement: true,
            hesitation: true,
        };
        let (_, applied) = adapt_step(&base(), pattern).unwrap();
        assert_eq!(applied, AdaptedPattern::Scanning);

        let pattern = InteractionPattern {
            scanning: false,
            deep_engagement: true,
            hesitation: true,
        };
        let (_, applied) = adapt_step(&base(), pattern).unwrap();
        assert_eq!(applied, AdaptedPattern::DeepEngagement);
    }

    #[test]
    fn no_pattern_means_no_adaptation() {
        assert!(adapt_step(&base(), InteractionPattern::default()).is_none());
    }

    #[test]
    fn repeated_adaptation_does_not_accumulate() {
        let pattern = InteractionPattern {
            deep_engagement: true,
            ..InteractionPattern::default()
        };
        let step = base();
        let (first, _) = adapt_step(&step, pattern).unwrap();
        let (second, _) = adapt_step(&step, pattern).unwrap();
        assert_eq!(first, second);
    }
}
