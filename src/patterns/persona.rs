//! Persona adaptation: shapes tone and framing around the persona profile.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::journey::{AdaptationApproach, AdaptedStep, JourneyStep, PersonaComponents, User};

use super::Enhancer;
use super::tables;

const SYSTEM: &str = "persona_adaptation";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaProfile {
    pub traits: Vec<String>,
    pub preferences: Vec<String>,
    pub needs: Vec<String>,
    pub goals: Vec<String>,
}

impl PersonaProfile {
    fn has(list: &[String], item: &str) -> bool {
        list.iter().any(|s| s == item)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationStrategy {
    pub approach: AdaptationApproach,
    pub intensity: f64,
    pub focus: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaAdaptation {
    pub adapted_content: Vec<AdaptedStep>,
    pub persona_insights: Vec<String>,
}

pub fn analyze_persona_profile(user: &User) -> PersonaProfile {
    PersonaProfile {
        traits: tables::owned(tables::traits(&user.persona)),
        preferences: tables::owned(tables::preferences(&user.persona)),
        needs: tables::owned(tables::needs(&user.persona)),
        goals: tables::owned(tables::goals(&user.persona)),
    }
}

pub fn determine_approach(profile: &PersonaProfile) -> AdaptationApproach {
    if PersonaProfile::has(&profile.traits, "analytical") {
        AdaptationApproach::Direct
    } else if PersonaProfile::has(&profile.needs, "support") {
        AdaptationApproach::Supportive
    } else {
        AdaptationApproach::Indirect
    }
}

pub fn calculate_intensity(profile: &PersonaProfile) -> f64 {
    ((profile.needs.len() + profile.preferences.len()) as f64 / 6.0).min(1.0)
}

pub fn generate_adaptation_strategy(
    profile: &PersonaProfile,
    persona: &str,
) -> Result<AdaptationStrategy, PatternError> {
    let intensity = PatternError::check_unit(SYSTEM, "intensity", calculate_intensity(profile))?;
    Ok(AdaptationStrategy {
        approach: determine_approach(profile),
        intensity,
        focus: tables::owned(tables::adaptation_focus(persona)),
    })
}

pub fn adaptations_for(approach: AdaptationApproach) -> Vec<String> {
    let lines: [&str; 2] = match approach {
        AdaptationApproach::Direct => [
            "Here's the key information you need",
            "Let's focus on the essential points",
        ],
        AdaptationApproach::Supportive => [
            "We'll work through this together",
            "Take your time to process this information",
        ],
        AdaptationApproach::Indirect => [
            "Consider this perspective",
            "Here's something to think about",
        ],
    };
    lines.iter().map(|s| s.to_string()).collect()
}

pub fn apply_persona_adaptation(
    content: &[JourneyStep],
    strategy: &AdaptationStrategy,
) -> Vec<AdaptedStep> {
    content
        .iter()
        .map(|step| AdaptedStep {
            step: step.clone(),
            persona_adaptation: PersonaComponents {
                approach: strategy.approach,
                intensity: strategy.intensity,
                adaptations: adaptations_for(strategy.approach),
            },
        })
        .collect()
}

pub fn generate_persona_insights(profile: &PersonaProfile, _persona: &str) -> Vec<String> {
    let mut insights = Vec::new();
    if PersonaProfile::has(&profile.needs, "guidance") {
        insights.push("Let's break this down into manageable steps".to_string());
    }
    if PersonaProfile::has(&profile.preferences, "visual") {
        insights.push("Here's a visual representation to help you understand".to_string());
    }
    if PersonaProfile::has(&profile.goals, "efficiency") {
        insights.push("Here's a streamlined approach to achieve your goals".to_string());
    }
    insights
}

#[derive(Debug, Default)]
pub struct PersonaAdaptationImpl;

impl PersonaAdaptationImpl {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Enhancer for PersonaAdaptationImpl {
    type Output = PersonaAdaptation;

    fn name(&self) -> &'static str {
        SYSTEM
    }

    async fn enhance(
        &self,
        user: &User,
        content: &[JourneyStep],
    ) -> Result<PersonaAdaptation, PatternError> {
        let profile = analyze_persona_profile(user);
        let strategy = generate_adaptation_strategy(&profile, &user.persona)?;
        let adapted_content = apply_persona_adaptation(content, &strategy);
        let persona_insights = generate_persona_insights(&profile, &user.persona);

        Ok(PersonaAdaptation {
            adapted_content,
            persona_insights,
        })
    }
}
