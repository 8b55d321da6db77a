//! Value articulation: tells the user what they will get out of a step.
//!
//! Pipeline: identify personalized value → preview → confirmation → context.
//! All three outputs are derived from the same personalized-value object.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PatternError;
use crate::journey::{JourneyStep, User};

use super::Enhancer;
use super::tables;

const SYSTEM: &str = "value_articulation";

/// What a persona stands to gain from the journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizedValue {
    pub health_insights: Vec<String>,
    pub actionable_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueArticulation {
    pub preview: String,
    pub confirmation: String,
    pub context: String,
}

pub fn identify_personalized_value(user: &User) -> Result<PersonalizedValue, PatternError> {
    let value = PersonalizedValue {
        health_insights: tables::owned(tables::health_insights(&user.persona)),
        actionable_steps: tables::owned(tables::actionable_steps(&user.persona)),
    };
    validate(&value)?;
    Ok(value)
}

fn validate(value: &PersonalizedValue) -> Result<(), PatternError> {
    let blank = value
        .health_insights
        .iter()
        .chain(&value.actionable_steps)
        .any(|s| s.trim().is_empty());
    if blank {
        return Err(PatternError::validation(
            SYSTEM,
            "personalized_value",
            "insights and steps must not contain blank entries",
        ));
    }
    Ok(())
}

pub fn generate_preview(value: &PersonalizedValue) -> String {
    format!("Here's what you'll learn: {}", value.health_insights.join(", "))
}

pub fn generate_confirmation(value: &PersonalizedValue) -> String {
    format!("Great job! You've learned: {}", value.health_insights.join(", "))
}

pub fn generate_context(value: &PersonalizedValue, _user: &User) -> String {
    format!(
        "This knowledge will help you: {}",
        value.actionable_steps.join(", ")
    )
}

/// Value articulation over the static persona tables.
#[derive(Debug, Default)]
pub struct ValueArticulationImpl;

impl ValueArticulationImpl {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Enhancer for ValueArticulationImpl {
    type Output = ValueArticulation;

    fn name(&self) -> &'static str {
        SYSTEM
    }

    async fn enhance(
        &self,
        user: &User,
        _content: &[JourneyStep],
    ) -> Result<ValueArticulation, PatternError> {
        let value = identify_personalized_value(user)?;
        Ok(ValueArticulation {
            preview: generate_preview(&value),
            confirmation: generate_confirmation(&value),
            context: generate_context(&value, user),
        })
    }
}
