//! Engagement Engine: persona-driven adaptation of onboarding journey steps.

pub mod config;
pub mod content;
pub mod error;
pub mod interaction;
pub mod journey;
pub mod loading;
pub mod measurement;
pub mod orchestrator;
pub mod patterns;
pub mod session;
pub mod store;
