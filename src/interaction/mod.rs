//! Interaction log and timing-based re-adaptation.
//!
//! The classifier only looks at the gaps between consecutive interactions;
//! what the interactions were is irrelevant to it. Adaptation is always
//! applied to the base enhanced step, never to a previously adapted one.

pub mod adaptation;
pub mod classifier;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use adaptation::{AdaptedPattern, adapt_step, add_guidance, enrich, simplify};
pub use classifier::{InteractionPattern, analyze_interaction_patterns};

/// One user interaction with the journey view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl Interaction {
    pub fn at(
        kind: impl Into<String>,
        timestamp: DateTime<Utc>,
        details: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            kind: kind.into(),
            timestamp,
            details,
        }
    }
}
