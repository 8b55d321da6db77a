//! Journey session: the rendering side's handle on one visible step at a time.

pub mod state;
pub mod view;

use serde::{Deserialize, Serialize};

use crate::content::TieredContent;
use crate::error::ContentError;
use crate::interaction::AdaptedPattern;
use crate::journey::EnhancedStep;
use crate::measurement::Measurement;

pub use view::JourneyView;

/// Events published to the rendering side.
///
/// Step-scoped events carry the generation of the `show` call that produced
/// them; results from a superseded generation are never published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The enhanced step and its tiered content are ready to display.
    Ready {
        generation: u64,
        step: EnhancedStep,
        content: TieredContent,
    },
    /// Tiered content could not be loaded. The step is not downgraded.
    ContentFailed {
        generation: u64,
        step_id: String,
        error: String,
    },
    /// Interaction timing changed how the step is presented.
    Adapted {
        generation: u64,
        step: EnhancedStep,
        pattern: AdaptedPattern,
    },
    /// Interaction timing no longer matches a pattern; the base step is
    /// displayed again.
    Reverted { generation: u64, step: EnhancedStep },
    /// A session measurement was finalized.
    Measured(Measurement),
}

impl SessionEvent {
    pub(crate) fn content_failed(generation: u64, step_id: &str, error: &ContentError) -> Self {
        Self::ContentFailed {
            generation,
            step_id: step_id.to_string(),
            error: error.to_string(),
        }
    }
}
