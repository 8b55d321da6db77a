//! Gap-based interaction classification.

use serde::{Deserialize, Serialize};

use super::Interaction;
use crate::config::ClassifierConfig;

/// Flags derived from the recent interaction rhythm. More than one may be set;
/// [`super::adapt_step`] decides which one wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionPattern {
    pub scanning: bool,
    pub deep_engagement: bool,
    pub hesitation: bool,
}

impl InteractionPattern {
    pub fn any(&self) -> bool {
        self.scanning || self.deep_engagement || self.hesitation
    }
}

/// Classify the last `config.window` interactions.
///
/// Gaps are measured between consecutive timestamps in log order. With fewer
/// than two interactions there are no gaps and every flag is false.
pub fn analyze_interaction_patterns(
    interactions: &[Interaction],
    config: &ClassifierConfig,
) -> InteractionPattern {
    let start = interactions.len().saturating_sub(config.window);
    let gaps: Vec<i64> = interactions[start..]
        .windows(2)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_milliseconds())
        .collect();

    if gaps.is_empty() {
        return InteractionPattern::default();
    }

    let scanning_below = config.scanning_below.as_millis() as i64;
    let deep_above = config.deep_engagement_above.as_millis() as i64;
    let hesitation_above = config.hesitation_above.as_millis() as i64;

    InteractionPattern {
        scanning: gaps.iter().any(|&gap| gap < scanning_below),
        deep_engagement: gaps.iter().all(|&gap| gap > deep_above),
        hesitation: gaps.iter().any(|&gap| gap > hesitation_above),
    }
}
