//! `ProgressStore` trait and the progress record it persists.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;
use crate::interaction::Interaction;

/// Identifies one progress record: a user's progress through one step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressKey {
    pub user_id: String,
    pub step_id: String,
}

impl ProgressKey {
    pub fn new(user_id: impl Into<String>, step_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            step_id: step_id.into(),
        }
    }
}

/// Saved progress for one `(user, step)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub user_id: String,
    pub step_id: String,
    /// Fraction of the step completed, in `[0, 1]`.
    pub progress: f64,
    pub last_interaction: Option<DateTime<Utc>>,
    pub interactions: Vec<Interaction>,
}

impl Progress {
    pub fn key(&self) -> ProgressKey {
        ProgressKey::new(&self.user_id, &self.step_id)
    }
}

/// Progress implied by an interaction count: linear up to `full`, then capped.
pub fn calculate_progress(interactions: usize, full: usize) -> f64 {
    if full == 0 {
        return 1.0;
    }
    (interactions as f64 / full as f64).min(1.0)
}

/// Scoped storage for progress records. Saves are upserts; the last writer
/// for a key wins.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Insert or replace the record for `progress.key()`.
    async fn save(&self, progress: &Progress) -> Result<(), DatabaseError>;

    /// Load the record for `key`, if one was saved.
    async fn load(&self, key: &ProgressKey) -> Result<Option<Progress>, DatabaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_linear_then_capped() {
        assert_eq!(calculate_progress(0, 10), 0.0);
        assert_eq!(calculate_progress(3, 10), 0.3);
        assert_eq!(calculate_progress(10, 10), 1.0);
        assert_eq!(calculate_progress(25, 10), 1.0);
    }
}
