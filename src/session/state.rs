//! Per-step session state and its teardown.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::interaction::Interaction;
use crate::journey::{EnhancedStep, JourneyStep, User};
use crate::measurement::MeasurementRecorder;
use crate::store::{Progress, ProgressStore, calculate_progress};

/// Everything owned by one `show` call.
pub(crate) struct Session {
    pub generation: u64,
    pub user: User,
    pub step: JourneyStep,
    /// Merged enhancement, before any interaction-driven adaptation.
    pub base: Option<EnhancedStep>,
    /// What the rendering side should currently display.
    pub current: Option<EnhancedStep>,
    pub recorder: MeasurementRecorder,
    /// Progress restored from storage when the step was shown.
    pub resume_from: f64,
    pub task: Option<JoinHandle<()>>,
}

impl Session {
    pub fn interactions(&self) -> &[Interaction] {
        self.recorder.interactions()
    }

    /// Progress to persist: the restored value never regresses.
    pub fn progress(&self, full: usize) -> Progress {
        let interactions = self.interactions().to_vec();
        let computed = calculate_progress(interactions.len(), full);
        Progress {
            user_id: self.user.id.clone(),
            step_id: self.step.id.clone(),
            progress: computed.max(self.resume_from),
            last_interaction: interactions.last().map(|i| i.timestamp),
            interactions,
        }
    }

    /// Stop background work, save progress without waiting, and drop the
    /// recorder (which finalizes an unfinished measurement as abandoned).
    pub fn teardown(mut self, store: Arc<dyn ProgressStore>, full: usize) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let progress = self.progress(full);
        debug!(
            generation = self.generation,
            step_id = %self.step.id,
            progress = progress.progress,
            "Tearing down journey session"
        );
        save_in_background(store, progress);
    }
}

/// Persist progress on a background task; failures are only logged.
pub(crate) fn save_in_background(store: Arc<dyn ProgressStore>, progress: Progress) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        warn!(
            user_id = %progress.user_id,
            step_id = %progress.step_id,
            "No runtime available, progress not saved"
        );
        return;
    };
    handle.spawn(async move {
        if let Err(e) = store.save(&progress).await {
            warn!(
                user_id = %progress.user_id,
                step_id = %progress.step_id,
                error = %e,
                "Failed to save journey progress"
            );
        }
    });
}
