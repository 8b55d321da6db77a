//! Adaptive loading sequencer.
//!
//! Each tier has a fixed schedule of loading phases. Starting a tier walks its
//! schedule on a background task and publishes a [`LoadingState`] as each
//! phase's offset elapses. Starting again aborts the running walk.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::journey::StepTier;

const DEFAULT_BROADCAST_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoadingPhase {
    Initial,
    CriticalContent,
    EnhancedContext,
    Personalization,
    DeepContext,
    Complete,
}

impl fmt::Display for LoadingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "initial"),
            Self::CriticalContent => write!(f, "critical-content"),
            Self::EnhancedContext => write!(f, "enhanced-context"),
            Self::Personalization => write!(f, "personalization"),
            Self::DeepContext => write!(f, "deep-context"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// One scheduled transition, `at` measured from the start of the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseStep {
    pub phase: LoadingPhase,
    pub progress: u8,
    pub at: Duration,
}

const fn phase(phase: LoadingPhase, progress: u8, at_ms: u64) -> PhaseStep {
    PhaseStep {
        phase,
        progress,
        at: Duration::from_millis(at_ms),
    }
}

const ESSENTIAL: &[PhaseStep] = &[phase(LoadingPhase::Complete, 100, 300)];

const EXTENDED: &[PhaseStep] = &[
    phase(LoadingPhase::CriticalContent, 30, 300),
    phase(LoadingPhase::EnhancedContext, 60, 600),
    phase(LoadingPhase::Complete, 100, 900),
];

const COMPREHENSIVE: &[PhaseStep] = &[
    phase(LoadingPhase::CriticalContent, 20, 300),
    phase(LoadingPhase::EnhancedContext, 40, 600),
    phase(LoadingPhase::Personalization, 60, 900),
    phase(LoadingPhase::DeepContext, 80, 1200),
    phase(LoadingPhase::Complete, 100, 1500),
];

/// The loading schedule for a tier.
pub fn schedule_for(tier: StepTier) -> &'static [PhaseStep] {
    match tier {
        StepTier::Essential => ESSENTIAL,
        StepTier::Extended => EXTENDED,
        StepTier::Comprehensive => COMPREHENSIVE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingState {
    pub is_loading: bool,
    pub loading_phase: LoadingPhase,
    pub progress: u8,
}

impl LoadingState {
    pub const INITIAL: LoadingState = LoadingState {
        is_loading: true,
        loading_phase: LoadingPhase::Initial,
        progress: 0,
    };
}

impl Default for LoadingState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Walks loading schedules and broadcasts their states.
pub struct AdaptiveLoader {
    state: Arc<RwLock<LoadingState>>,
    tx: broadcast::Sender<LoadingState>,
    epoch: Arc<AtomicU64>,
    walk: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl AdaptiveLoader {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(LoadingState::INITIAL)),
            tx,
            epoch: Arc::new(AtomicU64::new(0)),
            walk: std::sync::Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoadingState> {
        self.tx.subscribe()
    }

    /// The most recently published state.
    pub async fn current(&self) -> LoadingState {
        *self.state.read().await
    }

    /// Reset to the initial state and walk the schedule for `tier`.
    pub async fn start(&self, tier: StepTier) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_walk();
        *self.state.write().await = LoadingState::INITIAL;

        debug!(%tier, epoch, "Starting loading sequence");

        let state = Arc::clone(&self.state);
        let current_epoch = Arc::clone(&self.epoch);
        let tx = self.tx.clone();
        let schedule = schedule_for(tier);

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let last = schedule.len().saturating_sub(1);
            for (i, step) in schedule.iter().enumerate() {
                tokio::time::sleep_until(started + step.at).await;
                let next = LoadingState {
                    is_loading: i != last,
                    loading_phase: step.phase,
                    progress: step.progress,
                };
                {
                    let mut guard = state.write().await;
                    if current_epoch.load(Ordering::SeqCst) != epoch {
                        return;
                    }
                    *guard = next;
                }
                let _ = tx.send(next);
            }
        });

        if let Ok(mut walk) = self.walk.lock() {
            *walk = Some(handle);
        }
    }

    /// Stop any running walk, leaving the last published state in place.
    pub fn stop(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.abort_walk();
    }

    fn abort_walk(&self) {
        if let Ok(mut walk) = self.walk.lock() {
            if let Some(handle) = walk.take() {
                handle.abort();
            }
        }
    }
}

impl Default for AdaptiveLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AdaptiveLoader {
    fn drop(&mut self) {
        self.abort_walk();
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;

    async fn drain(rx: &mut broadcast::Receiver<LoadingState>, n: usize) -> Vec<LoadingState> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(rx.recv().await.unwrap());
        }
        out
    }

    #[test]
    fn schedules_end_complete_at_100() {
        for tier in [StepTier::Essential, StepTier::Extended, StepTier::Comprehensive] {
            let last = schedule_for(tier).last().unwrap();
            assert_eq!(last.phase, LoadingPhase::Complete);
            assert_eq!(last.progress, 100);
        }
        let phases: Vec<String> = schedule_for(StepTier::Extended)
            .iter()
            .map(|s| s.phase.to_string())
            .collect();
        assert_eq!(phases, ["critical-content", "enhanced-context", "complete"]);
    }

    #[tokio::test(start_paused = true)]
    async fn comprehensive_walks_five_phases() {
        let loader = AdaptiveLoader::new();
        let mut rx = loader.subscribe();
        loader.start(StepTier::Comprehensive).await;
        assert_eq!(loader.current().await, LoadingState::INITIAL);

        let states = drain(&mut rx, 5).await;
        let progress: Vec<u8> = states.iter().map(|s| s.progress).collect();
        assert_eq!(progress, [20, 40, 60, 80, 100]);
        assert!(states[..4].iter().all(|s| s.is_loading));
        assert!(!states[4].is_loading);
        assert_eq!(loader.current().await.loading_phase, LoadingPhase::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn essential_has_a_single_transition() {
        let loader = AdaptiveLoader::new();
        let mut rx = loader.subscribe();
        let started = Instant::now();
        loader.start(StepTier::Essential).await;

        let state = rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(300));
        assert_eq!(
            state,
            LoadingState {
                is_loading: false,
                loading_phase: LoadingPhase::Complete,
                progress: 100,
            }
        );

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_abandons_the_previous_walk() {
        let loader = AdaptiveLoader::new();
        let mut rx = loader.subscribe();
        loader.start(StepTier::Comprehensive).await;
        assert_eq!(rx.recv().await.unwrap().progress, 20);

        loader.start(StepTier::Extended).await;
        assert_eq!(loader.current().await, LoadingState::INITIAL);
        let progress: Vec<u8> = drain(&mut rx, 3).await.iter().map(|s| s.progress).collect();
        assert_eq!(progress, [30, 60, 100]);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_freezes_the_state() {
        let loader = AdaptiveLoader::new();
        let mut rx = loader.subscribe();
        loader.start(StepTier::Extended).await;
        assert_eq!(rx.recv().await.unwrap().progress, 30);
        loader.stop();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(loader.current().await.progress, 30);
    }
}
