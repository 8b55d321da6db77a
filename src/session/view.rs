//! `JourneyView`: drives one visible journey step at a time.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::Stream;
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

use super::SessionEvent;
use super::state::Session;
use crate::config::{ClassifierConfig, EngineConfig};
use crate::content::{ContentSource, load_tiered_content};
use crate::interaction::{AdaptedPattern, adapt_step, analyze_interaction_patterns};
use crate::journey::{EnhancedStep, JourneyStep, User};
use crate::loading::{AdaptiveLoader, LoadingState};
use crate::measurement::{Clock, Measurement, MeasurementRecorder, Outcome};
use crate::orchestrator::JourneyManager;
use crate::store::{ProgressKey, ProgressStore};

const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// The rendering collaborator's entry point.
///
/// `show` replaces whatever step was displayed before. Enhancement and
/// content loading run in the background and publish [`SessionEvent`]s; a
/// result that arrives after a newer `show` is discarded.
pub struct JourneyView {
    manager: Arc<JourneyManager>,
    content: Arc<dyn ContentSource>,
    store: Arc<dyn ProgressStore>,
    classifier: ClassifierConfig,
    full_progress: usize,
    loader: AdaptiveLoader,
    events: broadcast::Sender<SessionEvent>,
    measurements: mpsc::UnboundedSender<Measurement>,
    clock: Clock,
    generation: Arc<AtomicU64>,
    session: Arc<Mutex<Option<Session>>>,
}

impl JourneyView {
    /// Must be called inside a Tokio runtime.
    pub fn new(
        manager: Arc<JourneyManager>,
        content: Arc<dyn ContentSource>,
        store: Arc<dyn ProgressStore>,
        config: &EngineConfig,
    ) -> Self {
        let (events, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        let (measurements, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward_measurements(rx, events.clone()));

        Self {
            manager,
            content,
            store,
            classifier: config.classifier.clone(),
            full_progress: config.interactions_for_full_progress,
            loader: AdaptiveLoader::new(),
            events,
            measurements,
            clock: Clock::runtime(),
            generation: Arc::new(AtomicU64::new(0)),
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the clock that stamps recorded interactions.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Session events as a stream. Events missed by a lagging consumer are
    /// skipped.
    pub fn event_stream(&self) -> impl Stream<Item = SessionEvent> + use<> {
        BroadcastStream::new(self.events.subscribe()).filter_map(|event| event.ok())
    }

    pub fn loading(&self) -> broadcast::Receiver<LoadingState> {
        self.loader.subscribe()
    }

    pub async fn loading_state(&self) -> LoadingState {
        self.loader.current().await
    }

    /// Generation of the most recent `show`.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Display `step` for `user`, tearing down the previous step's session.
    /// Returns the new generation.
    pub async fn show(&self, user: User, step: JourneyStep) -> u64 {
        let mut guard = self.session.lock().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = guard.take() {
            previous.teardown(Arc::clone(&self.store), self.full_progress);
        }

        let resume_from = self.restore_progress(&user, &step).await;
        self.loader.start(step.tier).await;

        let mut recorder =
            MeasurementRecorder::with_clock(self.measurements.clone(), self.clock.clone());
        recorder.start();

        info!(
            generation,
            user_id = %user.id,
            step_id = %step.id,
            tier = %step.tier,
            resume_from,
            "Showing journey step"
        );

        let task = tokio::spawn(prepare_step(
            generation,
            user.clone(),
            step.clone(),
            Arc::clone(&self.manager),
            Arc::clone(&self.content),
            Arc::clone(&self.session),
            self.classifier.clone(),
            self.events.clone(),
        ));

        *guard = Some(Session {
            generation,
            user,
            step,
            base: None,
            current: None,
            recorder,
            resume_from,
            task: Some(task),
        });
        generation
    }

    /// Record an interaction and re-adapt the displayed step from its base.
    pub async fn record_interaction(
        &self,
        kind: impl Into<String>,
        details: serde_json::Map<String, serde_json::Value>,
    ) -> Option<AdaptedPattern> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut()?;
        session.recorder.record(kind, details)?;

        let (current, applied) = readapt(session, &self.classifier)?;
        let changed = session.current.as_ref() != Some(&current);
        session.current = Some(current.clone());

        let generation = session.generation;
        match applied {
            Some(pattern) => {
                debug!(generation, %pattern, "Step adapted");
                let _ = self.events.send(SessionEvent::Adapted {
                    generation,
                    step: current,
                    pattern,
                });
            }
            None if changed => {
                debug!(generation, "Step reverted to its base presentation");
                let _ = self
                    .events
                    .send(SessionEvent::Reverted { generation, step: current });
            }
            None => {}
        }
        applied
    }

    /// The step as it should currently be displayed, once enhancement is done.
    pub async fn current_step(&self) -> Option<EnhancedStep> {
        self.session.lock().await.as_ref()?.current.clone()
    }

    /// Progress restored for the displayed step.
    pub async fn resume_point(&self) -> Option<f64> {
        self.session.lock().await.as_ref().map(|s| s.resume_from)
    }

    /// Mark the displayed step completed. Returns `None` when nothing is
    /// shown or the measurement was already finalized.
    pub async fn complete(&self, metrics: BTreeMap<String, f64>) -> Option<Measurement> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut()?;
        session.recorder.complete(Outcome::Completed, Some(metrics))
    }

    /// Tear down the displayed step. An uncompleted measurement is recorded as
    /// abandoned and progress is saved in the background.
    pub async fn close(&self) {
        let mut guard = self.session.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.loader.stop();
        if let Some(session) = guard.take() {
            session.teardown(Arc::clone(&self.store), self.full_progress);
        }
    }

    async fn restore_progress(&self, user: &User, step: &JourneyStep) -> f64 {
        let key = ProgressKey::new(&user.id, &step.id);
        match self.store.load(&key).await {
            Ok(Some(saved)) => saved.progress,
            Ok(None) => 0.0,
            Err(e) => {
                warn!(user_id = %user.id, step_id = %step.id, error = %e, "Failed to restore progress");
                0.0
            }
        }
    }
}

impl Drop for JourneyView {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.session.try_lock() {
            if let Some(session) = guard.take() {
                session.teardown(Arc::clone(&self.store), self.full_progress);
            }
        }
    }
}

/// Adapt the session's base step to its interaction log. `None` until the
/// base step exists.
fn readapt(
    session: &Session,
    classifier: &ClassifierConfig,
) -> Option<(EnhancedStep, Option<AdaptedPattern>)> {
    let base = session.base.as_ref()?;
    let pattern = analyze_interaction_patterns(session.interactions(), classifier);
    Some(match adapt_step(base, pattern) {
        Some((step, applied)) => (step, Some(applied)),
        None => (base.clone(), None),
    })
}

#[allow(clippy::too_many_arguments)]
async fn prepare_step(
    generation: u64,
    user: User,
    step: JourneyStep,
    manager: Arc<JourneyManager>,
    content: Arc<dyn ContentSource>,
    session: Arc<Mutex<Option<Session>>>,
    classifier: ClassifierConfig,
    events: broadcast::Sender<SessionEvent>,
) {
    let (loaded, enhanced) = tokio::join!(
        load_tiered_content(content.as_ref(), &step),
        manager.enhance_journey_step(&step, &user),
    );

    let mut guard = session.lock().await;
    let Some(current) = guard.as_mut().filter(|s| s.generation == generation) else {
        debug!(generation, step_id = %step.id, "Discarding result of superseded step");
        return;
    };

    current.base = Some(enhanced.enhanced_step);
    let adapted = readapt(current, &classifier);
    if let Some((display, _)) = adapted {
        current.current = Some(display);
    }

    let event = match loaded {
        Ok(tiers) => SessionEvent::Ready {
            generation,
            step: current.current.clone().unwrap_or_else(|| EnhancedStep::bare(step.clone())),
            content: tiers,
        },
        Err(e) => {
            warn!(generation, step_id = %step.id, error = %e, "Tiered content failed to load");
            SessionEvent::content_failed(generation, &step.id, &e)
        }
    };
    let _ = events.send(event);
}

async fn forward_measurements(
    mut rx: mpsc::UnboundedReceiver<Measurement>,
    events: broadcast::Sender<SessionEvent>,
) {
    while let Some(measurement) = rx.recv().await {
        let _ = events.send(SessionEvent::Measured(measurement));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio_stream::StreamExt as _;

    use super::*;
    use crate::content::SimulatedContentSource;
    use crate::error::ContentError;
    use crate::journey::{StepTier, SupportType};
    use crate::loading::LoadingPhase;
    use crate::patterns::StaticAnalytics;
    use crate::store::MemoryProgressStore;

    /// Content that takes as long as the step id says, in milliseconds.
    struct Timed;

    #[async_trait]
    impl ContentSource for Timed {
        async fn fetch(&self, step: &JourneyStep, _tier: StepTier) -> Result<String, ContentError> {
            let ms = step.id.parse::<u64>().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(step.content.clone())
        }
    }

    struct Offline;

    #[async_trait]
    impl ContentSource for Offline {
        async fn fetch(&self, _step: &JourneyStep, tier: StepTier) -> Result<String, ContentError> {
            Err(ContentError::LoadFailed {
                tier: tier.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    fn config() -> EngineConfig {
        EngineConfig {
            message_seed: Some(11),
            ..EngineConfig::default()
        }
    }

    fn view_with(content: Arc<dyn ContentSource>, store: Arc<MemoryProgressStore>) -> JourneyView {
        view_configured(content, store, config())
    }

    fn view_configured(
        content: Arc<dyn ContentSource>,
        store: Arc<MemoryProgressStore>,
        config: EngineConfig,
    ) -> JourneyView {
        let manager = Arc::new(JourneyManager::standard(
            Arc::new(StaticAnalytics::default()),
            &config,
        ));
        JourneyView::new(manager, content, store, &config)
    }

    fn user() -> User {
        User::new("u1", "health_aware_avoider", "u1@example.com")
    }

    async fn next_ready(rx: &mut broadcast::Receiver<SessionEvent>) -> SessionEvent {
        loop {
            let event = rx.recv().await.unwrap();
            if matches!(event, SessionEvent::Ready { .. } | SessionEvent::ContentFailed { .. }) {
                return event;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shows_enhanced_step() {
        let view = view_with(
            Arc::new(SimulatedContentSource::default()),
            Arc::new(MemoryProgressStore::new()),
        );
        let mut rx = view.subscribe();
        let step = JourneyStep::new("s1", StepTier::Extended, "Breast density basics");
        let generation = view.show(user(), step).await;

        match next_ready(&mut rx).await {
            SessionEvent::Ready { generation: g, step, content } => {
                assert_eq!(g, generation);
                assert_eq!(step.step.id, "s1");
                assert!(step.value_components.is_some());
                assert!(content.extended.is_some());
            }
            other => panic!("expected ready, got {other:?}"),
        }
        assert!(view.current_step().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_show_never_replaces_newer_step() {
        let view = view_with(Arc::new(Timed), Arc::new(MemoryProgressStore::new()));
        let mut rx = view.subscribe();

        let slow = JourneyStep::new("5000", StepTier::Extended, "slow");
        let fast = JourneyStep::new("10", StepTier::Extended, "fast");
        view.show(user(), slow).await;
        let newer = view.show(user(), fast).await;

        tokio::time::sleep(Duration::from_secs(10)).await;

        let mut ready = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SessionEvent::Ready { generation, step, .. } = event {
                ready.push((generation, step.step.id));
            }
        }
        assert_eq!(ready, vec![(newer, "10".to_string())]);
        assert_eq!(view.current_step().await.unwrap().step.id, "10");
    }

    #[tokio::test(start_paused = true)]
    async fn content_failure_is_reported() {
        let view = view_with(Arc::new(Offline), Arc::new(MemoryProgressStore::new()));
        let mut rx = view.subscribe();
        view.show(user(), JourneyStep::new("s1", StepTier::Comprehensive, "x")).await;

        match next_ready(&mut rx).await {
            SessionEvent::ContentFailed { step_id, error, .. } => {
                assert_eq!(step_id, "s1");
                assert!(error.contains("offline"));
            }
            other => panic!("expected content failure, got {other:?}"),
        }
    }

    /// Show a five-line step, then record one interaction at each offset
    /// (milliseconds after the first) on the paused clock. Returns what the
    /// last interaction applied.
    async fn interact_at(view: &JourneyView, offsets_ms: &[u64]) -> Option<AdaptedPattern> {
        let mut rx = view.subscribe();
        let step = JourneyStep::new("0", StepTier::Essential, "a\nb\nc\nd\ne");
        view.show(user(), step).await;
        next_ready(&mut rx).await;

        let mut applied = None;
        let mut previous = 0;
        for &offset in offsets_ms {
            tokio::time::sleep(Duration::from_millis(offset - previous)).await;
            previous = offset;
            applied = view.record_interaction("click", Default::default()).await;
        }
        applied
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_interactions_simplify_the_step() {
        let view = view_with(Arc::new(Timed), Arc::new(MemoryProgressStore::new()));
        let applied = interact_at(&view, &[0, 500, 1000]).await;

        assert_eq!(applied, Some(AdaptedPattern::Scanning));
        assert_eq!(view.current_step().await.unwrap().step.content, "a\nb\nc");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_steady_interactions_enrich_the_step() {
        let view = view_with(Arc::new(Timed), Arc::new(MemoryProgressStore::new()));
        let applied = interact_at(&view, &[0, 6000, 12000]).await;

        assert_eq!(applied, Some(AdaptedPattern::DeepEngagement));
        let content = view.current_step().await.unwrap().step.content;
        assert!(content.starts_with("a\nb\nc\nd\ne"));
        assert!(content.ends_with("Additional insights and detailed information..."));
    }

    #[tokio::test(start_paused = true)]
    async fn long_pause_adds_guidance() {
        let view = view_with(Arc::new(Timed), Arc::new(MemoryProgressStore::new()));
        let applied = interact_at(&view, &[0, 2000, 15000]).await;

        assert_eq!(applied, Some(AdaptedPattern::Hesitation));
        let current = view.current_step().await.unwrap();
        assert_eq!(current.step.content, "a\nb\nc\nd\ne");
        let support = current.emotional_components.unwrap();
        assert_eq!(support.support_type, SupportType::Guidance);
        assert_eq!(support.intensity, 0.8);
    }

    #[tokio::test(start_paused = true)]
    async fn moderate_pace_leaves_step_unchanged() {
        let view = view_with(Arc::new(Timed), Arc::new(MemoryProgressStore::new()));
        let applied = interact_at(&view, &[0, 2000]).await;

        assert_eq!(applied, None);
        assert_eq!(view.current_step().await.unwrap().step.content, "a\nb\nc\nd\ne");
    }

    #[tokio::test(start_paused = true)]
    async fn injected_clock_stamps_interactions() {
        use chrono::TimeZone;

        let frozen = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let view = view_with(Arc::new(Timed), Arc::new(MemoryProgressStore::new()))
            .with_clock(Clock::from_fn(move || frozen));

        // every gap is zero on a frozen clock, however long the real pause
        let applied = interact_at(&view, &[0, 20_000]).await;
        assert_eq!(applied, Some(AdaptedPattern::Scanning));

        let done = view.complete(BTreeMap::new()).await.unwrap();
        assert_eq!(done.start_time, frozen);
        assert!(done.interactions.iter().all(|i| i.timestamp == frozen));
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_a_pattern_publishes_the_base_step() {
        let mut config = config();
        config.classifier.window = 3;
        config.classifier.scanning_below = Duration::from_millis(100);
        let view = view_configured(Arc::new(Timed), Arc::new(MemoryProgressStore::new()), config);
        let mut rx = view.subscribe();

        let applied = interact_at(&view, &[0, 50, 350, 650, 950]).await;
        assert_eq!(applied, None);

        let mut published = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                SessionEvent::Adapted { step, pattern, .. } => {
                    published.push((Some(pattern), step.step.content))
                }
                SessionEvent::Reverted { step, .. } => published.push((None, step.step.content)),
                _ => {}
            }
        }
        let base = "a\nb\nc\nd\ne".to_string();
        assert_eq!(
            published,
            vec![
                (Some(AdaptedPattern::Scanning), "a\nb\nc".to_string()),
                (Some(AdaptedPattern::Scanning), "a\nb\nc".to_string()),
                (None, base.clone()),
            ]
        );
        assert_eq!(view.current_step().await.unwrap().step.content, base);
    }

    #[tokio::test(start_paused = true)]
    async fn event_stream_and_loading_follow_the_step() {
        let view = view_with(Arc::new(Timed), Arc::new(MemoryProgressStore::new()));
        let mut events = Box::pin(view.event_stream());

        view.show(user(), JourneyStep::new("0", StepTier::Comprehensive, "x")).await;
        assert_eq!(view.loading_state().await, LoadingState::INITIAL);

        tokio::time::sleep(Duration::from_millis(1600)).await;
        let loaded = view.loading_state().await;
        assert_eq!(loaded.loading_phase, LoadingPhase::Complete);
        assert_eq!(loaded.progress, 100);
        assert!(!loaded.is_loading);

        match events.next().await {
            Some(SessionEvent::Ready { step, content, .. }) => {
                assert_eq!(step.step.id, "0");
                assert!(content.comprehensive.is_some());
            }
            other => panic!("expected ready, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn closing_abandons_and_saves_progress() {
        let store = Arc::new(MemoryProgressStore::new());
        let view = view_with(Arc::new(Timed), Arc::clone(&store));
        let mut rx = view.subscribe();
        view.show(user(), JourneyStep::new("0", StepTier::Essential, "x")).await;
        for kind in ["view", "scroll", "click"] {
            view.record_interaction(kind, Default::default()).await;
        }
        view.close().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        let measured = loop {
            if let SessionEvent::Measured(m) = rx.recv().await.unwrap() {
                break m;
            }
        };
        assert_eq!(measured.outcome, Some(Outcome::Abandoned));
        assert_eq!(measured.interactions.len(), 3);

        let saved = store.load(&ProgressKey::new("u1", "0")).await.unwrap().unwrap();
        assert!((saved.progress - 0.3).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_step_is_not_abandoned() {
        let view = view_with(Arc::new(Timed), Arc::new(MemoryProgressStore::new()));
        let mut rx = view.subscribe();
        view.show(user(), JourneyStep::new("0", StepTier::Essential, "x")).await;
        view.record_interaction("view", Default::default()).await;

        let done = view.complete(BTreeMap::new()).await.unwrap();
        assert_eq!(done.outcome, Some(Outcome::Completed));
        assert!(view.complete(BTreeMap::new()).await.is_none());
        view.close().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        let mut outcomes = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let SessionEvent::Measured(m) = event {
                outcomes.push(m.outcome);
            }
        }
        assert_eq!(outcomes, vec![Some(Outcome::Completed)]);
    }

    #[tokio::test(start_paused = true)]
    async fn revisit_restores_and_never_regresses() {
        let store = Arc::new(MemoryProgressStore::new());
        let view = view_with(Arc::new(Timed), Arc::clone(&store));
        let step = JourneyStep::new("0", StepTier::Essential, "x");

        view.show(user(), step.clone()).await;
        for _ in 0..5 {
            view.record_interaction("click", Default::default()).await;
        }
        view.close().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        view.show(user(), step).await;
        assert_eq!(view.resume_point().await, Some(0.5));
        view.record_interaction("click", Default::default()).await;
        view.close().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        let saved = store.load(&ProgressKey::new("u1", "0")).await.unwrap().unwrap();
        assert_eq!(saved.progress, 0.5);
        assert_eq!(saved.interactions.len(), 1);
    }
}
