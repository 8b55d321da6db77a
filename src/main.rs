use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use engagement_engine::config::EngineConfig;
use engagement_engine::content::SimulatedContentSource;
use engagement_engine::journey::{JourneyStep, Persona, StepTier, User};
use engagement_engine::orchestrator::JourneyManager;
use engagement_engine::patterns::StaticAnalytics;
use engagement_engine::session::{JourneyView, SessionEvent};
use engagement_engine::store::{LibSqlProgressStore, MemoryProgressStore, ProgressStore};

const DEFAULT_CONTENT: &str = "Dense breast tissue is common.\n\
It can make mammograms harder to read.\n\
Supplemental screening may help.\n\
Talk to your provider about your options.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing();

    let config = EngineConfig::from_env()?;

    let persona =
        std::env::var("ENGAGE_PERSONA").unwrap_or_else(|_| "health_aware_avoider".to_string());
    let tier: StepTier = std::env::var("ENGAGE_TIER")
        .unwrap_or_else(|_| "essential".to_string())
        .parse()
        .map_err(anyhow::Error::msg)?;
    let content = std::env::var("ENGAGE_CONTENT").unwrap_or_else(|_| DEFAULT_CONTENT.to_string());

    let profile = Persona::from_key(&persona).map(|p| p.profile());
    if profile.is_none() {
        tracing::warn!(persona = %persona, "Unknown persona, pattern tables will be empty");
    }

    eprintln!("🧭 Engagement Engine v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Persona: {}", persona);
    if let Some(profile) = profile {
        eprintln!(
            "   Style: {} (trust building: {})",
            profile.response_style, profile.trust_building_speed
        );
    }
    eprintln!("   Tier: {}", tier);

    // ── Progress store ──────────────────────────────────────────────────
    let store: Arc<dyn ProgressStore> = match &config.db_path {
        Some(path) => {
            eprintln!("   Database: {}", path.display());
            Arc::new(
                LibSqlProgressStore::new_local(path)
                    .await
                    .with_context(|| format!("failed to open database at {}", path.display()))?,
            )
        }
        None => {
            eprintln!("   Database: in-memory");
            Arc::new(MemoryProgressStore::new())
        }
    };

    // ── Journey view ────────────────────────────────────────────────────
    let manager = Arc::new(JourneyManager::standard(
        Arc::new(StaticAnalytics::default()),
        &config,
    ));
    let view = JourneyView::new(
        manager,
        Arc::new(SimulatedContentSource::default()),
        store,
        &config,
    );
    let mut events = view.subscribe();

    let user_id = std::env::var("ENGAGE_USER_ID").unwrap_or_else(|_| uuid::Uuid::new_v4().to_string());
    let user = User::new(user_id, persona, "demo@example.com");
    let step = JourneyStep::new("intro", tier, content);

    let shown_at = Instant::now();
    view.show(user, step).await;
    if let Some(resume) = view.resume_point().await.filter(|p| *p > 0.0) {
        eprintln!("   Resuming at {:.0}%", resume * 100.0);
    }
    eprintln!();

    let ready = tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            match events.recv().await {
                Ok(event @ (SessionEvent::Ready { .. } | SessionEvent::ContentFailed { .. })) => {
                    return Ok(event);
                }
                Ok(_) => continue,
                Err(e) => return Err(e),
            }
        }
    })
    .await
    .context("timed out waiting for the journey step")??;

    println!("{}", serde_json::to_string_pretty(&ready)?);

    view.record_interaction("view", serde_json::Map::new()).await;
    let metrics = BTreeMap::from([(
        "time_on_step_ms".to_string(),
        shown_at.elapsed().as_millis() as f64,
    )]);
    if let Some(measurement) = view.complete(metrics).await {
        println!("{}", serde_json::to_string_pretty(&measurement)?);
    }
    view.close().await;

    // Progress is saved in the background on close
    tokio::time::sleep(Duration::from_millis(200)).await;
    Ok(())
}

/// Stderr logging filtered by `RUST_LOG` (default `info`), plus a daily
/// rolling file when `ENGAGE_LOG_DIR` is set.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match std::env::var("ENGAGE_LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "engagement-engine.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    guard
}
