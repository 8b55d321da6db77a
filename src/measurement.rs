//! Session measurement recording.
//!
//! A [`MeasurementRecorder`] owns one in-progress [`Measurement`]. It is
//! finalized exactly once, either by [`MeasurementRecorder::complete`] or, if
//! the recorder is dropped first, as abandoned. The terminal measurement is
//! delivered on an mpsc sink.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::interaction::Interaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    Abandoned,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Abandoned => write!(f, "abandoned"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub start_time: DateTime<Utc>,
    pub interactions: Vec<Interaction>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<BTreeMap<String, f64>>,
}

impl Measurement {
    fn started_at(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            interactions: Vec::new(),
            completed: false,
            outcome: None,
            metrics: None,
        }
    }
}

/// Source of interaction timestamps.
#[derive(Clone)]
pub struct Clock(Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>);

impl Clock {
    /// Plain wall-clock time.
    pub fn system() -> Self {
        Self(Arc::new(Utc::now))
    }

    /// Wall-clock time at creation, advanced by the Tokio clock. Timestamps
    /// are monotonic and follow a paused runtime clock.
    pub fn runtime() -> Self {
        let origin = Instant::now();
        let anchor = Utc::now();
        Self(Arc::new(move || {
            let elapsed = chrono::Duration::from_std(origin.elapsed())
                .unwrap_or_else(|_| chrono::Duration::zero());
            anchor + elapsed
        }))
    }

    pub fn from_fn(now: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self(Arc::new(now))
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Clock").field(&self.now()).finish()
    }
}

pub struct MeasurementRecorder {
    measurement: Measurement,
    sink: mpsc::UnboundedSender<Measurement>,
    clock: Clock,
}

impl MeasurementRecorder {
    pub fn new(sink: mpsc::UnboundedSender<Measurement>) -> Self {
        Self::with_clock(sink, Clock::system())
    }

    pub fn with_clock(sink: mpsc::UnboundedSender<Measurement>, clock: Clock) -> Self {
        Self {
            measurement: Measurement::started_at(clock.now()),
            sink,
            clock,
        }
    }

    /// Restart the clock and clear the interaction log.
    pub fn start(&mut self) {
        self.measurement.start_time = self.clock.now();
        self.measurement.interactions.clear();
    }

    /// Append an interaction stamped with the current time. Ignored once the
    /// measurement is finalized.
    pub fn record(
        &mut self,
        kind: impl Into<String>,
        details: serde_json::Map<String, serde_json::Value>,
    ) -> Option<&Interaction> {
        if self.measurement.completed {
            debug!("Interaction recorded after measurement was finalized, ignoring");
            return None;
        }
        self.measurement
            .interactions
            .push(Interaction::at(kind, self.clock.now(), details));
        self.measurement.interactions.last()
    }

    /// Finalize the measurement. Returns `None` if it was already finalized.
    pub fn complete(
        &mut self,
        outcome: Outcome,
        metrics: Option<BTreeMap<String, f64>>,
    ) -> Option<Measurement> {
        if self.measurement.completed {
            return None;
        }
        self.measurement.completed = true;
        self.measurement.outcome = Some(outcome);
        self.measurement.metrics = metrics;

        let finished = self.measurement.clone();
        info!(
            %outcome,
            interactions = finished.interactions.len(),
            "Measurement finalized"
        );
        if self.sink.send(finished.clone()).is_err() {
            debug!("Measurement sink closed");
        }
        Some(finished)
    }

    pub fn is_completed(&self) -> bool {
        self.measurement.completed
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.measurement.interactions
    }

    pub fn snapshot(&self) -> &Measurement {
        &self.measurement
    }
}

impl Drop for MeasurementRecorder {
    fn drop(&mut self) {
        self.complete(Outcome::Abandoned, None);
    }
}
