//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Timing thresholds for the interaction classifier.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// How many of the most recent interactions are considered.
    pub window: usize,
    /// A gap shorter than this marks scanning.
    pub scanning_below: Duration,
    /// Every gap longer than this marks deep engagement.
    pub deep_engagement_above: Duration,
    /// Any gap longer than this marks hesitation.
    pub hesitation_above: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            window: 10,
            scanning_below: Duration::from_millis(1000),
            deep_engagement_above: Duration::from_millis(5000),
            hesitation_above: Duration::from_millis(10_000),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound for a single pattern system's `enhance` call.
    pub pattern_timeout: Duration,
    /// Seed for the emotional support message picker. `None` seeds from entropy.
    pub message_seed: Option<u64>,
    /// Interaction classifier thresholds.
    pub classifier: ClassifierConfig,
    /// Number of interactions that counts as a fully progressed step.
    pub interactions_for_full_progress: usize,
    /// Progress database location. `None` keeps progress in memory.
    pub db_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pattern_timeout: Duration::from_secs(5),
            message_seed: None,
            classifier: ClassifierConfig::default(),
            interactions_for_full_progress: 10,
            db_path: None,
        }
    }
}

impl EngineConfig {
    /// Build a config from `ENGAGE_*` environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ms) = parse_var::<u64>(&lookup, "ENGAGE_PATTERN_TIMEOUT_MS")? {
            config.pattern_timeout = Duration::from_millis(ms);
        }
        config.message_seed = parse_var::<u64>(&lookup, "ENGAGE_MESSAGE_SEED")?;

        if let Some(window) = parse_var::<usize>(&lookup, "ENGAGE_CLASSIFIER_WINDOW")? {
            if window < 2 {
                return Err(ConfigError::InvalidValue {
                    key: "ENGAGE_CLASSIFIER_WINDOW".to_string(),
                    message: "window must hold at least 2 interactions".to_string(),
                });
            }
            config.classifier.window = window;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "ENGAGE_SCANNING_MS")? {
            config.classifier.scanning_below = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "ENGAGE_DEEP_ENGAGEMENT_MS")? {
            config.classifier.deep_engagement_above = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "ENGAGE_HESITATION_MS")? {
            config.classifier.hesitation_above = Duration::from_millis(ms);
        }

        if let Some(n) = parse_var::<usize>(&lookup, "ENGAGE_FULL_PROGRESS_INTERACTIONS")? {
            if n == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "ENGAGE_FULL_PROGRESS_INTERACTIONS".to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
            config.interactions_for_full_progress = n;
        }

        config.db_path = lookup("ENGAGE_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{raw}': {e}"),
            }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = EngineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.classifier.window, 10);
        assert_eq!(config.pattern_timeout, Duration::from_secs(5));
        assert_eq!(config.interactions_for_full_progress, 10);
        assert!(config.db_path.is_none());
        assert!(config.message_seed.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("ENGAGE_PATTERN_TIMEOUT_MS", "250"),
            ("ENGAGE_MESSAGE_SEED", "7"),
            ("ENGAGE_CLASSIFIER_WINDOW", "5"),
            ("ENGAGE_HESITATION_MS", "20000"),
            ("ENGAGE_DB_PATH", "./data/progress.db"),
        ]))
        .unwrap();
        assert_eq!(config.pattern_timeout, Duration::from_millis(250));
        assert_eq!(config.message_seed, Some(7));
        assert_eq!(config.classifier.window, 5);
        assert_eq!(config.classifier.hesitation_above, Duration::from_secs(20));
        assert_eq!(config.db_path, Some(PathBuf::from("./data/progress.db")));
    }

    #[test]
    fn invalid_number_is_rejected() {
        let err = EngineConfig::from_lookup(lookup_from(&[("ENGAGE_SCANNING_MS", "fast")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { key, .. } => assert_eq!(key, "ENGAGE_SCANNING_MS"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn tiny_window_is_rejected() {
        let err = EngineConfig::from_lookup(lookup_from(&[("ENGAGE_CLASSIFIER_WINDOW", "1")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
