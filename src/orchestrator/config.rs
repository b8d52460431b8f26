//! Orchestrator configuration (spec §4.4, §5), in the teacher's
//! `config::types::CrawlConfig` builder style: a plain struct with a
//! validating `build()` rather than a config-file crate (spec §0).

use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::request::Scanner as ScannerId;
use crate::error::ConfigError;

/// Default per-scanner concurrency cap (spec §4.4): 1 for WAVE (external
/// quota), 2 for the subprocess-based tools.
#[must_use]
pub fn default_max_per_scanner() -> BTreeMap<ScannerId, usize> {
    [
        (ScannerId::Wave, 1),
        (ScannerId::Pa11y, 2),
        (ScannerId::Axe, 2),
        (ScannerId::Lighthouse, 2),
    ]
    .into_iter()
    .collect()
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub max_per_scanner: BTreeMap<ScannerId, usize>,
    /// Global concurrency cap across all scanners (spec §4.4: default 4).
    pub max_total: usize,
    /// Per-unit scanner timeout (spec §4.4, §5: default 60s).
    pub scanner_timeout: Duration,
    /// Per-session hard timeout (spec §5: 30 minutes).
    pub session_timeout: Duration,
    /// Subprocess kill grace period after a cancel signal (spec §5: 2s).
    pub cancel_grace_period: Duration,
    pub wave_api_key: Option<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_per_scanner: default_max_per_scanner(),
            max_total: 4,
            scanner_timeout: Duration::from_secs(60),
            session_timeout: Duration::from_secs(30 * 60),
            cancel_grace_period: Duration::from_secs(2),
            wave_api_key: std::env::var("WAVE_API_KEY").ok(),
        }
    }
}

/// Builder mirroring the teacher's config builder pattern; `build()`
/// validates rather than accepting any value silently (spec §1 ambient
/// stack: "Config validation at construction").
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfigBuilder {
    config: OrchestratorConfig,
}

impl OrchestratorConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self { config: OrchestratorConfig::default() }
    }

    #[must_use]
    pub fn max_total(mut self, value: usize) -> Self {
        self.config.max_total = value;
        self
    }

    #[must_use]
    pub fn scanner_timeout(mut self, value: Duration) -> Self {
        self.config.scanner_timeout = value;
        self
    }

    #[must_use]
    pub fn wave_api_key(mut self, value: Option<String>) -> Self {
        self.config.wave_api_key = value;
        self
    }

    pub fn build(self) -> Result<OrchestratorConfig, ConfigError> {
        if self.config.max_total == 0 {
            return Err(ConfigError::MaxTotalZero);
        }
        if self.config.max_per_scanner.values().any(|&v| v == 0) {
            return Err(ConfigError::MaxPerScannerZero);
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_max_total() {
        let result = OrchestratorConfigBuilder::new().max_total(0).build();
        assert!(matches!(result, Err(ConfigError::MaxTotalZero)));
    }

    #[test]
    fn default_config_builds() {
        assert!(OrchestratorConfigBuilder::new().build().is_ok());
    }
}
