//! Kiosk configuration with TOML file support.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use svims_scoring::ScorePolicy;
use svims_types::FixedOffset;
use svims_verification::{CodePolicy, ReferenceDelays, VisitorDirectory, WorkflowTimeouts};

use crate::logging::LogFormat;
use crate::KioskError;

/// Configuration for one kiosk.
///
/// Loaded once at start-up via [`KioskConfig::from_toml_file`] or built
/// programmatically (e.g. for tests). Every field has a default, so an empty
/// file yields the reference setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KioskConfig {
    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Trust score weights and thresholds.
    #[serde(default)]
    pub scoring: ScorePolicy,

    /// Regular and blocked identity keys used by the reference provider.
    #[serde(default)]
    pub directory: VisitorDirectory,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// One-time code limits.
    #[serde(default)]
    pub code: CodePolicy,

    /// Pacing of the reference provider.
    #[serde(default)]
    pub mock: MockConfig,

    #[serde(default)]
    pub records: RecordsConfig,

    #[serde(default)]
    pub sessions: SessionsConfig,
}

/// Provider call bounds, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub lookup_ms: u64,
    pub code_dispatch_ms: u64,
    pub code_verify_ms: u64,
    pub biometric_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            lookup_ms: 5_000,
            code_dispatch_ms: 10_000,
            code_verify_ms: 10_000,
            biometric_ms: 15_000,
        }
    }
}

/// Reference provider delays, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    pub dispatch_ms: u64,
    pub verify_ms: u64,
    pub analysis_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            dispatch_ms: 800,
            verify_ms: 800,
            analysis_ms: 1_500,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    /// Remote record store URL. Records stay local when unset.
    pub endpoint: Option<String>,
    pub timeout_ms: u64,
    /// Records kept for the dashboard.
    pub cache_capacity: usize,
    /// Kiosk local time as minutes east of UTC; record dates and times are
    /// written in it. `330` for India.
    pub utc_offset_minutes: i32,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: 10_000,
            cache_capacity: svims_records::cache::DEFAULT_CAPACITY,
            utc_offset_minutes: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Seconds after arrival an unfinished session is dropped.
    pub idle_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self { idle_secs: 1_800 }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl KioskConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, KioskError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| KioskError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, KioskError> {
        toml::from_str(s).map_err(|e| KioskError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        // plain data with string keys only
        toml::to_string_pretty(self).expect("KioskConfig is always serializable to TOML")
    }

    /// Reject settings the kiosk cannot run with.
    pub fn validate(&self) -> Result<(), KioskError> {
        self.scoring.validate()?;
        self.log_format()?;
        if self.code.max_attempts == 0 {
            return Err(KioskError::Config("code.max_attempts must be at least 1".into()));
        }
        if self.code.ttl_secs == 0 {
            return Err(KioskError::Config("code.ttl_secs must be at least 1".into()));
        }
        let t = &self.timeouts;
        if [t.lookup_ms, t.code_dispatch_ms, t.code_verify_ms, t.biometric_ms].contains(&0) {
            return Err(KioskError::Config("timeouts must be non-zero".into()));
        }
        if let Some(endpoint) = &self.records.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(KioskError::Config(format!(
                    "records.endpoint must be an http(s) URL, got {endpoint:?}"
                )));
            }
        }
        if self.records.timeout_ms == 0 {
            return Err(KioskError::Config("records.timeout_ms must be non-zero".into()));
        }
        self.display_offset()?;
        if self.sessions.idle_secs == 0 {
            return Err(KioskError::Config("sessions.idle_secs must be non-zero".into()));
        }
        Ok(())
    }

    pub fn log_format(&self) -> Result<LogFormat, KioskError> {
        self.log_format.parse()
    }

    pub fn workflow_timeouts(&self) -> WorkflowTimeouts {
        WorkflowTimeouts {
            lookup: Duration::from_millis(self.timeouts.lookup_ms),
            code_dispatch: Duration::from_millis(self.timeouts.code_dispatch_ms),
            code_verify: Duration::from_millis(self.timeouts.code_verify_ms),
            biometric: Duration::from_millis(self.timeouts.biometric_ms),
        }
    }

    pub fn reference_delays(&self) -> ReferenceDelays {
        ReferenceDelays {
            dispatch: Duration::from_millis(self.mock.dispatch_ms),
            verify: Duration::from_millis(self.mock.verify_ms),
            analysis: Duration::from_millis(self.mock.analysis_ms),
        }
    }

    pub fn records_timeout(&self) -> Duration {
        Duration::from_millis(self.records.timeout_ms)
    }

    /// Offset record dates and times are rendered at.
    pub fn display_offset(&self) -> Result<FixedOffset, KioskError> {
        svims_types::utc_offset(self.records.utc_offset_minutes)
            .map_err(|e| KioskError::Config(format!("records.utc_offset_minutes: {e}")))
    }
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            log_level: default_log_level(),
            scoring: ScorePolicy::default(),
            directory: VisitorDirectory::default(),
            timeouts: TimeoutConfig::default(),
            code: CodePolicy::default(),
            mock: MockConfig::default(),
            records: RecordsConfig::default(),
            sessions: SessionsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = KioskConfig::default();
        let parsed = KioskConfig::from_toml_str(&config.to_toml_string()).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn empty_toml_uses_reference_setup() {
        let config = KioskConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.log_format, "human");
        assert_eq!(config.scoring.allow_threshold, 80);
        assert_eq!(config.scoring.deny_threshold, 50);
        assert!(config.directory.is_regular("9876"));
        assert!(config.directory.is_blocked("0000"));
        assert_eq!(config.mock.analysis_ms, 1_500);
        assert_eq!(config.records.endpoint, None);
        assert_eq!(config.records.utc_offset_minutes, 0);
        assert_eq!(config.sessions.idle_secs, 1_800);
        config.validate().unwrap();
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            log_format = "json"

            [scoring]
            allow_threshold = 75

            [directory]
            regular_visitors = ["4242"]

            [code]
            max_attempts = 5

            [records]
            endpoint = "https://records.example/exec"
        "#;
        let config = KioskConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);
        assert_eq!(config.scoring.allow_threshold, 75);
        assert_eq!(config.scoring.deny_threshold, 50);
        assert!(config.directory.is_regular("4242"));
        assert!(!config.directory.is_regular("9876"));
        assert_eq!(config.code.max_attempts, 5);
        assert_eq!(config.code.max_resends, 2);
        assert_eq!(
            config.records.endpoint.as_deref(),
            Some("https://records.example/exec")
        );
        config.validate().unwrap();
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let toml = r#"
            [scoring]
            allow_threshold = 40
            deny_threshold = 60
        "#;
        let config = KioskConfig::from_toml_str(toml).unwrap();
        assert!(matches!(config.validate(), Err(KioskError::Scoring(_))));
    }

    #[test]
    fn bad_settings_are_config_errors() {
        let mut config = KioskConfig::default();
        config.log_format = "xml".into();
        assert!(matches!(config.validate(), Err(KioskError::Config(_))));

        let mut config = KioskConfig::default();
        config.timeouts.biometric_ms = 0;
        assert!(matches!(config.validate(), Err(KioskError::Config(_))));

        let mut config = KioskConfig::default();
        config.records.endpoint = Some("ftp://records".into());
        assert!(matches!(config.validate(), Err(KioskError::Config(_))));

        let mut config = KioskConfig::default();
        config.records.utc_offset_minutes = 15 * 60;
        assert!(matches!(config.validate(), Err(KioskError::Config(_))));

        let mut config = KioskConfig::default();
        config.sessions.idle_secs = 0;
        assert!(matches!(config.validate(), Err(KioskError::Config(_))));
    }

    #[test]
    fn local_offset_from_toml() {
        let toml = r#"
            [records]
            utc_offset_minutes = 330

            [sessions]
            idle_secs = 600
        "#;
        let config = KioskConfig::from_toml_str(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.display_offset().unwrap().local_minus_utc(), 330 * 60);
        assert_eq!(config.sessions.idle_secs, 600);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"debug\"\n[mock]\ndispatch_ms = 0").unwrap();
        let config = KioskConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.reference_delays().dispatch, Duration::ZERO);
        assert_eq!(config.reference_delays().verify, Duration::from_millis(800));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = KioskConfig::from_toml_file("/nonexistent/kiosk.toml");
        assert!(matches!(result, Err(KioskError::Config(_))));
    }
}
