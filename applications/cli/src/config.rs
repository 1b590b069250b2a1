/// Application configuration
use crate::error::{ConfigError, Result};
use lyra_audio_desktop::FetchSettings;
use lyra_playback::{ManualSkipAtEnd, PlayerConfig, SourcePolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "lyra.toml";

/// Environment variable prefix (`LYRA_PLAYER__VOLUME=0.5`)
pub const ENV_PREFIX: &str = "LYRA";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_player")]
    pub player: PlayerSettings,

    #[serde(default = "default_audio")]
    pub audio: AudioSettings,

    #[serde(default = "default_logging")]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayerSettings {
    #[serde(default = "default_volume")]
    pub volume: f32,

    #[serde(default = "default_history_size")]
    pub history_size: usize,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_restart_threshold_secs")]
    pub restart_threshold_secs: f64,

    #[serde(default)]
    pub manual_skip_at_end: ManualSkipAtEnd,

    #[serde(default)]
    pub source_policy: SourcePolicy,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AudioSettings {
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Largest media file accepted, in MiB
    #[serde(default = "default_max_fetch_mb")]
    pub max_fetch_mb: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// `tracing` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl AppConfig {
    /// Load configuration from defaults, file and environment
    ///
    /// An explicit `path` must exist; otherwise `lyra.toml` is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(
            path,
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }

    /// Load with a caller-supplied environment source
    pub fn load_with(path: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        settings = settings.add_source(environment);

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let player = &self.player;

        if !player.volume.is_finite() || !(0.0..=1.0).contains(&player.volume) {
            return Err(ConfigError::Invalid(format!(
                "player.volume must be between 0.0 and 1.0 (got {})",
                player.volume
            )));
        }

        if !(1..=500).contains(&player.history_size) {
            return Err(ConfigError::Invalid(format!(
                "player.history_size must be between 1 and 500 (got {})",
                player.history_size
            )));
        }

        if !(50..=60_000).contains(&player.poll_interval_ms) {
            return Err(ConfigError::Invalid(format!(
                "player.poll_interval_ms must be between 50 and 60000 (got {})",
                player.poll_interval_ms
            )));
        }

        if !player.restart_threshold_secs.is_finite() || player.restart_threshold_secs < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "player.restart_threshold_secs must be a non-negative number (got {})",
                player.restart_threshold_secs
            )));
        }

        if self.audio.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "audio.fetch_timeout_secs must be at least 1".to_string(),
            ));
        }

        if !(1..=4096).contains(&self.audio.max_fetch_mb) {
            return Err(ConfigError::Invalid(format!(
                "audio.max_fetch_mb must be between 1 and 4096 (got {})",
                self.audio.max_fetch_mb
            )));
        }

        if self.audio.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "audio.user_agent must not be empty".to_string(),
            ));
        }

        if let Err(e) = EnvFilter::try_new(&self.logging.filter) {
            return Err(ConfigError::Invalid(format!(
                "logging.filter is not a valid filter: {e}"
            )));
        }

        Ok(())
    }

    /// Controller configuration
    pub fn to_player_config(&self) -> PlayerConfig {
        PlayerConfig {
            history_size: self.player.history_size,
            volume: self.player.volume,
            restart_threshold: Duration::try_from_secs_f64(self.player.restart_threshold_secs)
                .unwrap_or_default(),
            position_poll_interval: Duration::from_millis(self.player.poll_interval_ms),
            manual_skip_at_end: self.player.manual_skip_at_end,
            source_policy: self.player.source_policy,
        }
    }

    /// Media fetch configuration
    pub fn to_fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: Duration::from_secs(self.audio.fetch_timeout_secs),
            user_agent: self.audio.user_agent.clone(),
            max_bytes: self.audio.max_fetch_mb * 1024 * 1024,
        }
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// Default values
fn default_player() -> PlayerSettings {
    PlayerSettings {
        volume: default_volume(),
        history_size: default_history_size(),
        poll_interval_ms: default_poll_interval_ms(),
        restart_threshold_secs: default_restart_threshold_secs(),
        manual_skip_at_end: ManualSkipAtEnd::default(),
        source_policy: SourcePolicy::default(),
    }
}

fn default_volume() -> f32 {
    lyra_playback::DEFAULT_VOLUME
}

fn default_history_size() -> usize {
    20
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_restart_threshold_secs() -> f64 {
    3.0
}

fn default_audio() -> AudioSettings {
    AudioSettings {
        fetch_timeout_secs: default_fetch_timeout_secs(),
        user_agent: default_user_agent(),
        max_fetch_mb: default_max_fetch_mb(),
    }
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_max_fetch_mb() -> u64 {
    FetchSettings::default().max_bytes / (1024 * 1024)
}

fn default_user_agent() -> String {
    FetchSettings::default().user_agent
}

fn default_logging() -> LoggingSettings {
    LoggingSettings {
        filter: default_filter(),
    }
}

fn default_filter() -> String {
    "lyra=info,lyra_cli=info,lyra_playback=info,lyra_audio_desktop=warn".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            player: default_player(),
            audio: default_audio(),
            logging: default_logging(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(Some(map))
    }

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lyra.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_defaults_match_player_defaults() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.to_player_config(), PlayerConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let (_dir, path) = write_config(
            r#"
[player]
volume = 0.4
history_size = 5
manual_skip_at_end = "stop"
source_policy = "highest_bitrate"

[audio]
fetch_timeout_secs = 10
"#,
        );

        let config = AppConfig::load_with(Some(&path), env(&[])).unwrap();
        assert_eq!(config.player.volume, 0.4);
        assert_eq!(config.player.history_size, 5);
        assert_eq!(config.player.manual_skip_at_end, ManualSkipAtEnd::Stop);
        assert_eq!(config.player.source_policy, SourcePolicy::HighestBitrate);
        assert_eq!(config.audio.fetch_timeout_secs, 10);

        // Untouched keys keep their defaults
        assert_eq!(config.player.poll_interval_ms, 1000);
        assert_eq!(config.logging, default_logging());
    }

    #[test]
    fn test_environment_overrides_file() {
        let (_dir, path) = write_config("[player]\nvolume = 0.4\n");

        let config = AppConfig::load_with(
            Some(&path),
            env(&[
                ("LYRA_PLAYER__VOLUME", "0.9"),
                ("LYRA_PLAYER__POLL_INTERVAL_MS", "250"),
            ]),
        )
        .unwrap();

        assert_eq!(config.player.volume, 0.9);
        assert_eq!(config.player.poll_interval_ms, 250);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let result = AppConfig::load_with(Some(&path), env(&[]));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let mut config = AppConfig::default();
        config.player.volume = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.player.history_size = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.player.poll_interval_ms = 10;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.player.restart_threshold_secs = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.audio.max_fetch_mb = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.audio.user_agent = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.filter = "lyra=loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_file_values_fail_load() {
        let (_dir, path) = write_config("[player]\nvolume = 3.0\n");
        let result = AppConfig::load_with(Some(&path), env(&[]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_conversions() {
        let mut config = AppConfig::default();
        config.player.restart_threshold_secs = 1.5;
        config.player.poll_interval_ms = 500;
        config.audio.fetch_timeout_secs = 7;
        config.audio.max_fetch_mb = 2;

        let player = config.to_player_config();
        assert_eq!(player.restart_threshold, Duration::from_millis(1500));
        assert_eq!(player.position_poll_interval, Duration::from_millis(500));

        let fetch = config.to_fetch_settings();
        assert_eq!(fetch.timeout, Duration::from_secs(7));
        assert_eq!(fetch.user_agent, config.audio.user_agent);
        assert_eq!(fetch.max_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_rendered_toml_loads_back() {
        let mut config = AppConfig::default();
        config.player.volume = 0.25;
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[player]"));

        let (_dir, path) = write_config(&rendered);
        let loaded = AppConfig::load_with(Some(&path), env(&[])).unwrap();
        assert_eq!(loaded, config);
    }
}
