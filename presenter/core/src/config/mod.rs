//! TOML Configuration File Support
//!
//! Centralized configuration loading for the presentation engine, supporting
//! a TOML configuration file at `~/.config/buddy/presenter.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [reveal]
//! typewriter_delay_ms = 40
//! grace_period_ms = 500
//!
//! [avatar]
//! name = "INU BUDDY"
//! mouth_interval_ms = 150
//! idle_image = "idle_inu.png"
//! talk_image = "talk_inu.png"
//!
//! [[avatar.profiles]]
//! name = "SPECTRA"
//! idle_image = "idle.png"
//! talk_image = "talk.png"
//!
//! [transport]
//! base_url = "http://localhost:5000"
//! timeout_secs = 30
//!
//! [sound]
//! enabled = false
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animator::AvatarImages;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Reveal section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealToml {
    /// Delay between two revealed characters in milliseconds
    pub typewriter_delay_ms: Option<u64>,

    /// Wait after the queue empties before a turn may finish, in milliseconds
    pub grace_period_ms: Option<u64>,
}

/// One selectable avatar in the TOML configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarProfileToml {
    /// Display name
    pub name: String,
    /// Image shown while idle (and on the closed-mouth beat)
    pub idle_image: String,
    /// Image shown on the open-mouth beat
    pub talk_image: String,
}

/// Avatar section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarToml {
    /// Display name of the initial avatar
    pub name: Option<String>,

    /// Mouth swap interval in milliseconds
    pub mouth_interval_ms: Option<u64>,

    /// Idle image of the initial avatar
    pub idle_image: Option<String>,

    /// Talk image of the initial avatar
    pub talk_image: Option<String>,

    /// Additional avatars that can be switched to at runtime
    pub profiles: Vec<AvatarProfileToml>,
}

/// Transport section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportToml {
    /// Base URL of the chat relay
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Path of the streaming endpoint
    pub stream_path: Option<String>,

    /// Path of the whole-message endpoint
    pub chat_path: Option<String>,
}

/// Sound section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundToml {
    /// Whether type sounds are played at all
    pub enabled: Option<bool>,

    /// Minimum gap between two type sounds in milliseconds
    pub min_gap_ms: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterToml {
    /// Reveal pacing section
    pub reveal: RevealToml,

    /// Avatar section
    pub avatar: AvatarToml,

    /// Transport section
    pub transport: TransportToml,

    /// Sound section
    pub sound: SoundToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Pacing of the character reveal
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealConfig {
    /// Fixed delay between two revealed characters
    pub typewriter_delay: Duration,
    /// Grace period after the queue empties
    pub grace_period: Duration,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            typewriter_delay: Duration::from_millis(40),
            grace_period: Duration::from_millis(500),
        }
    }
}

/// A named idle/talk image pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarProfile {
    /// Display name, also used as the assistant prompt prefix
    pub name: String,
    /// Image pair
    pub images: AvatarImages,
}

impl AvatarProfile {
    /// Create a profile
    pub fn new(name: impl Into<String>, idle: impl Into<String>, talk: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            images: AvatarImages::new(idle, talk),
        }
    }
}

/// Avatar appearance and mouth timing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarConfig {
    /// Mouth swap interval
    pub mouth_interval: Duration,
    /// Selectable avatars; the first one is active on startup
    pub profiles: Vec<AvatarProfile>,
}

impl AvatarConfig {
    /// The avatar active on startup
    #[must_use]
    pub fn initial(&self) -> AvatarProfile {
        self.profiles
            .first()
            .cloned()
            .unwrap_or_else(|| AvatarProfile::new("BUDDY", "idle.png", "talk.png"))
    }
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            mouth_interval: Duration::from_millis(150),
            profiles: vec![
                AvatarProfile::new("INU BUDDY", "idle_inu.png", "talk_inu.png"),
                AvatarProfile::new("SPECTRA", "idle.png", "talk.png"),
            ],
        }
    }
}

/// Where the chat relay lives
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Streaming endpoint path
    pub stream_path: String,
    /// Whole-message endpoint path
    pub chat_path: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(30),
            stream_path: "/api/chat/stream".to_string(),
            chat_path: "/api/chat".to_string(),
        }
    }
}

/// Type sound settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundConfig {
    /// Whether type sounds are played
    pub enabled: bool,
    /// Minimum gap between two sounds
    pub min_gap: Duration,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_gap: Duration::from_millis(30),
        }
    }
}

/// Centralized configuration for the presentation engine
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug, Default)]
pub struct PresenterConfig {
    /// Reveal pacing
    pub reveal: RevealConfig,
    /// Avatar appearance
    pub avatar: AvatarConfig,
    /// Chat relay location
    pub transport: TransportConfig,
    /// Type sounds
    pub sound: SoundConfig,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    /// Highest-priority source that contributed a value
    source: Option<ConfigSource>,
}

impl PresenterConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source.unwrap_or(ConfigSource::Default)
    }

    fn mark(&mut self, source: ConfigSource) {
        self.source = Some(source);
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for zero intervals, a grace
    /// period shorter than the typewriter delay, or an empty avatar list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reveal.typewriter_delay.is_zero() {
            return Err(ConfigError::ValidationError(
                "reveal.typewriter_delay_ms must be greater than zero".to_string(),
            ));
        }
        if self.avatar.mouth_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "avatar.mouth_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.reveal.grace_period < self.reveal.typewriter_delay {
            return Err(ConfigError::ValidationError(format!(
                "reveal.grace_period_ms ({}) must not be shorter than reveal.typewriter_delay_ms ({})",
                self.reveal.grace_period.as_millis(),
                self.reveal.typewriter_delay.as_millis()
            )));
        }
        if self.avatar.profiles.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one avatar profile is required".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/buddy/presenter.toml` or
/// `~/.config/buddy/presenter.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("buddy").join("presenter.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// merged configuration fails validation. A missing config file is not an error.
pub fn load_config() -> Result<PresenterConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path, then the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<PresenterConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration using a custom environment lookup
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed, or
/// the result fails [`PresenterConfig::validate`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<PresenterConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = PresenterConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: PresenterToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.mark(ConfigSource::File);

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut PresenterConfig, toml: &PresenterToml) {
    if let Some(ms) = toml.reveal.typewriter_delay_ms {
        config.reveal.typewriter_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.reveal.grace_period_ms {
        config.reveal.grace_period = Duration::from_millis(ms);
    }

    if let Some(ms) = toml.avatar.mouth_interval_ms {
        config.avatar.mouth_interval = Duration::from_millis(ms);
    }
    let mut initial = config.avatar.initial();
    let touched_initial = toml.avatar.name.is_some()
        || toml.avatar.idle_image.is_some()
        || toml.avatar.talk_image.is_some();
    if let Some(ref name) = toml.avatar.name {
        initial.name.clone_from(name);
    }
    if let Some(ref idle) = toml.avatar.idle_image {
        initial.images.idle.clone_from(idle);
    }
    if let Some(ref talk) = toml.avatar.talk_image {
        initial.images.talk.clone_from(talk);
    }
    if touched_initial || !toml.avatar.profiles.is_empty() {
        let mut profiles = vec![initial];
        profiles.extend(
            toml.avatar
                .profiles
                .iter()
                .map(|p| AvatarProfile::new(&p.name, &p.idle_image, &p.talk_image)),
        );
        config.avatar.profiles = profiles;
    }

    if let Some(ref url) = toml.transport.base_url {
        config.transport.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = toml.transport.timeout_secs {
        config.transport.timeout = Duration::from_secs(secs);
    }
    if let Some(ref path) = toml.transport.stream_path {
        config.transport.stream_path.clone_from(path);
    }
    if let Some(ref path) = toml.transport.chat_path {
        config.transport.chat_path.clone_from(path);
    }

    if let Some(enabled) = toml.sound.enabled {
        config.sound.enabled = enabled;
    }
    if let Some(ms) = toml.sound.min_gap_ms {
        config.sound.min_gap = Duration::from_millis(ms);
    }
}

fn env_millis<F>(env: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = env(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring non-numeric environment value");
            None
        }
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut PresenterConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(delay) = env_millis(&env, "BUDDY_TYPEWRITER_DELAY_MS") {
        config.reveal.typewriter_delay = delay;
        config.mark(ConfigSource::Env);
    }
    if let Some(grace) = env_millis(&env, "BUDDY_GRACE_PERIOD_MS") {
        config.reveal.grace_period = grace;
        config.mark(ConfigSource::Env);
    }
    if let Some(interval) = env_millis(&env, "BUDDY_MOUTH_INTERVAL_MS") {
        config.avatar.mouth_interval = interval;
        config.mark(ConfigSource::Env);
    }
    if let Some(url) = env("BUDDY_BASE_URL") {
        config.transport.base_url = url.trim_end_matches('/').to_string();
        config.mark(ConfigSource::Env);
    }
    if let Some(enabled) = env("BUDDY_SOUND") {
        config.sound.enabled = enabled == "1" || enabled.eq_ignore_ascii_case("true");
        config.mark(ConfigSource::Env);
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub base_url: Option<String>,

    /// Typewriter delay override (milliseconds)
    pub typewriter_delay_ms: Option<u64>,

    /// Mouth interval override (milliseconds)
    pub mouth_interval_ms: Option<u64>,

    /// Grace period override (milliseconds)
    pub grace_period_ms: Option<u64>,

    /// Sound enabled override
    pub sound_enabled: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set typewriter delay override
    #[must_use]
    pub fn with_typewriter_delay_ms(mut self, ms: u64) -> Self {
        self.typewriter_delay_ms = Some(ms);
        self
    }

    /// Set mouth interval override
    #[must_use]
    pub fn with_mouth_interval_ms(mut self, ms: u64) -> Self {
        self.mouth_interval_ms = Some(ms);
        self
    }

    /// Set grace period override
    #[must_use]
    pub fn with_grace_period_ms(mut self, ms: u64) -> Self {
        self.grace_period_ms = Some(ms);
        self
    }

    /// Set sound override
    #[must_use]
    pub fn with_sound(mut self, enabled: bool) -> Self {
        self.sound_enabled = Some(enabled);
        self
    }

    /// Check if any overrides are set
    #[must_use]
    pub fn has_overrides(&self) -> bool {
        self.base_url.is_some()
            || self.typewriter_delay_ms.is_some()
            || self.mouth_interval_ms.is_some()
            || self.grace_period_ms.is_some()
            || self.sound_enabled.is_some()
    }

    /// Apply overrides to a configuration and re-validate it
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the overridden values are
    /// inconsistent.
    pub fn apply(&self, config: &mut PresenterConfig) -> Result<(), ConfigError> {
        if let Some(ref url) = self.base_url {
            config.transport.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = self.typewriter_delay_ms {
            config.reveal.typewriter_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.mouth_interval_ms {
            config.avatar.mouth_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.grace_period_ms {
            config.reveal.grace_period = Duration::from_millis(ms);
        }
        if let Some(enabled) = self.sound_enabled {
            config.sound.enabled = enabled;
        }
        if self.has_overrides() {
            config.mark(ConfigSource::Cli);
        }
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = PresenterConfig::default();
        assert_eq!(config.reveal.typewriter_delay, Duration::from_millis(40));
        assert_eq!(config.reveal.grace_period, Duration::from_millis(500));
        assert_eq!(config.avatar.mouth_interval, Duration::from_millis(150));
        assert_eq!(config.avatar.initial().name, "INU BUDDY");
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            load_config_with_env(Some(PathBuf::from("/nonexistent/presenter.toml")), no_env)
                .unwrap();
        assert!(config.config_file_path.is_none());
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_toml_file_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[reveal]
typewriter_delay_ms = 25
grace_period_ms = 300

[avatar]
name = "KITSUNE"
mouth_interval_ms = 90
idle_image = "fox_idle.txt"
talk_image = "fox_talk.txt"

[[avatar.profiles]]
name = "SPECTRA"
idle_image = "idle.png"
talk_image = "talk.png"

[transport]
base_url = "http://relay.local:8080/"
"#
        )
        .unwrap();

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.reveal.typewriter_delay, Duration::from_millis(25));
        assert_eq!(config.reveal.grace_period, Duration::from_millis(300));
        assert_eq!(config.avatar.mouth_interval, Duration::from_millis(90));
        assert_eq!(config.avatar.profiles.len(), 2);
        assert_eq!(
            config.avatar.initial(),
            AvatarProfile::new("KITSUNE", "fox_idle.txt", "fox_talk.txt")
        );
        assert_eq!(config.transport.base_url, "http://relay.local:8080");
        assert_eq!(config.source(), ConfigSource::File);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[reveal]\ntypewriter_delay_ms = 25").unwrap();

        let env: HashMap<&str, &str> = [
            ("BUDDY_TYPEWRITER_DELAY_MS", "60"),
            ("BUDDY_SOUND", "true"),
        ]
        .into_iter()
        .collect();

        let config = load_config_with_env(Some(file.path().to_path_buf()), |key| {
            env.get(key).map(|v| (*v).to_string())
        })
        .unwrap();
        assert_eq!(config.reveal.typewriter_delay, Duration::from_millis(60));
        assert!(config.sound.enabled);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_non_numeric_env_is_ignored() {
        let config = load_config_with_env(None, |key| {
            (key == "BUDDY_GRACE_PERIOD_MS").then(|| "soon".to_string())
        })
        .unwrap();
        assert_eq!(config.reveal.grace_period, Duration::from_millis(500));
    }

    #[test]
    fn test_zero_env_delay_rejected() {
        let result = load_config_with_env(None, |key| {
            (key == "BUDDY_TYPEWRITER_DELAY_MS").then(|| "0".to_string())
        });
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[reveal\ntypewriter_delay_ms = ").unwrap();
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_grace_shorter_than_delay_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[reveal]\ntypewriter_delay_ms = 100\ngrace_period_ms = 50").unwrap();
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = PresenterConfig::default();
        let overrides = ConfigOverrides::new()
            .with_base_url("http://example.com/")
            .with_typewriter_delay_ms(10)
            .with_mouth_interval_ms(80)
            .with_grace_period_ms(200)
            .with_sound(true);
        assert!(overrides.has_overrides());

        overrides.apply(&mut config).unwrap();
        assert_eq!(config.transport.base_url, "http://example.com");
        assert_eq!(config.reveal.typewriter_delay, Duration::from_millis(10));
        assert_eq!(config.avatar.mouth_interval, Duration::from_millis(80));
        assert_eq!(config.reveal.grace_period, Duration::from_millis(200));
        assert!(config.sound.enabled);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_cli_zero_delay_rejected() {
        let mut config = PresenterConfig::default();
        let result = ConfigOverrides::new()
            .with_typewriter_delay_ms(0)
            .apply(&mut config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }
}
