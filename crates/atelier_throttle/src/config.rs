//! Configuration for throttling and model selection.
//!
//! Configuration sources, later ones overriding earlier ones key by key:
//! 1. Bundled defaults (`atelier.toml` compiled into the library)
//! 2. `~/.config/atelier/atelier.toml`
//! 3. `./atelier.toml`

use std::time::Duration;

use atelier_error::{AtelierError, AtelierResult, ConfigError, ThrottleError, ThrottleErrorKind};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::TrafficClass;

/// Cooldown after a high-capability dispatch; keeps under 2 requests per minute.
pub const HIGH_CAPABILITY_COOLDOWN_MS: u64 = 32_000;

/// Cooldown after a fast dispatch; keeps under 15 requests per minute.
pub const FAST_COOLDOWN_MS: u64 = 5_000;

/// Attempts per request, including the first.
pub const MAX_ATTEMPTS: u32 = 2;

/// How far both classes are pushed after a quota violation.
pub const QUOTA_RESET_MS: u64 = 60_000;

/// Pause before retrying a 503 or 504.
pub const TRANSIENT_BACKOFF_MS: u64 = 5_000;

/// Settings for one traffic class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ClassConfig {
    /// Minimum spacing between dispatches, in milliseconds
    pub cooldown_ms: u64,
}

impl ClassConfig {
    /// Cooldown as a [`Duration`].
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Throttling and retry settings.
///
/// # Example
///
/// ```toml
/// [throttle]
/// max_attempts = 2
/// quota_reset_ms = 60_000
/// transient_backoff_ms = 5_000
///
/// [throttle.high_capability]
/// cooldown_ms = 32_000
///
/// [throttle.fast]
/// cooldown_ms = 5_000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// "pro" tier window
    pub high_capability: ClassConfig,
    /// "flash" tier window
    pub fast: ClassConfig,
    /// Attempts per request, including the first
    pub max_attempts: u32,
    /// Reset applied to both classes on a quota violation, in milliseconds
    pub quota_reset_ms: u64,
    /// Backoff before retrying a transient failure, in milliseconds
    pub transient_backoff_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            high_capability: ClassConfig {
                cooldown_ms: HIGH_CAPABILITY_COOLDOWN_MS,
            },
            fast: ClassConfig {
                cooldown_ms: FAST_COOLDOWN_MS,
            },
            max_attempts: MAX_ATTEMPTS,
            quota_reset_ms: QUOTA_RESET_MS,
            transient_backoff_ms: TRANSIENT_BACKOFF_MS,
        }
    }
}

impl ThrottleConfig {
    /// Settings for `class`.
    pub fn class(&self, class: TrafficClass) -> &ClassConfig {
        match class {
            TrafficClass::HighCapability => &self.high_capability,
            TrafficClass::Fast => &self.fast,
        }
    }

    /// Quota reset as a [`Duration`].
    pub fn quota_reset(&self) -> Duration {
        Duration::from_millis(self.quota_reset_ms)
    }

    /// Transient backoff as a [`Duration`].
    pub fn transient_backoff(&self) -> Duration {
        Duration::from_millis(self.transient_backoff_ms)
    }

    /// Reject settings the request manager cannot honour.
    ///
    /// # Errors
    ///
    /// Returns an error if no attempt is allowed or any window or delay is zero.
    pub fn validate(&self) -> Result<(), ThrottleError> {
        if self.max_attempts == 0 {
            return Err(ThrottleError::new(ThrottleErrorKind::NoAttempts(
                self.max_attempts,
            )));
        }

        for class in [TrafficClass::HighCapability, TrafficClass::Fast] {
            if self.class(class).cooldown_ms == 0 {
                return Err(ThrottleError::new(ThrottleErrorKind::ZeroCooldown(
                    class.to_string(),
                )));
            }
        }

        if self.quota_reset_ms == 0 {
            return Err(ThrottleError::new(ThrottleErrorKind::ZeroDelay(
                "quota_reset_ms".to_string(),
            )));
        }
        if self.transient_backoff_ms == 0 {
            return Err(ThrottleError::new(ThrottleErrorKind::ZeroDelay(
                "transient_backoff_ms".to_string(),
            )));
        }

        Ok(())
    }
}

/// Model id used by each stylist operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelCatalog {
    /// Image generation
    pub image: String,
    /// Deep stylist reasoning
    pub deep: String,
    /// Style video generation
    pub video: String,
    /// Grounded shopping analysis
    pub shopping: String,
    /// Image editing
    pub edit_image: String,
    /// Quick text analysis
    pub fast_analyze: String,
    /// Maps-grounded boutique search
    pub boutiques: String,
    /// Single-item categorization
    pub categorize: String,
    /// Multi-item detection
    pub separate: String,
    /// Background removal
    pub clean_background: String,
    /// Outfit suggestions
    pub outfits: String,
    /// Text to speech
    pub speech: String,
    /// Live voice consult
    pub live: String,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            image: "gemini-3-pro-image-preview".to_string(),
            deep: "gemini-3-pro-preview".to_string(),
            video: "veo-3.1-fast-generate-preview".to_string(),
            shopping: "gemini-3-pro-preview".to_string(),
            edit_image: "gemini-2.5-flash-image".to_string(),
            fast_analyze: "gemini-flash-lite-latest".to_string(),
            boutiques: "gemini-2.5-flash".to_string(),
            categorize: "gemini-flash-lite-latest".to_string(),
            separate: "gemini-3-flash-preview".to_string(),
            clean_background: "gemini-2.5-flash-image".to_string(),
            outfits: "gemini-3-flash-preview".to_string(),
            speech: "gemini-2.5-flash-preview-tts".to_string(),
            live: "gemini-2.5-flash-native-audio-preview-09-2025".to_string(),
        }
    }
}

/// Top-level Atelier configuration.
///
/// # Example
///
/// ```no_run
/// use atelier_throttle::AtelierConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AtelierConfig::load()?;
/// println!("fast cooldown: {:?}", config.throttle.fast.cooldown());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct AtelierConfig {
    /// Throttling and retry settings
    #[serde(default)]
    pub throttle: ThrottleConfig,
    /// Model ids per operation
    #[serde(default)]
    pub models: ModelCatalog,
}

impl AtelierConfig {
    /// Load configuration from a specific file path.
    ///
    /// Keys missing from the file take their built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> AtelierResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                AtelierError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                AtelierError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.throttle.validate()?;
        Ok(config)
    }

    /// Load bundled defaults overlaid with optional user files.
    ///
    /// User files are skipped silently when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or the merged
    /// throttle settings are invalid.
    #[instrument]
    pub fn load() -> AtelierResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../atelier.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/atelier/atelier.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("atelier").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| {
                AtelierError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                AtelierError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;

        config.throttle.validate()?;
        debug!(
            max_attempts = config.throttle.max_attempts,
            high_capability_ms = config.throttle.high_capability.cooldown_ms,
            fast_ms = config.throttle.fast.cooldown_ms,
            "Configuration loaded"
        );
        Ok(config)
    }
}
