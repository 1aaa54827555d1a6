//! Logging bootstrap for binaries and integration harnesses.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info,atelier=debug";

/// How log output is rendered.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    filter: String,
    /// Emit one JSON object per event instead of human-readable lines
    json: bool,
    /// Include module targets in human-readable output
    #[getter(skip)]
    with_target: bool,
}

impl LoggingConfig {
    /// Human-readable logs with the default filter.
    pub fn new() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            json: false,
            with_target: true,
        }
    }

    /// Use `debug` for every target.
    pub fn verbose(mut self, verbose: bool) -> Self {
        if verbose {
            self.filter = "debug".to_string();
        }
        self
    }

    /// Set the fallback filter directive.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Enable JSON-formatted logs.
    pub fn with_json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    /// Show or hide module targets.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Whether module targets are shown.
    pub fn shows_target(&self) -> bool {
        self.with_target
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter.
///
/// # Errors
///
/// Returns an error if the filter does not parse or a global subscriber was
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(config.with_target),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(config.with_target))
            .try_init()?;
    }

    tracing::debug!(json = config.json, "Logging initialized");
    Ok(())
}
