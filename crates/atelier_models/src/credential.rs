//! API key selection.

use std::sync::{PoisonError, RwLock};

use atelier_error::{GeminiError, GeminiErrorKind};
use tracing::{debug, info};

use crate::GeminiResult;

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Host capability that owns the user's API key.
///
/// The stylist asks for the key on every request, so reselecting a key takes
/// effect without rebuilding anything.
pub trait CredentialProvider: Send + Sync {
    /// The currently selected key.
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` when no key is selected.
    fn api_key(&self) -> GeminiResult<String>;

    /// Whether a key is currently selected.
    fn has_selected_key(&self) -> bool {
        self.api_key().is_ok()
    }

    /// Ask the host to (re)select a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the host could not select a key.
    fn open_select_key(&self) -> GeminiResult<()>;
}

/// Key read from `GEMINI_API_KEY`.
///
/// [`CredentialProvider::open_select_key`] re-reads the variable, so a key
/// exported after startup (or loaded from `.env`) can be picked up.
#[derive(Debug)]
pub struct EnvCredentials {
    var: String,
    key: RwLock<Option<String>>,
}

impl EnvCredentials {
    /// Read the key from `GEMINI_API_KEY`.
    pub fn new() -> Self {
        Self::from_var(API_KEY_VAR)
    }

    /// Read the key from a different variable.
    pub fn from_var(var: impl Into<String>) -> Self {
        let var = var.into();
        let key = read_var(&var);
        debug!(var = %var, present = key.is_some(), "Read API key from environment");
        Self {
            var,
            key: RwLock::new(key),
        }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new()
    }
}

fn read_var(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|key| !key.trim().is_empty())
}

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> GeminiResult<String> {
        self.key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| GeminiError::new(GeminiErrorKind::MissingApiKey))
    }

    fn open_select_key(&self) -> GeminiResult<()> {
        let key = read_var(&self.var);
        let found = key.is_some();
        *self.key.write().unwrap_or_else(PoisonError::into_inner) = key;

        if found {
            info!(var = %self.var, "API key reloaded");
            Ok(())
        } else {
            Err(GeminiError::new(GeminiErrorKind::MissingApiKey))
        }
    }
}

/// A fixed key, for tests and embedding.
#[derive(Debug, Clone)]
pub struct StaticCredentials(String);

impl StaticCredentials {
    /// Use `key` for every request.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> GeminiResult<String> {
        if self.0.is_empty() {
            return Err(GeminiError::new(GeminiErrorKind::MissingApiKey));
        }
        Ok(self.0.clone())
    }

    fn open_select_key(&self) -> GeminiResult<()> {
        self.api_key().map(|_| ())
    }
}
