// Extraction service configuration and secrets management
//
// API keys are stored securely using:
// 1. System keychain (preferred)
// 2. Environment variables (fallback for CI/headless)
//
// Keys are NEVER stored in settings.json

use std::env;

use crate::settings::{ExtractionProvider, ExtractionSettings};

/// Service name for keychain storage
const KEYCHAIN_SERVICE: &str = "parceltrack";

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Key retrieved from system keychain
    Keychain,
    /// Key retrieved from environment variable
    Environment,
    /// No key found
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Keychain => "keychain",
            KeySource::Environment => "environment",
            KeySource::None => "none",
        }
    }
}

/// Result of key lookup
#[derive(Debug, Clone)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

/// Get the environment variable name for a provider
pub fn env_var_name(provider: &str) -> String {
    format!("PARCELTRACK_{}_KEY", provider.to_uppercase())
}

/// Get the keychain account name for a provider
fn keychain_account(provider: &str) -> String {
    format!("extraction/{}", provider.to_lowercase())
}

/// Get an API key for the specified provider
///
/// Checks in order:
/// 1. System keychain
/// 2. Environment variable (PARCELTRACK_GEMINI_KEY, etc.)
pub fn get_api_key(provider: &str) -> KeyLookup {
    #[cfg(feature = "keychain")]
    {
        if let Ok(entry) = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider)) {
            if let Ok(key) = entry.get_password() {
                return KeyLookup {
                    key: Some(key),
                    source: KeySource::Keychain,
                };
            }
        }
    }

    let env_name = env_var_name(provider);
    if let Ok(key) = env::var(&env_name) {
        if !key.is_empty() {
            return KeyLookup {
                key: Some(key),
                source: KeySource::Environment,
            };
        }
    }

    KeyLookup {
        key: None,
        source: KeySource::None,
    }
}

/// Store an API key in the system keychain
#[cfg(feature = "keychain")]
pub fn set_api_key(provider: &str, key: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider))
        .map_err(|e| format!("Failed to create keychain entry: {}", e))?;

    entry
        .set_password(key)
        .map_err(|e| format!("Failed to store key in keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn set_api_key(_provider: &str, _key: &str) -> Result<(), String> {
    Err("Keychain support not enabled. Set PARCELTRACK_<PROVIDER>_KEY environment variable instead.".to_string())
}

/// Delete an API key from the system keychain
#[cfg(feature = "keychain")]
pub fn delete_api_key(provider: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider))
        .map_err(|e| format!("Failed to access keychain entry: {}", e))?;

    entry
        .delete_credential()
        .map_err(|e| format!("Failed to delete key from keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn delete_api_key(_provider: &str) -> Result<(), String> {
    Err("Keychain support not enabled.".to_string())
}

/// Check if keychain support is available
pub fn keychain_available() -> bool {
    #[cfg(feature = "keychain")]
    {
        keyring::Entry::new(KEYCHAIN_SERVICE, "test").is_ok()
    }
    #[cfg(not(feature = "keychain"))]
    {
        false
    }
}

// ============================================================================
// Resolved extraction configuration
// ============================================================================

/// Status of the extraction configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionConfigStatus {
    /// Extraction is disabled (provider = none)
    Disabled,
    /// Provider selected and key present
    Ready,
    /// Provider selected but API key is missing
    MissingKey,
}

impl ExtractionConfigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Ready => "ready",
            Self::MissingKey => "missing_key",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// The effective extraction configuration, fully resolved from settings,
/// keychain and environment.
#[derive(Debug, Clone)]
pub struct ResolvedExtractionConfig {
    pub provider: ExtractionProvider,
    /// Effective model (settings or provider default)
    pub model: String,
    /// Effective API base URL
    pub endpoint: String,
    pub timeout_secs: u64,
    pub api_key: Option<String>,
    pub key_source: KeySource,
    pub status: ExtractionConfigStatus,
    /// Human-readable reason if not ready
    pub blocking_reason: Option<String>,
}

impl ResolvedExtractionConfig {
    /// Resolve the effective configuration from settings.
    pub fn from_settings(settings: &ExtractionSettings) -> Self {
        Self::resolve(settings, get_api_key)
    }

    fn resolve(settings: &ExtractionSettings, lookup: impl Fn(&str) -> KeyLookup) -> Self {
        let provider = settings.provider;

        if !provider.is_enabled() {
            return Self {
                provider,
                model: String::new(),
                endpoint: String::new(),
                timeout_secs: settings.timeout_secs,
                api_key: None,
                key_source: KeySource::None,
                status: ExtractionConfigStatus::Disabled,
                blocking_reason: Some("extraction provider is \"none\"".to_string()),
            };
        }

        let found = lookup(provider.name());
        let (status, blocking_reason) = match found.key {
            Some(_) => (ExtractionConfigStatus::Ready, None),
            None => (
                ExtractionConfigStatus::MissingKey,
                Some(format!(
                    "No API key found. Set via keychain or {}",
                    env_var_name(provider.name())
                )),
            ),
        };

        Self {
            provider,
            model: settings.effective_model().to_string(),
            endpoint: settings.effective_endpoint().to_string(),
            timeout_secs: settings.timeout_secs,
            api_key: found.key,
            key_source: found.source,
            status,
            blocking_reason,
        }
    }

    /// Provider display name
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

impl std::fmt::Display for ResolvedExtractionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Extraction")?;
        writeln!(f, "──────────────────────────────")?;
        writeln!(f, "provider:        {}", self.provider_name())?;
        writeln!(f, "status:          {}", self.status.as_str())?;
        if let Some(reason) = &self.blocking_reason {
            writeln!(f, "blocking_reason: {}", reason)?;
        }
        if self.provider.is_enabled() {
            writeln!(f, "model:           {}", self.model)?;
            writeln!(f, "endpoint:        {}", self.endpoint)?;
            writeln!(f, "timeout:         {}s", self.timeout_secs)?;
        }
        writeln!(f, "key:             {}", if self.api_key.is_some() { "present" } else { "missing" })?;
        write!(f, "key_source:      {}", self.key_source.as_str())
    }
}
