// Application settings
// Loaded from ~/.config/parceltrack/settings.json

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Extraction service selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionProvider {
    /// Extraction disabled (default)
    #[default]
    None,
    /// Google Gemini generateContent API
    Gemini,
    /// OpenAI chat completions API (or any compatible endpoint)
    #[serde(rename = "openai")]
    OpenAI,
}

impl ExtractionProvider {
    /// Returns true if extraction is enabled
    pub fn is_enabled(&self) -> bool {
        !matches!(self, ExtractionProvider::None)
    }

    /// Name used for env vars, keychain accounts and display
    pub fn name(&self) -> &'static str {
        match self {
            ExtractionProvider::None => "none",
            ExtractionProvider::Gemini => "gemini",
            ExtractionProvider::OpenAI => "openai",
        }
    }

    /// Returns the default model for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            ExtractionProvider::None => "",
            ExtractionProvider::Gemini => "gemini-2.5-flash",
            ExtractionProvider::OpenAI => "gpt-4o-mini",
        }
    }

    /// Returns the default API base URL for this provider
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ExtractionProvider::None => "",
            ExtractionProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ExtractionProvider::OpenAI => "https://api.openai.com/v1",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Some(ExtractionProvider::None),
            "gemini" => Some(ExtractionProvider::Gemini),
            "openai" => Some(ExtractionProvider::OpenAI),
            _ => None,
        }
    }
}

/// Extraction-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Selected extraction provider
    pub provider: ExtractionProvider,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Custom API base URL (proxies, self-hosted compatible servers)
    pub endpoint: Option<String>,

    /// HTTP timeout for one extraction call, in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            provider: ExtractionProvider::None,
            model: String::new(), // Empty = use provider default
            endpoint: None,
            timeout_secs: 60,
        }
    }
}

impl ExtractionSettings {
    /// Get the effective model (user-specified or provider default)
    pub fn effective_model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }

    /// Get the effective API base URL, without a trailing slash
    pub fn effective_endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| self.provider.default_endpoint())
            .trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Storage
    #[serde(rename = "storage.dataDir")]
    pub data_dir: Option<PathBuf>, // None = platform data dir

    // Mail import
    #[serde(rename = "mail.folderLabel")]
    pub mail_folder_label: String,

    // Extraction
    #[serde(rename = "extraction", default)]
    pub extraction: ExtractionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            mail_folder_label: "Packages".to_string(),
            extraction: ExtractionSettings::default(),
        }
    }
}

const DEFAULT_SETTINGS_FILE: &str = r#"{
    // Where packages.json lives (null = platform data directory)
    "storage.dataDir": null,

    // Mailbox folder scanned by `parcels import-mail`
    "mail.folderLabel": "Packages",

    // Extraction service (disabled by default)
    // Provider options: "none", "gemini", "openai"
    // API keys are stored in the system keychain or PARCELTRACK_<PROVIDER>_KEY,
    // never in this file
    "extraction": {
        "provider": "none",
        "model": "",
        "endpoint": null,
        "timeoutSecs": 60
    }
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parceltrack");
        config_dir.join("settings.json")
    }

    /// Load settings from the default path, creating a commented default
    /// file on first run
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                warn!("Error parsing {}: {}; using default settings", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Error reading {}: {}", path.display(), e);
                }
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring lines that start with //
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_SETTINGS_FILE) {
            warn!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
