//! Layered runtime configuration.
//!
//! Values come from built-in defaults, an optional TOML file, and
//! `DRIPCAM__SECTION__KEY` environment variables, in increasing priority.
//! `GEMINI_API_KEY` and `DATABASE_URL` fill the provider key and database URL
//! when they are not set otherwise.

use dripcam_error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

/// Prompt applied to every capture unless configured otherwise.
pub const DEFAULT_PROMPT: &str = "Create a picture with these modifications: Add a bust down diamond chain around the neck. If the person is smiling, add diamond grills to their teeth. Make it look realistic and luxurious with a cosmic Gemini constellation theme in the background.";

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// External image provider
    #[serde(default)]
    pub provider: ProviderSettings,
    /// Prompt selection
    #[serde(default)]
    pub generation: GenerationSettings,
    /// Media file storage
    #[serde(default)]
    pub media: MediaSettings,
    /// Record store
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Worker scheduling
    #[serde(default)]
    pub worker: WorkerSettings,
    /// Stuck-job sweeps
    #[serde(default)]
    pub reconciler: ReconcilerSettings,
    /// Metrics export
    #[serde(default)]
    pub observability: ObservabilitySettings,
}

impl Settings {
    /// Load settings, reading `path` if it exists.
    #[instrument(skip_all, fields(path = ?path.map(Path::display)))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("DRIPCAM")
                .separator("__")
                .try_parsing(true),
        );

        let mut settings: Settings = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::new(format!("Failed to load settings: {}", e)))?;

        if settings.provider.api_key.is_none() {
            settings.provider.api_key = std::env::var("GEMINI_API_KEY").ok();
        }
        if settings.database.url.is_none() {
            settings.database.url = std::env::var("DATABASE_URL").ok();
        }

        debug!(
            model = %settings.provider.model,
            media_root = %settings.media.root.display(),
            api_key_present = settings.provider.api_key.is_some(),
            "Settings loaded"
        );
        Ok(settings)
    }
}

/// External image provider settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// API key sent as `x-goog-api-key`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Models endpoint base URL
    pub base_url: String,
    /// Image-capable model name
    pub model: String,
    /// MIME type declared for the uploaded capture
    pub mime_type: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ProviderSettings {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("mime_type", &self.mime_type)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model: "gemini-2.5-flash-image-preview".to_string(),
            mime_type: "image/jpeg".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Prompt settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Prompt recorded on the request and sent with the capture
    pub prompt: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

/// Media storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// Directory holding `webcam/` and `generated/`
    pub root: PathBuf,
}

impl Default for MediaSettings {
    fn default() -> Self {
        let root = dirs::data_dir()
            .map(|dir| dir.join("dripcam").join("media"))
            .unwrap_or_else(|| PathBuf::from("storage/media"));
        Self { root }
    }
}

/// Record store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// PostgreSQL connection string
    pub url: Option<String>,
    /// Maximum pooled connections
    pub pool_size: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: 10,
        }
    }
}

/// Worker scheduling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Maximum concurrently running generation workers
    pub max_concurrent: usize,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self { max_concurrent: 4 }
    }
}

/// Stuck-job reconciler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerSettings {
    /// Age after which an in-flight record counts as orphaned
    pub max_age_secs: u64,
    /// Interval between periodic sweeps
    pub interval_secs: u64,
}

impl ReconcilerSettings {
    /// Orphan threshold as a duration.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    /// Sweep interval as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            max_age_secs: 3600,
            interval_secs: 300,
        }
    }
}

/// Where pipeline metrics are exported.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MetricsExporter {
    /// No export; stdout carries command output
    #[default]
    None,
    /// Periodic dumps to stdout
    Stdout,
    /// OTLP over HTTP
    Otlp,
}

/// Metrics export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilitySettings {
    /// Exporter selection
    pub exporter: MetricsExporter,
    /// OTLP collector endpoint
    pub otlp_endpoint: String,
    /// Seconds between exports
    pub export_interval_secs: u64,
}

impl ObservabilitySettings {
    /// Export interval as a duration, at least one second.
    pub fn export_interval(&self) -> Duration {
        Duration::from_secs(self.export_interval_secs.max(1))
    }
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            exporter: MetricsExporter::None,
            otlp_endpoint: "http://localhost:4318".to_string(),
            export_interval_secs: 60,
        }
    }
}
