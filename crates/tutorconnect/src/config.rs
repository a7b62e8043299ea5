/// Service configuration: bind address, simulated latencies, and integration settings
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub type ConfigError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level configuration. Every field has a default, so a partial JSON file works.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub address: String,
    /// Maximum tracing level ("error", "warn", "info", "debug", "trace")
    pub log_level: String,
    /// How long a toast stays visible before it is dismissed automatically
    pub toast_duration_ms: u64,
    /// Hourly rate given to teachers who sign up themselves
    pub default_hourly_rate: u32,
    pub simulation: SimulationConfig,
    pub calendar: CalendarConfig,
    pub ai: AiConfig,
    pub payfast: PayFastConfig,
}

/// Fixed latencies of the simulated integrations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub auth_ms: u64,
    pub payment_ms: u64,
    pub verification_ms: u64,
    pub document_upload_ms: u64,
    pub calendar_sync_ms: u64,
    pub review_ms: u64,
    pub availability_save_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub base_url: String,
    /// Offset of lesson times from UTC, in minutes (SAST is +120)
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Without a key the AI features answer with a fixed "unavailable" text
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PayFastConfig {
    pub process_url: String,
    pub merchant_id: String,
    pub merchant_key: String,
    pub return_url: String,
    pub cancel_url: String,
    pub notify_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            toast_duration_ms: 5_000,
            default_hourly_rate: 200,
            simulation: SimulationConfig::default(),
            calendar: CalendarConfig::default(),
            ai: AiConfig::default(),
            payfast: PayFastConfig::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            auth_ms: 1_500,
            payment_ms: 2_000,
            verification_ms: 2_000,
            document_upload_ms: 1_500,
            calendar_sync_ms: 2_500,
            review_ms: 800,
            availability_save_ms: 1_500,
        }
    }
}

impl SimulationConfig {
    /// Every simulated operation resolves immediately. Meant for tests.
    pub fn instant() -> Self {
        Self {
            auth_ms: 0,
            payment_ms: 0,
            verification_ms: 0,
            document_upload_ms: 0,
            calendar_sync_ms: 0,
            review_ms: 0,
            availability_save_ms: 0,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_url: "https://calendar.google.com/calendar/render".to_string(),
            utc_offset_minutes: 120,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            temperature: 0.7,
            top_p: 0.95,
            timeout_secs: 30,
        }
    }
}

impl Default for PayFastConfig {
    fn default() -> Self {
        Self {
            process_url: "https://www.payfast.co.za/eng/process".to_string(),
            merchant_id: "10000100".to_string(),
            merchant_key: "46f0cd694581a".to_string(),
            return_url: "https://tutorconnect.sa/payment/return".to_string(),
            cancel_url: "https://tutorconnect.sa/payment/cancel".to_string(),
            notify_url: "https://tutorconnect.sa/payment/notify".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads a JSON config file. Missing fields fall back to defaults.
    ///
    /// # Arguments
    /// * `path` - Path to the JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Builds the configuration from the environment.
    ///
    /// `TUTORCONNECT_CONFIG` names an optional JSON file; `TUTORCONNECT_ADDR`,
    /// `TUTORCONNECT_LOG`, and `GEMINI_API_KEY` (or `API_KEY`) override it.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("TUTORCONNECT_CONFIG") {
            Ok(path) => Self::load_from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(address) = std::env::var("TUTORCONNECT_ADDR") {
            config.address = address;
        }
        if let Ok(level) = std::env::var("TUTORCONNECT_LOG") {
            config.log_level = level;
        }
        if let Some(key) = std::env::var("GEMINI_API_KEY")
            .ok()
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
        {
            config.ai.api_key = Some(key);
        }

        Ok(config)
    }

    /// Configuration with zero simulated latency and no AI key.
    pub fn for_tests() -> Self {
        Self {
            simulation: SimulationConfig::instant(),
            ..Self::default()
        }
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}
