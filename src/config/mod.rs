pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ConverterError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL_ENDPOINT: &str = "https://router.huggingface.co/v1/chat/completions";
pub const DEFAULT_MODEL_ID: &str = "google/gemma-2-2b-it";

/// 依序檢查的 API token 環境變數
pub const API_TOKEN_ENV_VARS: [&str; 2] = ["HUGGINGFACEHUB_API_TOKEN", "HF_TOKEN"];

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "train-data-converter")]
#[command(about = "Convert messy train operational text to structured JSON")]
pub struct CliConfig {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value = "8000")]
    pub port: u16,

    #[arg(long, env = "MODEL_ENDPOINT", default_value = DEFAULT_MODEL_ENDPOINT)]
    pub model_endpoint: String,

    #[arg(long, env = "MODEL_ID", default_value = DEFAULT_MODEL_ID)]
    pub model_id: String,

    #[arg(long, default_value = "120")]
    pub request_timeout_seconds: u64,

    #[arg(long, default_value = "0", help = "Extra attempts after a failed model call")]
    pub retry_attempts: u32,

    #[arg(long, default_value = "1000")]
    pub retry_delay_ms: u64,

    #[arg(long, default_value = "1048576")]
    pub max_input_bytes: usize,

    #[arg(long, default_value = "1024")]
    pub max_tokens: u32,

    #[arg(long, default_value = "0.1")]
    pub temperature: f32,

    #[arg(short, long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_endpoint: DEFAULT_MODEL_ENDPOINT.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            request_timeout_seconds: 120,
            retry_attempts: 0,
            retry_delay_ms: 1000,
            max_input_bytes: 1024 * 1024,
            max_tokens: 1024,
            temperature: 0.1,
            config: None,
            verbose: false,
            json_logs: false,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn model_endpoint(&self) -> &str {
        &self.model_endpoint
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    fn max_input_bytes(&self) -> usize {
        self.max_input_bytes
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

/// Checks shared by every [`ConfigProvider`].
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_url("model_endpoint", config.model_endpoint())?;
    validate_non_empty_string("model_id", config.model_id())?;
    validate_range(
        "request_timeout_seconds",
        config.request_timeout().as_secs(),
        1,
        600,
    )?;
    validate_range("retry_attempts", config.retry_attempts(), 0, 10)?;
    validate_positive_number("max_input_bytes", config.max_input_bytes(), 1)?;
    validate_positive_number("max_tokens", config.max_tokens() as usize, 1)?;
    validate_range("temperature", config.temperature(), 0.0, 2.0)?;
    Ok(())
}

/// 從環境變數取得模型供應商的 API token，找不到就在啟動時失敗
pub fn resolve_api_token() -> Result<String> {
    resolve_api_token_from(|name| std::env::var(name).ok())
}

pub fn resolve_api_token_from<F>(lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_TOKEN_ENV_VARS
        .iter()
        .filter_map(|name| lookup(*name))
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
        .ok_or_else(|| ConverterError::MissingConfigError {
            field: format!("{} environment variable", API_TOKEN_ENV_VARS.join(" or ")),
        })
}
