use crate::config::{validate_provider, DEFAULT_MODEL_ENDPOINT, DEFAULT_MODEL_ID};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ConverterError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub limits: LimitsSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSection {
    pub endpoint: Option<String>,
    pub id: Option<String>,
    pub api_token: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitsSection {
    pub max_input_bytes: Option<usize>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ConverterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ConverterError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HF_TOKEN})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConverterError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 檔案中設定且已完成替換的 token；`${VAR}` 未替換時視為未設定
    pub fn api_token(&self) -> Option<&str> {
        self.model
            .api_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty() && !token.contains("${"))
    }
}

impl ConfigProvider for TomlConfig {
    fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.server.host.as_deref().unwrap_or("0.0.0.0"),
            self.server.port.unwrap_or(8000)
        )
    }

    fn model_endpoint(&self) -> &str {
        self.model.endpoint.as_deref().unwrap_or(DEFAULT_MODEL_ENDPOINT)
    }

    fn model_id(&self) -> &str {
        self.model.id.as_deref().unwrap_or(DEFAULT_MODEL_ID)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.model.timeout_seconds.unwrap_or(120))
    }

    fn retry_attempts(&self) -> u32 {
        self.model.retry_attempts.unwrap_or(0)
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.model.retry_delay_ms.unwrap_or(1000))
    }

    fn max_input_bytes(&self) -> usize {
        self.limits.max_input_bytes.unwrap_or(1024 * 1024)
    }

    fn max_tokens(&self) -> u32 {
        self.model.max_tokens.unwrap_or(1024)
    }

    fn temperature(&self) -> f32 {
        self.model.temperature.unwrap_or(0.1)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 9100

[model]
endpoint = "https://llm.internal.example/v1/chat/completions"
id = "google/gemma-2-9b-it"
timeout_seconds = 30
retry_attempts = 2
retry_delay_ms = 250

[limits]
max_input_bytes = 65536
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9100");
        assert_eq!(config.model_id(), "google/gemma-2-9b-it");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.retry_attempts(), 2);
        assert_eq!(config.retry_delay(), Duration::from_millis(250));
        assert_eq!(config.max_input_bytes(), 65536);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.model_endpoint(), DEFAULT_MODEL_ENDPOINT);
        assert_eq!(config.model_id(), DEFAULT_MODEL_ID);
        assert_eq!(config.retry_attempts(), 0);
        assert!(config.api_token().is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TDC_TEST_MODEL_TOKEN", "hf_from_env");

        let toml_content = r#"
[model]
api_token = "${TDC_TEST_MODEL_TOKEN}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_token(), Some("hf_from_env"));

        std::env::remove_var("TDC_TEST_MODEL_TOKEN");
    }

    #[test]
    fn test_unresolved_token_counts_as_missing() {
        let toml_content = r#"
[model]
api_token = "${TDC_TEST_UNSET_TOKEN_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.api_token().is_none());
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[model]
endpoint = "invalid-url"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[server]
port = 8123
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8123");
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[server\nport = ").unwrap_err();
        assert!(matches!(err, ConverterError::ConfigError { .. }));
    }
}
