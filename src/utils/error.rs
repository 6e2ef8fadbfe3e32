use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("Upstream request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{message}")]
    ValidationError { message: String },

    #[error("Input is {actual} bytes, which exceeds the maximum of {limit} bytes")]
    InputTooLarge { limit: usize, actual: usize },

    /// 請求本體在讀完前就超過上限，實際大小未知
    #[error("Request body exceeds the maximum of {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("Upstream model error: {message}")]
    UpstreamError {
        message: String,
        status: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 使用者輸入有誤，尚未呼叫模型
    Validation,
    /// 模型供應商呼叫失敗
    Upstream,
    Configuration,
    Internal,
}

impl ConverterError {
    pub fn validation(message: impl Into<String>) -> Self {
        ConverterError::ValidationError {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>, status: Option<u16>) -> Self {
        ConverterError::UpstreamError {
            message: message.into(),
            status,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ConverterError::ValidationError { .. }
            | ConverterError::InputTooLarge { .. }
            | ConverterError::BodyTooLarge { .. } => ErrorCategory::Validation,
            ConverterError::RequestError(_) | ConverterError::UpstreamError { .. } => {
                ErrorCategory::Upstream
            }
            ConverterError::ConfigError { .. }
            | ConverterError::MissingConfigError { .. }
            | ConverterError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ConverterError::IoError(_) => ErrorCategory::Internal,
        }
    }

    /// 適合直接顯示給使用者的錯誤訊息
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Validation => self.to_string(),
            ErrorCategory::Upstream => format!("The language model service failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Internal => format!("Internal error: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ConverterError::MissingConfigError { .. } => {
                "Set HUGGINGFACEHUB_API_TOKEN (or HF_TOKEN) in the environment or a .env file"
            }
            ConverterError::InvalidConfigValueError { .. } | ConverterError::ConfigError { .. } => {
                "Check the command line flags or the TOML configuration file"
            }
            ConverterError::InputTooLarge { .. } | ConverterError::BodyTooLarge { .. } => {
                "Split the text into smaller documents"
            }
            ConverterError::ValidationError { .. } => "Fix the request and try again",
            ConverterError::RequestError(_) | ConverterError::UpstreamError { .. } => {
                "Check network access, the API token and the provider's rate limits"
            }
            ConverterError::IoError(_) => {
                "Retry the request; if it keeps failing inspect the service logs"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ConverterError>;
