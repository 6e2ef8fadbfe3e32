pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::HuggingFaceClient;
pub use crate::app::{build_service, router, AppState};
pub use crate::config::{toml_config::TomlConfig, CliConfig};
pub use crate::core::{converter::ConversionService, normalizer::normalize, prompt::PromptBuilder};
pub use crate::domain::model::{TrainRecord, SENTINEL};
pub use crate::utils::error::{ConverterError, Result};
