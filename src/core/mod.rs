pub mod converter;
pub mod normalizer;
pub mod prompt;

pub use crate::domain::model::{TrainRecord, REQUIRED_FIELDS, SENTINEL};
pub use crate::domain::ports::{ConfigProvider, ModelClient};
pub use crate::utils::error::Result;
