use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// The remote language model that turns a prompt into a raw completion.
///
/// Implementations report network, auth, quota and timeout problems as
/// [`ConverterError::UpstreamError`](crate::utils::error::ConverterError) or
/// `RequestError`; they never inspect the completion text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn bind_address(&self) -> String;
    fn model_endpoint(&self) -> &str;
    fn model_id(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
    fn max_input_bytes(&self) -> usize;
    fn max_tokens(&self) -> u32;
    fn temperature(&self) -> f32;
}
