use crate::core::normalizer::{normalize_with_outcome, Extraction};
use crate::core::prompt::PromptBuilder;
use crate::domain::model::TrainRecord;
use crate::domain::ports::{ConfigProvider, ModelClient};
use crate::utils::error::{ErrorCategory, Result};
use crate::utils::validation::validate_input_text;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

/// 每次轉換時提供「今天」的日期
pub type DateSource = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Runs one conversion: validate → prompt → model → normalize.
pub struct ConversionService {
    client: Arc<dyn ModelClient>,
    prompt: PromptBuilder,
    today: Option<DateSource>,
    retry_attempts: u32,
    retry_delay: Duration,
    max_input_bytes: usize,
}

impl ConversionService {
    pub fn new(client: Arc<dyn ModelClient>, prompt: PromptBuilder) -> Self {
        Self {
            client,
            prompt,
            today: None,
            retry_attempts: 0,
            retry_delay: Duration::from_secs(1),
            max_input_bytes: 1024 * 1024,
        }
    }

    pub fn from_config<C: ConfigProvider>(
        client: Arc<dyn ModelClient>,
        prompt: PromptBuilder,
        config: &C,
    ) -> Self {
        Self::new(client, prompt)
            .with_retry(config.retry_attempts(), config.retry_delay())
            .with_max_input_bytes(config.max_input_bytes())
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }

    /// The prompt's reference date is read from `today` on every conversion.
    pub fn with_date_source(mut self, today: DateSource) -> Self {
        self.today = Some(today);
        self
    }

    pub fn with_max_input_bytes(mut self, max_input_bytes: usize) -> Self {
        self.max_input_bytes = max_input_bytes;
        self
    }

    pub fn max_input_bytes(&self) -> usize {
        self.max_input_bytes
    }

    /// `empty_message` is the validation message used when `raw_text` is
    /// blank, so each entry point can phrase it for its own input.
    pub async fn convert(&self, raw_text: &str, empty_message: &str) -> Result<TrainRecord> {
        validate_input_text(raw_text, empty_message, self.max_input_bytes)?;

        let prompt = match &self.today {
            Some(today) => self.prompt.clone().with_reference_date(today()).build(raw_text),
            None => self.prompt.build(raw_text),
        };
        tracing::debug!(
            "Built prompt ({} bytes) for {} bytes of input",
            prompt.len(),
            raw_text.len()
        );

        let completion = self.complete_with_retry(&prompt).await?;
        tracing::debug!("Model returned {} bytes", completion.len());

        let (record, outcome) = normalize_with_outcome(&completion);
        match outcome {
            Extraction::Parsed { missing } if missing.is_empty() => {
                tracing::info!("✅ Extracted all fields from model reply");
            }
            Extraction::Parsed { missing } => {
                tracing::info!(
                    "Extracted model reply, {} field(s) not specified: {}",
                    missing.len(),
                    missing.join(", ")
                );
            }
            Extraction::Fallback => {
                tracing::warn!("⚠️ No JSON object in model reply, returning an all-sentinel record");
            }
        }

        Ok(record)
    }

    async fn complete_with_retry(&self, prompt: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            match self.client.complete(prompt).await {
                Ok(completion) => return Ok(completion),
                Err(e) if attempt < self.retry_attempts && e.category() == ErrorCategory::Upstream => {
                    attempt += 1;
                    tracing::warn!(
                        "Model call failed (attempt {}/{}): {}",
                        attempt,
                        self.retry_attempts + 1,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    tracing::error!("❌ Model call failed: {}", e);
                    return Err(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SENTINEL;
    use crate::utils::error::ConverterError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn with_replies(replies: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        async fn calls(&self) -> usize {
            self.prompts.lock().await.len()
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedModel {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().await.push(prompt.to_string());
            self.replies
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Err(ConverterError::upstream("no scripted reply", None)))
        }
    }

    #[tokio::test]
    async fn test_convert_normalizes_model_reply() {
        let model = ScriptedModel::with_replies(vec![Ok(
            "Here is the data: {\"date\": \"Dec 1\", \"mileage\": \"500km\"}".to_string(),
        )]);
        let service = ConversionService::new(model.clone(), PromptBuilder::new());

        let record = service
            .convert("KMRC-012 ran 500km on Dec 1", "Text cannot be empty")
            .await
            .unwrap();

        assert_eq!(record.date, "Dec 1");
        assert_eq!(record.mileage, "500km");
        assert_eq!(record.cleaning_slots, SENTINEL);

        let prompts = model.prompts.lock().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("KMRC-012 ran 500km on Dec 1"));
    }

    #[tokio::test]
    async fn test_unusable_reply_is_not_an_error() {
        let model = ScriptedModel::with_replies(vec![Ok(
            "I could not understand the input.".to_string()
        )]);
        let service = ConversionService::new(model, PromptBuilder::new());

        let record = service.convert("???", "Text cannot be empty").await.unwrap();
        assert_eq!(record, TrainRecord::unspecified());
    }

    #[tokio::test]
    async fn test_blank_input_never_reaches_the_model() {
        let model = ScriptedModel::with_replies(vec![]);
        let service = ConversionService::new(model.clone(), PromptBuilder::new());

        let err = service.convert("   \n", "Text cannot be empty").await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.to_string(), "Text cannot be empty");
        assert_eq!(model.calls().await, 0);
    }

    #[tokio::test]
    async fn test_oversized_input_never_reaches_the_model() {
        let model = ScriptedModel::with_replies(vec![]);
        let service =
            ConversionService::new(model.clone(), PromptBuilder::new()).with_max_input_bytes(8);

        let err = service
            .convert("far more than eight bytes", "Text cannot be empty")
            .await
            .unwrap_err();

        assert!(matches!(err, ConverterError::InputTooLarge { limit: 8, .. }));
        assert_eq!(model.calls().await, 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_retried_by_default() {
        let model = ScriptedModel::with_replies(vec![
            Err(ConverterError::upstream("rate limited", Some(429))),
            Ok("{\"date\": \"1 Dec\"}".to_string()),
        ]);
        let service = ConversionService::new(model.clone(), PromptBuilder::new());

        let err = service.convert("text", "Text cannot be empty").await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Upstream);
        assert_eq!(model.calls().await, 1);
    }

    #[tokio::test]
    async fn test_configured_retry_recovers() {
        let model = ScriptedModel::with_replies(vec![
            Err(ConverterError::upstream("bad gateway", Some(502))),
            Ok("{\"date\": \"1 Dec\"}".to_string()),
        ]);
        let service = ConversionService::new(model.clone(), PromptBuilder::new())
            .with_retry(2, Duration::from_millis(1));

        let record = service.convert("text", "Text cannot be empty").await.unwrap();

        assert_eq!(record.date, "1 Dec");
        assert_eq!(model.calls().await, 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_configured_attempts() {
        let model = ScriptedModel::with_replies(vec![
            Err(ConverterError::upstream("timeout", None)),
            Err(ConverterError::upstream("timeout", None)),
            Err(ConverterError::upstream("timeout", None)),
        ]);
        let service = ConversionService::new(model.clone(), PromptBuilder::new())
            .with_retry(1, Duration::from_millis(1));

        assert!(service.convert("text", "Text cannot be empty").await.is_err());
        assert_eq!(model.calls().await, 2);
    }

    #[tokio::test]
    async fn test_reference_date_is_read_per_conversion() {
        let model = ScriptedModel::with_replies(vec![
            Ok("{}".to_string()),
            Ok("{}".to_string()),
        ]);
        let day = Arc::new(AtomicU32::new(28));
        let clock = day.clone();
        let service = ConversionService::new(model.clone(), PromptBuilder::new()).with_date_source(
            Arc::new(move || {
                NaiveDate::from_ymd_opt(2025, 11, clock.load(Ordering::SeqCst)).unwrap()
            }),
        );

        service.convert("KMRC-012 clean", "Text cannot be empty").await.unwrap();
        day.store(29, Ordering::SeqCst);
        service.convert("KMRC-012 clean", "Text cannot be empty").await.unwrap();

        let prompts = model.prompts.lock().await;
        assert!(prompts[0].contains("today's date: 2025-11-28"));
        assert!(prompts[1].contains("today's date: 2025-11-29"));
    }
}
