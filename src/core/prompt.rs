use crate::domain::model::{REQUIRED_FIELDS, SENTINEL};
use chrono::NaiveDate;

/// Formats raw operational text into the instruction sent to the model.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    reference_date: Option<NaiveDate>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 文字中沒有日期時，模型以此作為「今天」
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn schema_description() -> String {
        let field_lines: Vec<String> = REQUIRED_FIELDS
            .iter()
            .map(|(name, description)| format!("- {}: {}", name, description))
            .collect();

        format!(
            "Top-level JSON object with these keys (ALL REQUIRED):\n{}\n\n\
             IMPORTANT: Every field above MUST be included in the output JSON, \
             even if the value is \"{}\".",
            field_lines.join("\n"),
            SENTINEL
        )
    }

    pub fn build(&self, raw_text: &str) -> String {
        let mut prompt = format!(
            "Convert the following messy train operational text into valid JSON.\n\
             Follow this schema strictly:\n{}\n\n",
            Self::schema_description()
        );

        if let Some(date) = self.reference_date {
            prompt.push_str(&format!(
                "If the text does not mention a date, use today's date: {}\n\n",
                date.format("%Y-%m-%d")
            ));
        }

        prompt.push_str(&format!(
            "Raw text:\n{}\n\n\
             Output ONLY a JSON object with exactly these keys: {}. \
             Every value must be a string. If a value is missing, use \"{}\".",
            raw_text,
            REQUIRED_FIELDS
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", "),
            SENTINEL
        ));

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_TEXT: &str = "train KMRC-012 daily clean at 11 pm, team A, scheduled.\n\
        branding election awareness priority 1 from 1 nov to 30 nov.";

    #[test]
    fn test_prompt_embeds_text_verbatim() {
        let prompt = PromptBuilder::new().build(RAW_TEXT);
        assert!(prompt.contains(RAW_TEXT));
    }

    #[test]
    fn test_prompt_names_every_field() {
        let prompt = PromptBuilder::new().build("KMRC-018 fitness valid 27 nov");
        for (name, _) in REQUIRED_FIELDS {
            assert!(prompt.contains(name), "prompt is missing field {}", name);
        }
        assert!(prompt.contains("JSON object"));
        assert!(prompt.contains("\"Not specified\""));
    }

    #[test]
    fn test_reference_date_is_optional() {
        let plain = PromptBuilder::new().build("mileage 500km");
        assert!(!plain.contains("today's date"));

        let date = NaiveDate::from_ymd_opt(2025, 11, 28).unwrap();
        let dated = PromptBuilder::new().with_reference_date(date).build("mileage 500km");
        assert!(dated.contains("today's date: 2025-11-28"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::new();
        assert_eq!(builder.build(RAW_TEXT), builder.build(RAW_TEXT));
    }
}
