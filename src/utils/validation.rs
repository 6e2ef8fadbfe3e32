use crate::utils::error::{ConverterError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ConverterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ConverterError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ConverterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ConverterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConverterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ConverterError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 上傳檔案只接受 `.txt`（不分大小寫）
pub fn validate_upload_filename(filename: &str) -> Result<()> {
    let is_txt = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);

    if !is_txt {
        return Err(ConverterError::validation("Only .txt files are supported"));
    }
    Ok(())
}

/// 驗證要送去轉換的文字：不可為空白，且不得超過大小上限
pub fn validate_input_text(text: &str, empty_message: &str, max_bytes: usize) -> Result<()> {
    if text.trim().is_empty() {
        return Err(ConverterError::validation(empty_message));
    }
    if text.len() > max_bytes {
        return Err(ConverterError::InputTooLarge {
            limit: max_bytes,
            actual: text.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("model.endpoint", "https://example.com").is_ok());
        assert!(validate_url("model.endpoint", "http://127.0.0.1:8080/v1").is_ok());
        assert!(validate_url("model.endpoint", "").is_err());
        assert!(validate_url("model.endpoint", "invalid-url").is_err());
        assert!(validate_url("model.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("max_input_bytes", 5, 1).is_ok());
        assert!(validate_positive_number("max_input_bytes", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("temperature", 0.2, 0.0, 2.0).is_ok());
        assert!(validate_range("temperature", 2.5, 0.0, 2.0).is_err());
    }

    #[test]
    fn test_validate_upload_filename() {
        assert!(validate_upload_filename("depot_notes.txt").is_ok());
        assert!(validate_upload_filename("DEPOT.TXT").is_ok());

        let err = validate_upload_filename("schedule.csv").unwrap_err();
        assert_eq!(err.to_string(), "Only .txt files are supported");
        assert!(validate_upload_filename("notes").is_err());
        assert!(validate_upload_filename("").is_err());
    }

    #[test]
    fn test_validate_input_text() {
        assert!(validate_input_text("KMRC-012 clean at 11 pm", "Text cannot be empty", 1024).is_ok());

        let err = validate_input_text("  \n\t ", "Text cannot be empty", 1024).unwrap_err();
        assert_eq!(err.to_string(), "Text cannot be empty");

        let err = validate_input_text("abcdef", "Text cannot be empty", 4).unwrap_err();
        assert!(matches!(
            err,
            ConverterError::InputTooLarge { limit: 4, actual: 6 }
        ));
    }
}
