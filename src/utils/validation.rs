use crate::utils::error::{DispatchError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 只接受 http 與 https
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(DispatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(DispatchError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(DispatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| DispatchError::MissingConfigError {
            field: field_name.to_string(),
        })
}

/// 空白字元也視為空值
pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DispatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 包含上下限
pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DispatchError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("sms.endpoint", "https://sms.example.com").is_ok());
        assert!(validate_url("sms.endpoint", "http://localhost:8080").is_ok());
        assert!(validate_url("sms.endpoint", "").is_err());
        assert!(validate_url("sms.endpoint", "not a url").is_err());
        assert!(validate_url("sms.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("dispatch.max_in_flight", 4, 1, 64).is_ok());
        assert!(validate_range("dispatch.max_in_flight", 0, 1, 64).is_err());
        assert!(validate_range("dispatch.max_in_flight", 65, 1, 64).is_err());
    }

    #[test]
    fn test_validate_required_and_non_empty() {
        let present = Some("secret".to_string());
        assert_eq!(
            validate_required_field("sms.api_key", &present).unwrap(),
            "secret"
        );
        let absent: Option<String> = None;
        assert!(matches!(
            validate_required_field("sms.api_key", &absent),
            Err(DispatchError::MissingConfigError { .. })
        ));
        assert!(validate_non_empty_string("message", "  ").is_err());
        assert!(validate_non_empty_string("message", "help").is_ok());
    }
}
