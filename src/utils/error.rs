use crate::domain::model::Capability;
use thiserror::Error;

/// 權限未授予時回傳給宿主的錯誤碼
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
/// 請求欄位缺少或格式錯誤時回傳給宿主的錯誤碼
pub const UNAVAILABLE: &str = "UNAVAILABLE";

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Permission not granted: {capability}")]
    PermissionDenied { capability: Capability },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl DispatchError {
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        DispatchError::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// 回傳給宿主的錯誤碼 (只有兩種)
    pub fn error_code(&self) -> &'static str {
        match self {
            DispatchError::PermissionDenied { .. } => PERMISSION_DENIED,
            _ => UNAVAILABLE,
        }
    }
}

/// 單一收件人的發送失敗，只記錄在報告中，不向上傳遞
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("invalid number format: {number}")]
    InvalidNumber { number: String },

    #[error("gateway rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("gateway unreachable: {0}")]
    Unreachable(String),

    #[error("transport panicked")]
    Panicked,
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Unreachable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let denied = DispatchError::PermissionDenied {
            capability: Capability::PlaceCall,
        };
        assert_eq!(denied.error_code(), PERMISSION_DENIED);
        assert_eq!(
            DispatchError::invalid_request("number missing").error_code(),
            UNAVAILABLE
        );
        let config = DispatchError::ConfigError {
            message: "bad".to_string(),
        };
        assert_eq!(config.error_code(), UNAVAILABLE);
    }
}
