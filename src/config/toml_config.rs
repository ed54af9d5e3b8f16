use crate::core::dispatcher::DEFAULT_MAX_IN_FLIGHT;
use crate::domain::model::Capability;
use crate::utils::error::{DispatchError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_required_field, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// 只記錄日誌，不連線到閘道
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub dispatch: DispatchSection,
    pub sms: Option<GatewayConfig>,
    pub voice: Option<GatewayConfig>,
    #[serde(default)]
    pub permissions: PermissionsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchSection {
    pub max_in_flight: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionsConfig {
    /// 啟動時授予的權限
    #[serde(default)]
    pub granted: Vec<Capability>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: Option<String>,
}

impl DispatchConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DispatchError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DispatchError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SOS_SMS_API_KEY})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DispatchError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn max_in_flight(&self) -> usize {
        self.dispatch.max_in_flight.unwrap_or(DEFAULT_MAX_IN_FLIGHT)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.format.as_deref() == Some("json")
    }

    pub fn grant_all(&mut self) {
        self.permissions.granted = Capability::ALL.to_vec();
    }

    fn validate_gateway(field: &str, gateway: &GatewayConfig) -> Result<()> {
        validate_url(&format!("{}.endpoint", field), &gateway.endpoint)?;
        if let Some(api_key) = &gateway.api_key {
            validate_non_empty_string(&format!("{}.api_key", field), api_key)?;
        }
        if let Some(timeout) = gateway.timeout_seconds {
            validate_range(&format!("{}.timeout_seconds", field), timeout, 1, 120)?;
        }
        Ok(())
    }
}

impl Validate for DispatchConfig {
    fn validate(&self) -> Result<()> {
        validate_range("dispatch.max_in_flight", self.max_in_flight(), 1, 64)?;

        if let Some(format) = &self.logging.format {
            if !["compact", "json"].contains(&format.as_str()) {
                return Err(DispatchError::InvalidConfigValueError {
                    field: "logging.format".to_string(),
                    value: format.clone(),
                    reason: "Valid formats: compact, json".to_string(),
                });
            }
        }

        if self.dry_run {
            return Ok(());
        }

        Self::validate_gateway("sms", validate_required_field("sms", &self.sms)?)?;
        Self::validate_gateway("voice", validate_required_field("voice", &self.voice)?)?;
        Ok(())
    }
}
