//! HTTP 簡訊與語音閘道傳輸
//!
//! 兩者都將 JSON POST 到供應商端點。2xx 回應代表供應商已接收，沒有送達回條。

use crate::config::toml_config::GatewayConfig;
use crate::domain::model::{MessageChunk, Recipient};
use crate::domain::ports::{CallTransport, MessageTransport};
use crate::utils::error::DeliveryError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

const GSM7_SINGLE: usize = 160;
const GSM7_MULTIPART: usize = 153;
const UCS2_SINGLE: usize = 70;
const UCS2_MULTIPART: usize = 67;

const GSM7_BASIC: &str = "@£$¥èéùìòÇ\nØø\rÅåΔ_ΦΓΛΩΠΨΣΘΞÆæßÉ !\"#¤%&'()*+,-./0123456789:;<=>?\
¡ABCDEFGHIJKLMNOPQRSTUVWXYZÄÖÑÜ§¿abcdefghijklmnopqrstuvwxyzäöñüà";

/// 所有字元都在 GSM 03.38 基本字元表內
/// 擴充表字元佔兩個 septet，這裡當作 UCS-2 處理
pub fn is_gsm7(body: &str) -> bool {
    body.chars().all(|c| GSM7_BASIC.contains(c))
}

/// 每段簡訊的字元上限 (已扣除串接標頭)
pub fn sms_part_limit(body: &str) -> usize {
    let (single, multipart) = if is_gsm7(body) {
        (GSM7_SINGLE, GSM7_MULTIPART)
    } else if body.chars().all(|c| (c as u32) <= 0xFFFF) {
        (UCS2_SINGLE, UCS2_MULTIPART)
    } else {
        // 非 BMP 字元需要代理對
        (UCS2_SINGLE / 2, UCS2_MULTIPART / 2)
    };

    if body.chars().count() <= single {
        single
    } else {
        multipart
    }
}

/// 移除常見分隔符號，檢查格式為可選的 `+` 加 3 到 15 位數字
pub fn normalize_number(raw: &str) -> Result<String, DeliveryError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '(' | ')'))
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    if (3..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(cleaned)
    } else {
        Err(DeliveryError::InvalidNumber {
            number: raw.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
struct GatewayClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GatewayClient {
    fn new(config: &GatewayConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            timeout: Duration::from_secs(config.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)),
        }
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<(), DeliveryError> {
        let url = format!("{}{}", self.endpoint, path);
        tracing::debug!("📡 Posting to gateway: {}", url);

        let mut request = self.client.post(&url).timeout(self.timeout).json(payload);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    to: &'a str,
    parts: Vec<&'a str>,
    multipart: bool,
}

#[derive(Debug, Serialize)]
struct OutboundCall<'a> {
    to: &'a str,
    uri: String,
}

/// 透過 HTTP 簡訊供應商發送簡訊
#[derive(Debug, Clone)]
pub struct SmsGateway {
    client: GatewayClient,
}

impl SmsGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            client: GatewayClient::new(config),
        }
    }
}

#[async_trait]
impl MessageTransport for SmsGateway {
    fn max_chunk_length(&self, body: &str) -> usize {
        sms_part_limit(body)
    }

    async fn deliver_message(
        &self,
        recipient: &Recipient,
        chunks: &[MessageChunk],
    ) -> Result<(), DeliveryError> {
        let number = normalize_number(recipient.identifier())?;

        let mut ordered: Vec<&MessageChunk> = chunks.iter().collect();
        ordered.sort_by_key(|c| c.sequence_index);
        let message = OutboundMessage {
            to: &number,
            parts: ordered.iter().map(|c| c.text.as_str()).collect(),
            multipart: ordered.len() > 1,
        };

        self.client.post("/messages", &message).await?;
        tracing::debug!("📨 SMS sent successfully to {} ({} parts)", number, ordered.len());
        Ok(())
    }
}

/// 透過 HTTP 電話供應商發起語音通話
#[derive(Debug, Clone)]
pub struct VoiceGateway {
    client: GatewayClient,
}

impl VoiceGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            client: GatewayClient::new(config),
        }
    }
}

#[async_trait]
impl CallTransport for VoiceGateway {
    async fn place_call(&self, recipient: &Recipient) -> Result<(), DeliveryError> {
        let number = normalize_number(recipient.identifier())?;
        let call = OutboundCall {
            to: &number,
            uri: format!("tel:{}", number),
        };

        self.client.post("/calls", &call).await?;
        tracing::debug!("📞 Calling {}", number);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gsm7_detection() {
        assert!(is_gsm7("Help! I'm at 5th & Main @ 10pm"));
        assert!(is_gsm7("Ça va? Désolé, Ñ"));
        assert!(!is_gsm7("救命"));
        assert!(!is_gsm7("price in €"));
    }

    #[test]
    fn test_sms_part_limits() {
        assert_eq!(sms_part_limit("short"), 160);
        assert_eq!(sms_part_limit(&"x".repeat(160)), 160);
        assert_eq!(sms_part_limit(&"x".repeat(161)), 153);
        assert_eq!(sms_part_limit("救命"), 70);
        assert_eq!(sms_part_limit(&"救".repeat(71)), 67);
        assert_eq!(sms_part_limit("🚑"), 35);
    }

    #[test]
    fn test_normalize_number() {
        assert_eq!(normalize_number("+1 (555) 010-0199").unwrap(), "+15550100199");
        assert_eq!(normalize_number("112").unwrap(), "112");
        assert_eq!(normalize_number("0912.345.678").unwrap(), "0912345678");
        assert!(normalize_number("12").is_err());
        assert!(normalize_number("call me").is_err());
        assert!(normalize_number("+1234567890123456").is_err());
        assert!(normalize_number("++15550100").is_err());
    }
}
