use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::error::{DispatchError, Result};

/// 電話號碼形式的識別碼，格式檢查由傳輸層負責
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Recipient {
    identifier: String,
}

impl Recipient {
    pub fn new(identifier: impl Into<String>) -> Result<Self> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(DispatchError::invalid_request(
                "recipient identifier cannot be empty",
            ));
        }
        Ok(Self { identifier })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl TryFrom<String> for Recipient {
    type Error = DispatchError;

    fn try_from(identifier: String) -> Result<Self> {
        Recipient::new(identifier)
    }
}

impl From<Recipient> for String {
    fn from(recipient: Recipient) -> Self {
        recipient.identifier
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

/// 執行期授予的權限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    SendMessage,
    PlaceCall,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::SendMessage, Capability::PlaceCall];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::SendMessage => "send_message",
            Capability::PlaceCall => "place_call",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SendMessage,
    PlaceCall,
}

impl ActionKind {
    pub fn required_capability(&self) -> Capability {
        match self {
            ActionKind::SendMessage => Capability::SendMessage,
            ActionKind::PlaceCall => Capability::PlaceCall,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageChunk {
    pub sequence_index: usize,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub kind: ActionKind,
    pub recipients: Vec<Recipient>,
    pub body: Option<String>,
}

impl DispatchRequest {
    pub fn message(recipients: Vec<Recipient>, body: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::SendMessage,
            recipients,
            body: Some(body.into()),
        }
    }

    pub fn call(recipients: Vec<Recipient>) -> Self {
        Self {
            kind: ActionKind::PlaceCall,
            recipients,
            body: None,
        }
    }

    /// 拒絕空批次以及沒有內容的訊息請求
    pub fn validate(&self) -> Result<()> {
        if self.recipients.is_empty() {
            return Err(DispatchError::invalid_request("recipients cannot be empty"));
        }
        if self.kind == ActionKind::SendMessage {
            match self.body.as_deref() {
                Some(body) if !body.is_empty() => {}
                _ => {
                    return Err(DispatchError::invalid_request(
                        "message body is required for send_message",
                    ))
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Delivered,
    PermissionDenied,
    TransportFailed { reason: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientOutcome {
    pub recipient: Recipient,
    pub outcome: DeliveryOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReport {
    pub kind: ActionKind,
    pub attempted: usize,
    pub outcomes: Vec<RecipientOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DispatchReport {
    pub fn delivered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.is_delivered())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.delivered()
    }

    /// 批次是否因權限不足被拒絕
    pub fn is_permission_denied(&self) -> bool {
        !self.outcomes.is_empty()
            && self
                .outcomes
                .iter()
                .all(|o| o.outcome == DeliveryOutcome::PermissionDenied)
    }
}
