use crate::core::segmenter;
use crate::domain::model::{Capability, MessageChunk, Recipient};
use crate::utils::error::DeliveryError;
use async_trait::async_trait;

/// 查詢權限目前是否已授予
///
/// `request_capabilities` 只發出請求不等待結果，授權稍後由宿主回報，呼叫端需重新查詢 `has_capability`
pub trait PermissionOracle: Send + Sync {
    fn has_capability(&self, capability: Capability) -> bool;
    fn request_capabilities(&self, capabilities: &[Capability]);
}

#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// 此內容單一封包的最大長度 (以字元計)
    fn max_chunk_length(&self, body: &str) -> usize;

    fn segment(&self, body: &str) -> Vec<MessageChunk> {
        segmenter::split(body, self.max_chunk_length(body))
    }

    /// 將所有片段當作一則訊息送出，超過一段即為多段簡訊
    async fn deliver_message(
        &self,
        recipient: &Recipient,
        chunks: &[MessageChunk],
    ) -> std::result::Result<(), DeliveryError>;
}

#[async_trait]
pub trait CallTransport: Send + Sync {
    /// 撥號發起即視為成功，不等待接通
    async fn place_call(&self, recipient: &Recipient) -> std::result::Result<(), DeliveryError>;
}
