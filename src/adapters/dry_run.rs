use crate::adapters::gateway::{normalize_number, sms_part_limit};
use crate::domain::model::{MessageChunk, Recipient};
use crate::domain::ports::{CallTransport, MessageTransport};
use crate::utils::error::DeliveryError;
use async_trait::async_trait;

/// 只記錄將要發送的內容，不連線到供應商
///
/// 號碼驗證與分段上限與 HTTP 閘道相同，格式錯誤的號碼會得到與實際發送相同的失敗結果
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunTransport;

#[async_trait]
impl MessageTransport for DryRunTransport {
    fn max_chunk_length(&self, body: &str) -> usize {
        sms_part_limit(body)
    }

    async fn deliver_message(
        &self,
        recipient: &Recipient,
        chunks: &[MessageChunk],
    ) -> Result<(), DeliveryError> {
        let number = normalize_number(recipient.identifier())?;
        for chunk in chunks {
            tracing::info!(
                "🧪 [dry-run] SMS to {} part {}/{}: {}",
                number,
                chunk.sequence_index + 1,
                chunks.len(),
                chunk.text
            );
        }
        Ok(())
    }
}

#[async_trait]
impl CallTransport for DryRunTransport {
    async fn place_call(&self, recipient: &Recipient) -> Result<(), DeliveryError> {
        let number = normalize_number(recipient.identifier())?;
        tracing::info!("🧪 [dry-run] Calling tel:{}", number);
        Ok(())
    }
}
