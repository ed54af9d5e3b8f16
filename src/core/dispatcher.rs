use crate::domain::model::{
    ActionKind, DeliveryOutcome, DispatchReport, DispatchRequest, MessageChunk, Recipient,
    RecipientOutcome,
};
use crate::domain::ports::{CallTransport, MessageTransport, PermissionOracle};
use crate::utils::error::{DeliveryError, Result};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// 將一個請求分派給所有收件人
///
/// 每次呼叫只檢查一次權限。每位收件人只嘗試一次，結果各自獨立記錄，
/// 即使並行處理，結果仍依輸入順序回傳。
pub struct BulkDispatcher<P, M, C>
where
    P: PermissionOracle,
    M: MessageTransport,
    C: CallTransport,
{
    oracle: P,
    messages: M,
    calls: C,
    max_in_flight: usize,
}

impl<P, M, C> BulkDispatcher<P, M, C>
where
    P: PermissionOracle,
    M: MessageTransport,
    C: CallTransport,
{
    pub fn new(oracle: P, messages: M, calls: C) -> Self {
        Self {
            oracle,
            messages,
            calls,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// 設為 `1` 時逐一依序處理收件人
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn oracle(&self) -> &P {
        &self.oracle
    }

    pub async fn dispatch(&self, request: DispatchRequest) -> Result<DispatchReport> {
        request.validate()?;

        let started_at = Utc::now();
        let kind = request.kind;
        let attempted = request.recipients.len();
        let capability = kind.required_capability();

        if !self.oracle.has_capability(capability) {
            tracing::warn!(
                "🚫 {} not granted, rejecting batch of {} recipients",
                capability,
                attempted
            );
            let outcomes = request
                .recipients
                .into_iter()
                .map(|recipient| RecipientOutcome {
                    recipient,
                    outcome: DeliveryOutcome::PermissionDenied,
                })
                .collect();
            return Ok(DispatchReport {
                kind,
                attempted,
                outcomes,
                started_at,
                finished_at: Utc::now(),
            });
        }

        // 分段與收件人無關，每批次只做一次
        let chunks = match (kind, request.body.as_deref()) {
            (ActionKind::SendMessage, Some(body)) => self.messages.segment(body),
            _ => Vec::new(),
        };
        if chunks.len() > 1 {
            tracing::debug!("📨 Message split into {} parts", chunks.len());
        }

        let chunks = &chunks;
        let outcomes: Vec<RecipientOutcome> = stream::iter(request.recipients)
            .map(|recipient| async move {
                let outcome = self.attempt(kind, &recipient, chunks).await;
                RecipientOutcome { recipient, outcome }
            })
            .buffered(self.max_in_flight)
            .collect()
            .await;

        let report = DispatchReport {
            kind,
            attempted,
            outcomes,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "✅ Bulk dispatch completed for {} recipients: {} delivered, {} failed",
            report.attempted,
            report.delivered(),
            report.failed()
        );

        Ok(report)
    }

    async fn attempt(
        &self,
        kind: ActionKind,
        recipient: &Recipient,
        chunks: &[MessageChunk],
    ) -> DeliveryOutcome {
        let delivery = match kind {
            ActionKind::SendMessage => self.messages.deliver_message(recipient, chunks),
            ActionKind::PlaceCall => self.calls.place_call(recipient),
        };

        let result = AssertUnwindSafe(delivery)
            .catch_unwind()
            .await
            .unwrap_or(Err(DeliveryError::Panicked));

        match result {
            Ok(()) => {
                tracing::debug!(recipient = %recipient, kind = ?kind, "Delivered");
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                tracing::warn!(recipient = %recipient, kind = ?kind, "❌ Delivery failed: {}", e);
                DeliveryOutcome::TransportFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
