pub mod channel;

use crate::adapters::{DryRunTransport, GrantTable, SmsGateway, VoiceGateway};
use crate::config::toml_config::DispatchConfig;
use crate::core::dispatcher::BulkDispatcher;
use crate::domain::ports::{CallTransport, MessageTransport};
use crate::utils::error::DispatchError;
use channel::{MethodCall, MethodReply, MethodResult, SosChannel};

/// 依 `config` 建立通道，處理一次呼叫，並記錄該呼叫產生的權限請求
///
/// 命令列宿主沒有權限對話框，請求只寫入日誌不會被回應；授權來自配置中的 `[permissions]`
pub async fn serve_call(config: &DispatchConfig, call: &MethodCall) -> MethodReply {
    let (grants, mut prompts) = GrantTable::new(&config.permissions.granted);

    let reply = if config.dry_run {
        answer(config, grants, DryRunTransport, DryRunTransport, call).await
    } else {
        match (config.sms.as_ref(), config.voice.as_ref()) {
            (Some(sms), Some(voice)) => {
                answer(
                    config,
                    grants,
                    SmsGateway::new(sms),
                    VoiceGateway::new(voice),
                    call,
                )
                .await
            }
            (None, _) => missing_gateway("sms"),
            (_, None) => missing_gateway("voice"),
        }
    };

    while let Ok(prompt) = prompts.try_recv() {
        tracing::info!(
            prompt_id = prompt.id,
            "🔐 Permission prompt raised for {:?}; grant it under [permissions] or with --grant-all",
            prompt.capabilities
        );
    }

    reply
}

async fn answer<M, C>(
    config: &DispatchConfig,
    grants: GrantTable,
    messages: M,
    calls: C,
    call: &MethodCall,
) -> MethodReply
where
    M: MessageTransport,
    C: CallTransport,
{
    let dispatcher =
        BulkDispatcher::new(grants, messages, calls).with_max_in_flight(config.max_in_flight());
    SosChannel::new(dispatcher).handle(call).await
}

fn missing_gateway(field: &str) -> MethodReply {
    let err = DispatchError::MissingConfigError {
        field: field.to_string(),
    };
    tracing::error!("❌ {}", err);
    MethodReply {
        result: MethodResult::error(&err),
        report: None,
    }
}
