//! 宿主 UI 層使用的方法呼叫介面
//!
//! 呼叫以方法名稱加 JSON 參數傳入，回傳成功值或兩種錯誤碼之一
//! (`PERMISSION_DENIED` 或 `UNAVAILABLE`)。發送類呼叫另外附上每位收件人的結果報告。

use crate::core::dispatcher::BulkDispatcher;
use crate::domain::model::{Capability, DispatchReport, DispatchRequest, Recipient};
use crate::domain::ports::{CallTransport, MessageTransport, PermissionOracle};
use crate::utils::error::{DispatchError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMethod {
    SendMessage,
    SendBulkMessage,
    MakeCall,
    CheckPermissions,
    RequestPermissions,
}

impl HostMethod {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "sendMessage" | "sendSMS" => Some(HostMethod::SendMessage),
            "sendBulkMessage" | "sendBulkSMS" => Some(HostMethod::SendBulkMessage),
            "makeCall" => Some(HostMethod::MakeCall),
            "checkPermissions" => Some(HostMethod::CheckPermissions),
            "requestPermissions" => Some(HostMethod::RequestPermissions),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MethodResult {
    Success { value: Value },
    Error { code: String, message: String },
    NotImplemented,
}

impl MethodResult {
    pub fn success(value: impl Into<Value>) -> Self {
        MethodResult::Success {
            value: value.into(),
        }
    }

    pub fn error(err: &DispatchError) -> Self {
        MethodResult::Error {
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodReply {
    pub result: MethodResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<DispatchReport>,
}

impl MethodReply {
    fn bare(result: MethodResult) -> Self {
        Self {
            result,
            report: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SendMessageArgs {
    number: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Contact {
    #[serde(rename = "phoneNumber")]
    phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendBulkMessageArgs {
    contacts: Option<Vec<Contact>>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MakeCallArgs {
    number: Option<String>,
}

pub struct SosChannel<P, M, C>
where
    P: PermissionOracle,
    M: MessageTransport,
    C: CallTransport,
{
    dispatcher: BulkDispatcher<P, M, C>,
}

impl<P, M, C> SosChannel<P, M, C>
where
    P: PermissionOracle,
    M: MessageTransport,
    C: CallTransport,
{
    pub fn new(dispatcher: BulkDispatcher<P, M, C>) -> Self {
        Self { dispatcher }
    }

    pub async fn handle(&self, call: &MethodCall) -> MethodReply {
        let Some(method) = HostMethod::parse(&call.method) else {
            tracing::warn!("Unknown method: {}", call.method);
            return MethodReply::bare(MethodResult::NotImplemented);
        };
        tracing::debug!("Handling {:?}", method);

        let reply = match method {
            HostMethod::SendMessage => self.send_message(&call.arguments).await,
            HostMethod::SendBulkMessage => self.send_bulk_message(&call.arguments).await,
            HostMethod::MakeCall => self.make_call(&call.arguments).await,
            HostMethod::CheckPermissions => Ok(MethodReply::bare(MethodResult::success(
                self.check_permissions(),
            ))),
            HostMethod::RequestPermissions => {
                self.dispatcher
                    .oracle()
                    .request_capabilities(&Capability::ALL);
                Ok(MethodReply::bare(MethodResult::success(Value::Null)))
            }
        };

        reply.unwrap_or_else(|e| {
            tracing::error!("❌ {} failed: {}", call.method, e);
            MethodReply::bare(MethodResult::error(&e))
        })
    }

    /// 兩種權限都已授予時才為 true
    pub fn check_permissions(&self) -> bool {
        Capability::ALL
            .iter()
            .all(|c| self.dispatcher.oracle().has_capability(*c))
    }

    async fn send_message(&self, arguments: &Value) -> Result<MethodReply> {
        let args: SendMessageArgs = parse_args(arguments, "SMS parameters missing")?;
        let (Some(number), Some(message)) = (args.number, args.message) else {
            return Err(DispatchError::invalid_request("SMS parameters missing"));
        };

        let recipient = Recipient::new(number)?;
        let request = DispatchRequest::message(vec![recipient.clone()], message);
        self.run(request, |_| format!("SMS sent to {}", recipient))
            .await
    }

    async fn send_bulk_message(&self, arguments: &Value) -> Result<MethodReply> {
        let args: SendBulkMessageArgs = parse_args(arguments, "Bulk SMS parameters missing")?;
        let (Some(contacts), Some(message)) = (args.contacts, args.message) else {
            return Err(DispatchError::invalid_request("Bulk SMS parameters missing"));
        };

        let recipients = contacts
            .into_iter()
            .map(|contact| {
                contact
                    .phone_number
                    .ok_or_else(|| DispatchError::invalid_request("contact is missing phoneNumber"))
                    .and_then(Recipient::new)
            })
            .collect::<Result<Vec<_>>>()?;

        let request = DispatchRequest::message(recipients, message);
        self.run(request, |report| {
            format!("Bulk SMS sent to {} contacts", report.attempted)
        })
        .await
    }

    async fn make_call(&self, arguments: &Value) -> Result<MethodReply> {
        let args: MakeCallArgs = parse_args(arguments, "Call parameters missing")?;
        let Some(number) = args.number else {
            return Err(DispatchError::invalid_request("Call parameters missing"));
        };

        let recipient = Recipient::new(number)?;
        let request = DispatchRequest::call(vec![recipient.clone()]);
        self.run(request, |_| format!("Calling {}", recipient)).await
    }

    async fn run<F>(&self, request: DispatchRequest, describe: F) -> Result<MethodReply>
    where
        F: FnOnce(&DispatchReport) -> String,
    {
        let capability = request.kind.required_capability();
        let report = self.dispatcher.dispatch(request).await?;

        if report.is_permission_denied() {
            let err = DispatchError::PermissionDenied { capability };
            tracing::warn!("🚫 {}", err);
            return Ok(MethodReply {
                result: MethodResult::error(&err),
                report: Some(report),
            });
        }

        Ok(MethodReply {
            result: MethodResult::success(describe(&report)),
            report: Some(report),
        })
    }
}

fn parse_args<T: DeserializeOwned>(arguments: &Value, missing: &str) -> Result<T> {
    serde_json::from_value(arguments.clone()).map_err(|e| {
        tracing::debug!("Argument parsing failed: {}", e);
        DispatchError::invalid_request(missing)
    })
}
