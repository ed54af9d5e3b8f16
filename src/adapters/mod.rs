// 適配器層：權限與傳輸的具體實作

pub mod dry_run;
pub mod gateway;
pub mod permissions;

pub use dry_run::DryRunTransport;
pub use gateway::{SmsGateway, VoiceGateway};
pub use permissions::{GrantTable, PermissionPrompt};
