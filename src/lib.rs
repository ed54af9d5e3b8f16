pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::channel::{MethodCall, MethodReply, MethodResult, SosChannel};
pub use config::DispatchConfig;
pub use core::dispatcher::BulkDispatcher;
pub use utils::error::{DeliveryError, DispatchError, Result};
