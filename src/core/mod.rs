pub mod dispatcher;
pub mod segmenter;

pub use crate::domain::model::{
    ActionKind, Capability, DeliveryOutcome, DispatchReport, DispatchRequest, MessageChunk,
    Recipient, RecipientOutcome,
};
pub use crate::domain::ports::{CallTransport, MessageTransport, PermissionOracle};
pub use crate::utils::error::Result;
