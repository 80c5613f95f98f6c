//! Cross-chart synchronization of hover position and viewport domains.

mod channel;
mod json_contract;
mod layer;

pub use channel::{
    BroadcastChannel, ChannelListener, Envelope, LocalBroadcastChannel, ScopeId, SubscriptionId,
    SyncMessage,
};
pub use json_contract::{SYNC_ENVELOPE_JSON_SCHEMA_V1, SyncEnvelopeJsonContractV1};
pub use layer::{DomainsChangeCallback, SyncConfig, SyncLayer};
