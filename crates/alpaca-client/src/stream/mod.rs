//! Account event streaming: envelope decoding, subscription fan-out, and the
//! WebSocket connection loop.

pub mod client;
pub mod codec;
pub mod events;
pub mod registry;

pub use client::{StreamClient, StreamConfig};
pub use codec::{CodecError, StreamMessage};
pub use events::{
    AccountUpdate, EventKind, StreamEvent, StreamUpdate, TradeEventType, TradeUpdate,
};
pub use registry::{EventListener, SubscriptionRegistry};
