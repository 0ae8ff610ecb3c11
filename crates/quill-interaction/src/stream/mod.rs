//! Streaming client: decoder, handle, observers and the client itself.

mod client;
mod decoder;
mod handle;
mod observer;

pub use client::StreamClient;
pub use decoder::{SseDecoder, SseRecord};
pub use handle::StreamHandle;
pub use observer::{ChannelObserver, StreamCallbacks, StreamEvent, StreamEventKind, StreamObserver};
