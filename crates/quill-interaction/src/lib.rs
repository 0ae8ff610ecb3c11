//! Network side of Quill's AI assistant.
//!
//! [`StreamClient`] opens one chat-completions stream per request and reports
//! fragments and the terminal outcome to a [`StreamObserver`]. The HTTP work
//! sits behind [`StreamTransport`] so tests can script responses with
//! [`ScriptedTransport`].

pub mod fake;
pub mod request;
pub mod stream;
pub mod transport;

pub use fake::{ChunkFeeder, ScriptedResponse, ScriptedTransport};
pub use request::{ChatCompletionRequest, ChatMessage, StreamRequest};
pub use stream::{
    ChannelObserver, SseDecoder, SseRecord, StreamCallbacks, StreamClient, StreamEvent,
    StreamEventKind, StreamHandle, StreamObserver,
};
pub use transport::{ByteStream, HttpTransport, StreamTransport};
