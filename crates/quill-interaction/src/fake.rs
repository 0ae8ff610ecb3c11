//! Scripted transport for tests.
//!
//! Responses are consumed in order, one per opened stream. Requests are
//! recorded so tests can assert what (and whether anything) was sent.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use quill_core::AssistError;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::request::StreamRequest;
use crate::transport::{ByteStream, StreamTransport};

type Chunk = Result<Vec<u8>, AssistError>;

/// One scripted reply.
#[derive(Debug)]
pub enum ScriptedResponse {
    /// Non-success status with an error body.
    Status { status: u16, body: String },
    /// A body delivered as these chunks, then closed.
    Chunks(Vec<Vec<u8>>),
    /// A response without a readable body.
    Unavailable,
    /// A body fed live through a [`ChunkFeeder`].
    Channel(UnboundedReceiver<Chunk>),
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<StreamRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn push(&self, response: ScriptedResponse) {
        lock(&self.responses).push_back(response);
    }

    /// Queues a body made of `chunks`.
    pub fn push_chunks<I, C>(&self, chunks: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        self.push(ScriptedResponse::Chunks(
            chunks.into_iter().map(Into::into).collect(),
        ));
    }

    /// Queues a body streaming `fragments` as deltas, then `[DONE]`.
    pub fn push_fragments(&self, fragments: &[&str]) {
        let mut chunks: Vec<Vec<u8>> = fragments
            .iter()
            .map(|fragment| delta_line(fragment).into_bytes())
            .collect();
        chunks.push(DONE_LINE.as_bytes().to_vec());
        self.push(ScriptedResponse::Chunks(chunks));
    }

    pub fn push_status(&self, status: u16, body: impl Into<String>) {
        self.push(ScriptedResponse::Status {
            status,
            body: body.into(),
        });
    }

    /// Queues a live body and returns the feeder that drives it.
    pub fn push_channel(&self) -> ChunkFeeder {
        let (tx, rx) = mpsc::unbounded_channel();
        self.push(ScriptedResponse::Channel(rx));
        ChunkFeeder { tx }
    }

    pub fn requests(&self) -> Vec<StreamRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

#[async_trait]
impl StreamTransport for ScriptedTransport {
    async fn open(&self, request: &StreamRequest) -> Result<ByteStream, AssistError> {
        lock(&self.requests).push(request.clone());
        let response = lock(&self.responses)
            .pop_front()
            .ok_or_else(|| AssistError::unknown("no scripted response left"))?;

        match response {
            ScriptedResponse::Status { status, body } => {
                let status = reqwest::StatusCode::from_u16(status)
                    .map_err(|err| AssistError::unknown(err.to_string()))?;
                Err(crate::transport::map_http_error(status, body))
            }
            ScriptedResponse::Chunks(chunks) => {
                Ok(stream::iter(chunks.into_iter().map(Ok)).boxed())
            }
            ScriptedResponse::Unavailable => Err(AssistError::StreamUnavailable),
            ScriptedResponse::Channel(rx) => Ok(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|chunk| (chunk, rx))
            })
            .boxed()),
        }
    }
}

/// Feeds a [`ScriptedResponse::Channel`] body. Dropping it ends the body.
#[derive(Debug, Clone)]
pub struct ChunkFeeder {
    tx: UnboundedSender<Chunk>,
}

impl ChunkFeeder {
    /// Sends raw bytes. Returns `false` once the stream is gone.
    pub fn send_raw(&self, bytes: impl Into<Vec<u8>>) -> bool {
        self.tx.send(Ok(bytes.into())).is_ok()
    }

    /// Sends one delta record.
    pub fn send_fragment(&self, fragment: &str) -> bool {
        self.send_raw(delta_line(fragment))
    }

    pub fn send_done(&self) -> bool {
        self.send_raw(DONE_LINE)
    }

    /// Fails the body mid-read.
    pub fn fail(&self, error: AssistError) -> bool {
        self.tx.send(Err(error)).is_ok()
    }

    /// Whether the reading side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub const DONE_LINE: &str = "data: [DONE]\n";

/// A `data:` record carrying `fragment` as `choices[0].delta.content`.
pub fn delta_line(fragment: &str) -> String {
    format!(
        "data: {}\n",
        serde_json::json!({ "choices": [{ "index": 0, "delta": { "content": fragment } }] })
    )
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
