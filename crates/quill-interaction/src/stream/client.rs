//! Streaming chat-completions client.

use futures::StreamExt;
use quill_core::AssistError;
use quill_core::action::ChatRequest;
use quill_core::editor::ConfigProvider;
use std::sync::Arc;

use super::decoder::{SseDecoder, SseRecord};
use super::handle::StreamHandle;
use super::observer::StreamObserver;
use crate::request::{ChatCompletionRequest, StreamRequest};
use crate::transport::StreamTransport;

/// Opens one stream per [`start`](Self::start) and remembers the last handle
/// it issued, so that starting again cancels the previous stream.
pub struct StreamClient {
    transport: Arc<dyn StreamTransport>,
    config: Arc<dyn ConfigProvider>,
    last: Option<StreamHandle>,
}

impl StreamClient {
    pub fn new(transport: Arc<dyn StreamTransport>, config: Arc<dyn ConfigProvider>) -> Self {
        Self {
            transport,
            config,
            last: None,
        }
    }

    /// Starts streaming `request` on the current tokio runtime.
    ///
    /// Configuration problems are returned synchronously as
    /// [`AssistError::Config`] and the observer is never called. Everything
    /// after that is delivered to the observer from a spawned task.
    pub fn start<O: StreamObserver>(
        &mut self,
        request: &ChatRequest,
        observer: O,
    ) -> Result<StreamHandle, AssistError> {
        self.cancel_current();
        let stream_request = self.prepare(request)?;
        Ok(self.open(stream_request, observer))
    }

    /// Starts a request already checked by [`prepare`](Self::prepare).
    /// Cancels the previous stream like [`start`](Self::start).
    pub fn open<O: StreamObserver>(
        &mut self,
        stream_request: StreamRequest,
        mut observer: O,
    ) -> StreamHandle {
        self.cancel_current();
        tracing::info!(
            "[StreamClient] opening stream: model={}, url={}",
            stream_request.body.model,
            stream_request.url
        );

        let handle = StreamHandle::new();
        self.last = Some(handle.clone());

        let transport = Arc::clone(&self.transport);
        let task_handle = handle.clone();
        tokio::spawn(async move {
            let token = task_handle.token();
            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                outcome = drive(transport.as_ref(), &stream_request, &task_handle, &mut observer) => Some(outcome),
            };

            match outcome {
                None => tracing::debug!("[StreamClient] stream cancelled"),
                Some(Ok(full_text)) => {
                    if task_handle.settle() {
                        tracing::info!(
                            "[StreamClient] stream finished: {} chars",
                            full_text.chars().count()
                        );
                        observer.on_finish(full_text);
                    }
                }
                Some(Err(err)) if err.is_abort() => {
                    tracing::debug!("[StreamClient] stream aborted mid-read");
                }
                Some(Err(err)) => {
                    if task_handle.settle() {
                        tracing::warn!("[StreamClient] stream failed: {}", err);
                        observer.on_error(err);
                    }
                }
            }
        });

        handle
    }

    /// Cancels the most recently issued stream, if any.
    pub fn cancel_current(&mut self) {
        if let Some(previous) = self.last.take() {
            if previous.cancel() {
                tracing::debug!("[StreamClient] cancelled previous stream");
            }
        }
    }

    /// Resolves the endpoint, credential and model for `request` without
    /// touching the network.
    pub fn prepare(&self, request: &ChatRequest) -> Result<StreamRequest, AssistError> {
        let settings = self.config.get();

        if !settings.provider.streams_chat_completions() {
            return Err(AssistError::config(format!(
                "provider {:?} does not support chat-completions streaming",
                settings.provider
            )));
        }
        let url = settings
            .endpoint()
            .ok_or_else(|| AssistError::config("no API base URL configured"))?;
        let credential = settings.credential().map(str::to_string);
        if credential.is_none() && settings.provider.requires_credential() {
            return Err(AssistError::config("no API key configured"));
        }
        let model = settings.model.trim();
        if model.is_empty() {
            return Err(AssistError::config("no model configured"));
        }

        Ok(StreamRequest {
            url,
            credential,
            body: ChatCompletionRequest::streaming(model, request),
        })
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.cancel_current();
    }
}

/// Reads the response until `[DONE]` or end of body, forwarding fragments.
/// Returns the accumulated text.
async fn drive<O: StreamObserver>(
    transport: &dyn StreamTransport,
    request: &StreamRequest,
    handle: &StreamHandle,
    observer: &mut O,
) -> Result<String, AssistError> {
    let mut body = transport.open(request).await?;
    let mut decoder = SseDecoder::new();
    let mut full_text = String::new();

    while let Some(chunk) = body.next().await {
        let records = decoder.feed(&chunk?);
        if forward(records, handle, observer, &mut full_text)? {
            return Ok(full_text);
        }
    }

    forward(decoder.finish(), handle, observer, &mut full_text)?;
    Ok(full_text)
}

/// Returns `Ok(true)` once `[DONE]` is reached.
fn forward<O: StreamObserver>(
    records: Vec<SseRecord>,
    handle: &StreamHandle,
    observer: &mut O,
    full_text: &mut String,
) -> Result<bool, AssistError> {
    for record in records {
        match record {
            SseRecord::Done => return Ok(true),
            SseRecord::Delta(fragment) => {
                if !handle.is_live() {
                    return Err(AssistError::Aborted);
                }
                observer.on_fragment(&fragment);
                full_text.push_str(&fragment);
            }
        }
    }
    Ok(false)
}
