//! Transport seam between the stream client and HTTP.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use quill_core::AssistError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::request::StreamRequest;

/// Raw response body as it arrives, chunk by chunk.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, AssistError>>;

/// Opens the response body of a streaming request.
///
/// A non-success status must be returned as [`AssistError::Http`] without
/// handing out a body stream.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    async fn open(&self, request: &StreamRequest) -> Result<ByteStream, AssistError>;
}

/// reqwest-backed transport.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl StreamTransport for HttpTransport {
    async fn open(&self, request: &StreamRequest) -> Result<ByteStream, AssistError> {
        let mut builder = self
            .client
            .post(&request.url)
            .header("content-type", "application/json")
            .header("accept", "text/event-stream")
            .json(&request.body);
        if let Some(credential) = &request.credential {
            builder = builder.header("Authorization", format!("Bearer {credential}"));
        }

        let response = builder
            .send()
            .await
            .map_err(|err| AssistError::unknown(format!("AI request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        if response.content_length() == Some(0) {
            return Err(AssistError::StreamUnavailable);
        }

        let body = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|err| AssistError::unknown(format!("AI stream read failed: {err}")))
        });
        Ok(body.boxed())
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub(crate) fn map_http_error(status: StatusCode, body: String) -> AssistError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);
    AssistError::Http {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_prefers_api_message() {
        let err = map_http_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Invalid API key","type":"auth"}}"#.to_string(),
        );
        assert_eq!(
            err,
            AssistError::Http {
                status: 401,
                message: "Invalid API key".into()
            }
        );
    }

    #[test]
    fn http_error_falls_back_to_raw_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert_eq!(
            err,
            AssistError::Http {
                status: 502,
                message: "upstream down".into()
            }
        );
    }
}
