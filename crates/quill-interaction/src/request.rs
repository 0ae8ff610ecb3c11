//! Wire types for the chat-completions endpoint.

use quill_core::action::ChatRequest;
use serde::{Deserialize, Serialize};

/// Body of `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

impl ChatCompletionRequest {
    /// A streaming request with a system instruction and one user message.
    pub fn streaming(model: impl Into<String>, request: &ChatRequest) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage::new("system", request.instruction.as_str()),
                ChatMessage::new("user", request.input.as_str()),
            ],
            stream: true,
        }
    }

    /// The framed user text.
    pub fn user_input(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|message| message.role == "user")
            .map(|message| message.content.as_str())
    }
}

/// Everything a transport needs to open one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub url: String,
    /// Bearer credential; `None` for providers that need none.
    pub credential: Option<String>,
    pub body: ChatCompletionRequest,
}

/// One `data:` record of the response stream.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChunkChoice {
    #[serde(default)]
    pub delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// `choices[0].delta.content` when present and non-empty.
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta)
            .and_then(|delta| delta.content)
            .filter(|content| !content.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_body_matches_wire_format() {
        let request = ChatRequest {
            instruction: "Be terse.".into(),
            input: "hello".into(),
        };
        let body = ChatCompletionRequest::streaming("deepseek-chat", &request);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "Be terse.");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(body.user_input(), Some("hello"));
    }

    #[test]
    fn chunk_without_content_yields_nothing() {
        let chunk: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert_eq!(chunk.into_content(), None);

        let chunk: ChatCompletionChunk = serde_json::from_str(r#"{"usage":{}}"#).unwrap();
        assert_eq!(chunk.into_content(), None);
    }
}
