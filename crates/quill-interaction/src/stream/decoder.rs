//! Incremental decoder for `data:`-prefixed server-sent event streams.

use quill_core::AssistError;

use crate::request::ChatCompletionChunk;

const DATA_PREFIX: &str = "data:";
const DONE_MARKER: &str = "[DONE]";

/// A decoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseRecord {
    /// Non-empty `choices[0].delta.content`.
    Delta(String),
    /// The `[DONE]` terminator.
    Done,
}

/// Turns arbitrarily split byte chunks into [`SseRecord`]s.
///
/// Bytes are held until a newline arrives, so a multi-byte character split
/// across chunks is decoded intact. Malformed records are skipped. Nothing is
/// produced after `[DONE]`.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the records completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseRecord> {
        let mut records = Vec::new();
        if self.done {
            return records;
        }
        self.buffer.extend_from_slice(chunk);

        while let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(record) = self.decode_line(&line[..line.len() - 1]) {
                records.push(record);
                if self.done {
                    self.buffer.clear();
                    break;
                }
            }
        }
        records
    }

    /// Flushes a trailing line that was never newline-terminated.
    pub fn finish(&mut self) -> Vec<SseRecord> {
        if self.done || self.buffer.is_empty() {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line).into_iter().collect()
    }

    fn decode_line(&mut self, line: &[u8]) -> Option<SseRecord> {
        let line = match std::str::from_utf8(line) {
            Ok(line) => line.strip_suffix('\r').unwrap_or(line),
            Err(err) => {
                tracing::debug!("[SseDecoder] skipping non UTF-8 line: {}", err);
                return None;
            }
        };
        let payload = line.strip_prefix(DATA_PREFIX)?.trim();
        if payload == DONE_MARKER {
            self.done = true;
            return Some(SseRecord::Done);
        }
        match parse_record(payload) {
            Ok(Some(content)) => Some(SseRecord::Delta(content)),
            Ok(None) => None,
            Err(err) => {
                tracing::debug!("[SseDecoder] {}", err);
                None
            }
        }
    }
}

/// Extracts the delta text from one JSON record.
fn parse_record(payload: &str) -> Result<Option<String>, AssistError> {
    if payload.is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<ChatCompletionChunk>(payload)
        .map(ChatCompletionChunk::into_content)
        .map_err(|err| AssistError::Parse(format!("{err}: {payload}")))
}
