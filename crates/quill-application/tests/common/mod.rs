#![allow(dead_code)]

use quill_application::EditSessionController;
use quill_core::config::{AiProvider, AiSettings};
use quill_core::editor::{ConfigProvider, Coordinates, EditingSurface, NotificationSink, Selection};
use quill_interaction::{ScriptedTransport, StreamClient};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Plain-text editing surface over a character buffer.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    chars: Vec<char>,
    selection: Selection,
    editable: bool,
}

impl MemorySurface {
    pub fn new(content: &str) -> Self {
        let chars: Vec<char> = content.chars().collect();
        let end = chars.len();
        Self {
            chars,
            selection: Selection::cursor(end),
            editable: true,
        }
    }

    /// Selects the first occurrence of `needle`.
    pub fn selecting(mut self, needle: &str) -> Self {
        let content: String = self.chars.iter().collect();
        let byte_start = content.find(needle).expect("needle not in content");
        let from = content[..byte_start].chars().count();
        self.selection = Selection::new(from, from + needle.chars().count());
        self
    }

    pub fn with_cursor(mut self, position: usize) -> Self {
        self.selection = Selection::cursor(position);
        self
    }
}

impl EditingSurface for MemorySurface {
    fn selection(&self) -> Selection {
        self.selection
    }

    fn select(&mut self, selection: Selection) {
        self.selection = selection;
    }

    fn text(&self, from: usize, to: usize) -> String {
        let to = to.min(self.chars.len());
        self.chars[from.min(to)..to].iter().collect()
    }

    fn content(&self) -> String {
        self.chars.iter().collect()
    }

    fn set_content(&mut self, content: &str) {
        self.chars = content.chars().collect();
        self.selection = Selection::cursor(self.chars.len());
    }

    fn delete_range(&mut self, from: usize, to: usize) {
        let to = to.min(self.chars.len());
        self.chars.drain(from.min(to)..to);
    }

    fn insert_at(&mut self, position: usize, text: &str) {
        let position = position.min(self.chars.len());
        self.chars.splice(position..position, text.chars());
    }

    fn coordinates_of(&self, position: usize) -> Coordinates {
        Coordinates {
            x: position as f64 * 8.0,
            y: 20.0,
        }
    }

    fn is_editable(&self) -> bool {
        self.editable
    }

    fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }
}

#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<(String, Duration)>>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|(message, _)| message.clone())
            .collect()
    }

    pub fn durations(&self) -> Vec<Duration> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|(_, duration)| *duration)
            .collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn show(&self, message: &str, duration: Duration) {
        self.notices
            .lock()
            .unwrap()
            .push((message.to_string(), duration));
    }
}

pub struct StaticConfig(pub AiSettings);

impl ConfigProvider for StaticConfig {
    fn get(&self) -> AiSettings {
        self.0.clone()
    }
}

pub fn configured() -> AiSettings {
    AiSettings {
        provider: AiProvider::OpenAiCompatible,
        base_url: "https://api.test/v1".into(),
        api_key: "sk-test".into(),
        model: "test-model".into(),
    }
}

pub struct Harness {
    pub controller: EditSessionController,
    pub transport: Arc<ScriptedTransport>,
    pub notifier: RecordingNotifier,
}

pub fn harness(surface: MemorySurface) -> Harness {
    harness_with(surface, configured())
}

pub fn harness_with(surface: MemorySurface, settings: AiSettings) -> Harness {
    let transport = Arc::new(ScriptedTransport::new());
    let notifier = RecordingNotifier::default();
    let client = StreamClient::new(transport.clone(), Arc::new(StaticConfig(settings)));
    let controller =
        EditSessionController::new(client, Box::new(surface), Arc::new(notifier.clone()));
    Harness {
        controller,
        transport,
        notifier,
    }
}
