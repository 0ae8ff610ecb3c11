use quill_core::AssistError;
use quill_core::action::ChatRequest;
use quill_core::config::{AiProvider, AiSettings};
use quill_core::editor::ConfigProvider;
use quill_interaction::{
    ChannelObserver, ScriptedResponse, ScriptedTransport, StreamCallbacks, StreamClient,
    StreamEvent, StreamEventKind,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

struct StaticConfig(AiSettings);

impl ConfigProvider for StaticConfig {
    fn get(&self) -> AiSettings {
        self.0.clone()
    }
}

fn configured() -> AiSettings {
    AiSettings {
        provider: AiProvider::OpenAiCompatible,
        base_url: "https://api.test/v1".into(),
        api_key: "sk-test".into(),
        model: "test-model".into(),
    }
}

fn client_with(transport: &Arc<ScriptedTransport>, settings: AiSettings) -> StreamClient {
    StreamClient::new(transport.clone(), Arc::new(StaticConfig(settings)))
}

fn request() -> ChatRequest {
    ChatRequest {
        instruction: "Rewrite.".into(),
        input: "some text".into(),
    }
}

async fn collect(mut rx: mpsc::UnboundedReceiver<StreamEvent>) -> Vec<StreamEventKind> {
    let mut kinds = Vec::new();
    while let Some(event) = rx.recv().await {
        kinds.push(event.kind);
    }
    kinds
}

#[tokio::test]
async fn fragments_then_finish_with_full_text() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_fragments(&["Hel", "lo", " world"]);
    let mut client = client_with(&transport, configured());

    let (tx, rx) = mpsc::unbounded_channel();
    let session = Uuid::new_v4();
    client
        .start(&request(), ChannelObserver::new(session, tx))
        .unwrap();

    assert_eq!(
        collect(rx).await,
        vec![
            StreamEventKind::Fragment("Hel".into()),
            StreamEventKind::Fragment("lo".into()),
            StreamEventKind::Fragment(" world".into()),
            StreamEventKind::Finished("Hello world".into()),
        ]
    );

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].url, "https://api.test/v1/chat/completions");
    assert_eq!(sent[0].credential.as_deref(), Some("sk-test"));
    assert_eq!(sent[0].body.model, "test-model");
    assert!(sent[0].body.stream);
    assert_eq!(sent[0].body.user_input(), Some("some text"));
}

#[tokio::test]
async fn http_error_emits_no_fragments() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_status(500, r#"{"error":{"message":"overloaded"}}"#);
    let mut client = client_with(&transport, configured());

    let (tx, rx) = mpsc::unbounded_channel();
    client
        .start(&request(), ChannelObserver::new(Uuid::new_v4(), tx))
        .unwrap();

    assert_eq!(
        collect(rx).await,
        vec![StreamEventKind::Failed(AssistError::Http {
            status: 500,
            message: "overloaded".into()
        })]
    );
}

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut client = client_with(
        &transport,
        AiSettings {
            api_key: String::new(),
            ..configured()
        },
    );

    let calls = Arc::new(Mutex::new(0usize));
    let (a, b, c) = (calls.clone(), calls.clone(), calls.clone());
    let observer = StreamCallbacks::new(
        move |_: &str| *a.lock().unwrap() += 1,
        move |_: String| *b.lock().unwrap() += 1,
        move |_: AssistError| *c.lock().unwrap() += 1,
    );

    let err = client.start(&request(), observer).unwrap_err();
    assert!(matches!(err, AssistError::Config(_)));
    tokio::task::yield_now().await;
    assert_eq!(transport.request_count(), 0);
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn missing_model_or_endpoint_is_a_config_error() {
    let transport = Arc::new(ScriptedTransport::new());
    let (tx, _rx) = mpsc::unbounded_channel();

    let mut no_model = client_with(
        &transport,
        AiSettings {
            model: " ".into(),
            ..configured()
        },
    );
    let err = no_model
        .start(&request(), ChannelObserver::new(Uuid::new_v4(), tx.clone()))
        .unwrap_err();
    assert!(matches!(err, AssistError::Config(_)));

    let mut no_url = client_with(
        &transport,
        AiSettings {
            base_url: String::new(),
            ..configured()
        },
    );
    let err = no_url
        .start(&request(), ChannelObserver::new(Uuid::new_v4(), tx))
        .unwrap_err();
    assert!(matches!(err, AssistError::Config(_)));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn ollama_streams_without_credential() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_fragments(&["ok"]);
    let mut client = client_with(
        &transport,
        AiSettings {
            provider: AiProvider::Ollama,
            base_url: "http://localhost:11434/v1".into(),
            api_key: String::new(),
            model: "llama3".into(),
        },
    );

    let (tx, rx) = mpsc::unbounded_channel();
    client
        .start(&request(), ChannelObserver::new(Uuid::new_v4(), tx))
        .unwrap();

    assert_eq!(collect(rx).await.last(), Some(&StreamEventKind::Finished("ok".into())));
    assert_eq!(transport.requests()[0].credential, None);
}

#[tokio::test]
async fn non_streaming_provider_is_rejected() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut client = client_with(
        &transport,
        AiSettings {
            provider: AiProvider::Anthropic,
            ..configured()
        },
    );
    let (tx, _rx) = mpsc::unbounded_channel();
    let err = client
        .start(&request(), ChannelObserver::new(Uuid::new_v4(), tx))
        .unwrap_err();
    assert!(matches!(err, AssistError::Config(_)));
}

#[tokio::test]
async fn malformed_record_between_valid_ones_is_skipped() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_chunks([
        quill_interaction::fake::delta_line("a"),
        "data: {\"choices\": [oops\n".to_string(),
        quill_interaction::fake::delta_line("b"),
        quill_interaction::fake::DONE_LINE.to_string(),
    ]);
    let mut client = client_with(&transport, configured());

    let (tx, rx) = mpsc::unbounded_channel();
    client
        .start(&request(), ChannelObserver::new(Uuid::new_v4(), tx))
        .unwrap();

    assert_eq!(
        collect(rx).await,
        vec![
            StreamEventKind::Fragment("a".into()),
            StreamEventKind::Fragment("b".into()),
            StreamEventKind::Finished("ab".into()),
        ]
    );
}

#[tokio::test]
async fn body_ending_without_done_is_a_normal_finish() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_chunks([quill_interaction::fake::delta_line("partial")]);
    let mut client = client_with(&transport, configured());

    let (tx, rx) = mpsc::unbounded_channel();
    client
        .start(&request(), ChannelObserver::new(Uuid::new_v4(), tx))
        .unwrap();

    assert_eq!(
        collect(rx).await,
        vec![
            StreamEventKind::Fragment("partial".into()),
            StreamEventKind::Finished("partial".into()),
        ]
    );
}

#[tokio::test]
async fn unreadable_body_is_reported() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push(ScriptedResponse::Unavailable);
    let mut client = client_with(&transport, configured());

    let (tx, rx) = mpsc::unbounded_channel();
    client
        .start(&request(), ChannelObserver::new(Uuid::new_v4(), tx))
        .unwrap();

    assert_eq!(
        collect(rx).await,
        vec![StreamEventKind::Failed(AssistError::StreamUnavailable)]
    );
}

#[tokio::test]
async fn mid_stream_failure_is_reported_once() {
    let transport = Arc::new(ScriptedTransport::new());
    let feeder = transport.push_channel();
    let mut client = client_with(&transport, configured());

    let (tx, rx) = mpsc::unbounded_channel();
    client
        .start(&request(), ChannelObserver::new(Uuid::new_v4(), tx))
        .unwrap();

    feeder.send_fragment("half");
    feeder.fail(AssistError::unknown("connection reset"));
    feeder.send_fragment("never");

    assert_eq!(
        collect(rx).await,
        vec![
            StreamEventKind::Fragment("half".into()),
            StreamEventKind::Failed(AssistError::unknown("connection reset")),
        ]
    );
}

#[tokio::test]
async fn cancel_suppresses_every_later_callback() {
    let transport = Arc::new(ScriptedTransport::new());
    let feeder = transport.push_channel();
    let mut client = client_with(&transport, configured());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = client
        .start(&request(), ChannelObserver::new(Uuid::new_v4(), tx))
        .unwrap();

    feeder.send_fragment("first");
    let first = rx.recv().await.unwrap();
    assert_eq!(first.kind, StreamEventKind::Fragment("first".into()));

    assert!(handle.cancel());
    assert!(!handle.cancel());
    feeder.send_fragment("second");
    feeder.send_done();

    assert_eq!(rx.recv().await, None);
    assert!(feeder.is_closed());
}

#[tokio::test]
async fn starting_again_cancels_the_previous_stream() {
    let transport = Arc::new(ScriptedTransport::new());
    let first_feeder = transport.push_channel();
    transport.push_fragments(&["B"]);
    let mut client = client_with(&transport, configured());

    let (tx_a, rx_a) = mpsc::unbounded_channel();
    let handle_a = client
        .start(&request(), ChannelObserver::new(Uuid::new_v4(), tx_a))
        .unwrap();
    tokio::task::yield_now().await;

    let (tx_b, rx_b) = mpsc::unbounded_channel();
    client
        .start(&request(), ChannelObserver::new(Uuid::new_v4(), tx_b))
        .unwrap();
    first_feeder.send_fragment("A");

    assert!(handle_a.is_cancelled());
    assert!(collect(rx_a).await.is_empty());
    assert_eq!(
        collect(rx_b).await,
        vec![
            StreamEventKind::Fragment("B".into()),
            StreamEventKind::Finished("B".into()),
        ]
    );
}
