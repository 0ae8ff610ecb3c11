use std::sync::Arc;

use anyhow::{Result, anyhow};
use quill_core::editor::{EditingSurface, NotificationSink};
use quill_infrastructure::{ConfigService, QuillPaths, init_logging};
use quill_interaction::{HttpTransport, StreamClient, StreamTransport};
use tracing_appender::non_blocking::WorkerGuard;

use crate::edit_session::EditSessionController;

/// Wires configuration, transport and collaborators into a controller.
pub struct AssistantBootstrap {
    pub controller: EditSessionController,
    pub config_service: Arc<ConfigService>,
    /// Keeps the log writer alive; `None` when another subscriber was
    /// already installed.
    pub log_guard: Option<WorkerGuard>,
}

impl AssistantBootstrap {
    /// Full start-up from the platform config directory: logging,
    /// configuration, HTTP transport.
    pub fn start(
        surface: Box<dyn EditingSurface>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        let paths = QuillPaths::resolve().map_err(|e| anyhow!("Failed to resolve paths: {}", e))?;
        Self::start_at(paths, surface, notifier)
    }

    /// Same as [`start`](Self::start) with an explicit config directory.
    pub fn start_at(
        paths: QuillPaths,
        surface: Box<dyn EditingSurface>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        let log_guard = init_logging(&paths.logs_dir())
            .map_err(|e| anyhow!("Failed to initialise logging: {}", e))?;

        tracing::info!(
            "[Bootstrap] using config directory {}",
            paths.config_dir().display()
        );

        let config_service = Arc::new(ConfigService::with_paths(paths));
        let controller = Self::build(config_service.clone(), surface, notifier);

        Ok(Self {
            controller,
            config_service,
            log_guard,
        })
    }

    /// Builds a controller that talks HTTP.
    pub fn build(
        config_service: Arc<ConfigService>,
        surface: Box<dyn EditingSurface>,
        notifier: Arc<dyn NotificationSink>,
    ) -> EditSessionController {
        Self::build_with_transport(
            config_service,
            Arc::new(HttpTransport::new()),
            surface,
            notifier,
        )
    }

    /// Builds a controller over any transport, applying the configured
    /// suppression window and notice duration.
    pub fn build_with_transport(
        config_service: Arc<ConfigService>,
        transport: Arc<dyn StreamTransport>,
        surface: Box<dyn EditingSurface>,
        notifier: Arc<dyn NotificationSink>,
    ) -> EditSessionController {
        let assist = config_service.assist_config();
        let client = StreamClient::new(transport, config_service);

        EditSessionController::new(client, surface, notifier)
            .with_suppression_window(assist.suppression_window())
            .with_notice_duration(assist.notice_duration())
    }
}
