//! Filesystem-facing pieces: config paths, config.toml and secret.json
//! storage, the [`ConfigService`] and logging setup.

pub mod config_service;
pub mod logging;
pub mod paths;
pub mod storage;

pub use config_service::ConfigService;
pub use logging::init_logging;
pub use paths::QuillPaths;
