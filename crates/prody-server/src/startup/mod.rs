//! Application startup utilities

pub mod http;
pub mod logging;

pub use http::http_server;
pub use logging::{LoggingConfig, LoggingGuard, init_logging};
