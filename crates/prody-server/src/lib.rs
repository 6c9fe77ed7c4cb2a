// Main library module for Prody - a multi-tenant productivity backend

// Module declarations
pub mod api; // HTTP and WebSocket handlers
pub mod middleware; // HTTP middleware
pub mod model; // Configuration, app state, response envelope
pub mod startup; // Application startup utilities

pub use model::config::Configuration;
