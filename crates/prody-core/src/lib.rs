//! Prody Core - Domain services
//!
//! This crate implements the business rules of the backend. Each service
//! holds its collaborators explicitly (database connection, broadcaster,
//! activity log, mailer, token issuer) - there is no ambient state. Services
//! read and write through SeaORM, append activity entries, and trigger
//! best-effort realtime deliveries.

pub mod model;
pub mod service;

pub use model::*;
