//! Prody Realtime - push delivery to live connections
//!
//! This crate provides:
//! - The [`Broadcaster`]: an in-process registry mapping authenticated
//!   connections to their user- and organization-scoped rooms
//! - Event tag constants shared by every producer
//!
//! Delivery is at-most-once and best-effort: the persisted record (task,
//! notification, activity entry) stays the system of record, live pushes are
//! a convenience for connected clients. The registry holds no durable state
//! and starts empty on every process restart.

pub mod broadcaster;
pub mod events;

pub use broadcaster::{Broadcaster, ConnectionId};
