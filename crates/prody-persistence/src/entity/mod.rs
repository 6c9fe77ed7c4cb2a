//! SeaORM entity definitions for the Prody schema

pub mod prelude;

pub mod activity_logs;
pub mod meeting_participants;
pub mod meetings;
pub mod notifications;
pub mod organizations;
pub mod tasks;
pub mod users;
