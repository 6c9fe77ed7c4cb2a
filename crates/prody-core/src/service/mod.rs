pub mod activity_log;
pub mod analytics;
pub mod auth;
pub mod mail;
pub mod meeting;
pub mod notification;
pub mod organization;
pub mod task;
pub mod user;
