//! Push event tags
//!
//! Every event delivered over the socket layer carries one of these tags in
//! its envelope. Clients branch on the tag, so the strings are part of the
//! wire contract.

pub const NEW_ACTIVITY_LOG: &str = "NEW_ACTIVITY_LOG";
pub const MEETING_CREATED: &str = "MEETING_CREATED";
pub const MEETING_UPDATED: &str = "MEETING_UPDATED";
pub const PARTICIPANT_JOINED: &str = "PARTICIPANT_JOINED";
pub const ORG_JOINED: &str = "ORG_JOINED";
pub const NEW_NOTIFICATION: &str = "NEW_NOTIFICATION";
pub const TASK_CREATED: &str = "TASK_CREATED";
