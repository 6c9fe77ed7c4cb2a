// HTTP middleware implementations

pub mod auth; // Authentication middleware and the require_user/require_role helpers
