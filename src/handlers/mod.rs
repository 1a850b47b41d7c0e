// Route handlers, grouped by resource. Routing itself lives in `app`.
pub mod auth;
pub mod fallback;
pub mod health;
pub mod users;
