pub mod config;
pub mod server;
pub mod token;
pub mod users;
