pub mod memory;
pub mod models;
pub mod placeholder;
pub mod postgres;
pub mod store;

pub use memory::MemoryUserStore;
pub use placeholder::PlaceholderUserStore;
pub use postgres::PgUserStore;
pub use store::{StoreError, UserStore};
