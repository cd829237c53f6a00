pub mod connection;
pub mod models;
pub mod records;
pub mod setup;
pub mod store;

pub use connection::{create_pool, get_connection, DbConn, DbPool};
pub use models::*;
pub use store::SqliteStore;
