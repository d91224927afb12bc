pub mod diesel_pool;
pub mod memory_store;
pub mod user_store;

pub use diesel_pool::{
    create_diesel_pool, mask_connection_string, DieselDatabaseConfig, DieselPool, MIGRATIONS,
};
pub use memory_store::MemoryUserStore;
pub use user_store::{DieselUserStore, StoreError, StoreResult, UserStore};
