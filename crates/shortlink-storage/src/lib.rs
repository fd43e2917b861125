pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::{PoolSettings, PostgresRepository};
pub use shortlink_core::repository::{ReadRepository, Repository, Result};
pub use shortlink_core::StorageError;
