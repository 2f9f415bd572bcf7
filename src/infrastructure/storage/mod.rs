//! Storage infrastructure - document store implementations

mod evaluator;
mod factory;
mod in_memory;
mod postgres;

pub use factory::{StorageConfig, StorageFactory, StorageType};
pub use in_memory::InMemoryStorage;
pub use postgres::{CompiledQuery, JsonbQueryCompiler, PostgresConfig, PostgresStorage, SqlParam};
