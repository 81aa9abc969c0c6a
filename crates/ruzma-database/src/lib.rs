//! # ruzma-database
//!
//! PostgreSQL connection management, migrations and the [`MilestoneStore`]
//! abstraction with its Postgres and in-memory implementations.

pub mod connection;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use repositories::MilestoneRepository;
pub use store::MilestoneStore;
