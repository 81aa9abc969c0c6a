//! Postgres repository implementations.

pub mod milestone;

pub use milestone::MilestoneRepository;
