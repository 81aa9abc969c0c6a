//! In-process milestone store for tests and local tooling.

mod store;

pub use store::MemoryMilestoneStore;
