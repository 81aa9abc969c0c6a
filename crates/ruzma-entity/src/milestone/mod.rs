//! Milestone domain entities.

pub mod model;

pub use model::{CreateMilestone, Milestone};
