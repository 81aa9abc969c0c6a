//! Milestone CRUD.

pub mod service;

pub use service::MilestoneService;
