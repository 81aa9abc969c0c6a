//! Route handlers, one module per resource.

pub mod deliverable;
pub mod health;
pub mod milestone;
pub mod revision;
