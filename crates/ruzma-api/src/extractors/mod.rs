//! Request extractors.

pub mod json;
pub mod pagination;
pub mod path;

pub use json::ValidJson;
pub use pagination::PaginationParams;
pub use path::{parse_milestone_id, parse_project_id};
