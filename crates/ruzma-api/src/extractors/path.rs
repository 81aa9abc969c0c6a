//! Typed path parameter helpers.

use ruzma_core::error::AppError;
use ruzma_core::result::AppResult;
use ruzma_core::types::{MilestoneId, ProjectId};

/// Parses a milestone ID from a path segment.
pub fn parse_milestone_id(s: &str) -> AppResult<MilestoneId> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid milestone ID: {s}")))
}

/// Parses a project ID from a path segment.
pub fn parse_project_id(s: &str) -> AppResult<ProjectId> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid project ID: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruzma_core::error::ErrorKind;

    #[test]
    fn test_parse_milestone_id() {
        let id = MilestoneId::new();
        assert_eq!(parse_milestone_id(&id.to_string()).unwrap(), id);
        assert_eq!(
            parse_milestone_id("abc").unwrap_err().kind,
            ErrorKind::Validation
        );
    }
}
