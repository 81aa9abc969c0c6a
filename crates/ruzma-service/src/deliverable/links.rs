//! Shared link editing.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use ruzma_core::error::AppError;
use ruzma_core::result::AppResult;
use ruzma_core::types::MilestoneId;
use ruzma_entity::deliverable::{
    LinkIssue, MAX_SHARED_LINKS, SharedLink, SharedLinks, prepare_links, serialize_links,
};

use super::decode;
use super::writer::{DeliverableWriter, FieldChange};

/// Edits the shared links of a milestone without touching its revision ledger.
#[derive(Debug, Clone)]
pub struct LinkService {
    writer: Arc<DeliverableWriter>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(writer: Arc<DeliverableWriter>) -> Self {
        Self { writer }
    }

    /// Replaces all links with `drafts`.
    ///
    /// Blank rows are dropped; every other row must be a valid URL and the
    /// result may hold at most three links. All offending rows are reported
    /// in the error details.
    pub async fn replace_links(
        &self,
        id: MilestoneId,
        drafts: Vec<SharedLink>,
    ) -> AppResult<Vec<SharedLink>> {
        let links = prepare_links(drafts).map_err(invalid_links)?;

        self.writer
            .update(id, |m| {
                Ok(FieldChange::Write {
                    raw: Some(serialize_links(&links, m.deliverable_link.as_deref())),
                    output: (),
                })
            })
            .await?;

        info!(milestone_id = %id, count = links.len(), "Shared links saved");
        Ok(links.into_vec())
    }

    /// Appends one link; refused once the milestone already holds three.
    pub async fn add_link(&self, id: MilestoneId, draft: SharedLink) -> AppResult<Vec<SharedLink>> {
        if draft.url.trim().is_empty() {
            return Err(AppError::validation("Link URL is required"));
        }
        let link = prepare_links(vec![draft])
            .map_err(invalid_links)?
            .into_vec()
            .pop()
            .ok_or_else(|| AppError::validation("Link URL is required"))?;

        let links = self
            .writer
            .update(id, |m| {
                let mut links = SharedLinks::try_from(decode(m).into_links())
                    .map_err(|_| limit_reached())?;
                links.try_push(link.clone()).map_err(|_| limit_reached())?;
                Ok(FieldChange::Write {
                    raw: Some(serialize_links(&links, m.deliverable_link.as_deref())),
                    output: links,
                })
            })
            .await?;

        info!(milestone_id = %id, count = links.len(), "Shared link added");
        Ok(links.into_vec())
    }

    /// Removes every link. Revision history is kept.
    pub async fn clear_links(&self, id: MilestoneId) -> AppResult<()> {
        self.writer
            .update(id, |m| {
                if m.deliverable_link.is_none() {
                    return Ok(FieldChange::Keep(()));
                }
                Ok(FieldChange::Write {
                    raw: Some(serialize_links(
                        &SharedLinks::new(),
                        m.deliverable_link.as_deref(),
                    )),
                    output: (),
                })
            })
            .await?;

        info!(milestone_id = %id, "Shared links cleared");
        Ok(())
    }
}

fn invalid_links(issues: Vec<LinkIssue>) -> AppError {
    AppError::validation("One or more links are invalid").with_details(json!(issues))
}

fn limit_reached() -> AppError {
    AppError::policy(format!(
        "A milestone can hold at most {MAX_SHARED_LINKS} shared links"
    ))
}
