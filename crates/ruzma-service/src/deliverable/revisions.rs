//! Client revision requests against a milestone's quota.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use ruzma_core::error::AppError;
use ruzma_core::result::AppResult;
use ruzma_core::types::MilestoneId;
use ruzma_entity::deliverable::{RevisionData, RevisionRequest, stringify_revision_data};

use super::decode;
use super::writer::{DeliverableWriter, FieldChange};

/// Result of a successful revision request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionOutcome {
    /// The stored request.
    pub request: RevisionRequest,
    /// Requests left afterwards; `None` when unlimited.
    pub remaining_revisions: Option<u32>,
    /// Requests used so far, this one included.
    pub used_revisions: u32,
}

/// Records revision requests and their handling.
#[derive(Debug, Clone)]
pub struct RevisionService {
    writer: Arc<DeliverableWriter>,
}

impl RevisionService {
    /// Creates a new revision service.
    pub fn new(writer: Arc<DeliverableWriter>) -> Self {
        Self { writer }
    }

    /// Current ledger of a milestone.
    pub async fn ledger(&self, id: MilestoneId) -> AppResult<RevisionData> {
        let milestone = self.writer.load(id).await?;
        Ok(decode(&milestone).revision_data())
    }

    /// Submits a client revision request.
    ///
    /// Fails with a policy error once the quota is used up. The quota is
    /// checked against the value being replaced, so concurrent submissions
    /// cannot overrun it.
    pub async fn submit_request(
        &self,
        id: MilestoneId,
        feedback: &str,
        images: Vec<String>,
    ) -> AppResult<RevisionOutcome> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(AppError::validation("Feedback is required"));
        }
        let images: Vec<String> = images
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();

        let outcome = self
            .writer
            .update(id, |m| {
                let data = decode(m)
                    .revision_data()
                    .try_add_revision_request(feedback, images.clone())
                    .map_err(|e| AppError::policy(e.to_string()))?;
                let request = data
                    .latest_request()
                    .cloned()
                    .ok_or_else(|| AppError::internal("Revision request was not recorded"))?;

                Ok(FieldChange::Write {
                    raw: Some(stringify_revision_data(m.deliverable_link.as_deref(), &data)),
                    output: RevisionOutcome {
                        request,
                        remaining_revisions: data.remaining_revisions(),
                        used_revisions: data.used_revisions,
                    },
                })
            })
            .await?;

        info!(
            milestone_id = %id,
            request_id = %outcome.request.id,
            used = outcome.used_revisions,
            remaining = ?outcome.remaining_revisions,
            "Revision requested"
        );
        Ok(outcome)
    }

    /// Marks a request addressed. Unknown or already addressed ids change nothing.
    pub async fn mark_addressed(&self, id: MilestoneId, request_id: &str) -> AppResult<RevisionData> {
        let (data, changed) = self
            .writer
            .update(id, |m| {
                let data = decode(m).revision_data();
                if !data.find_request(request_id).is_some_and(|r| r.is_pending()) {
                    return Ok(FieldChange::Keep((data, false)));
                }
                let data = data.mark_revision_addressed(request_id);
                Ok(FieldChange::Write {
                    raw: Some(stringify_revision_data(m.deliverable_link.as_deref(), &data)),
                    output: (data, true),
                })
            })
            .await?;

        if changed {
            info!(milestone_id = %id, request_id, "Revision addressed");
        } else {
            debug!(milestone_id = %id, request_id, "Revision request unknown or already addressed");
        }
        Ok(data)
    }

    /// Replaces the quota; `None` makes revisions unlimited.
    pub async fn update_max_revisions(
        &self,
        id: MilestoneId,
        max_revisions: Option<u32>,
    ) -> AppResult<RevisionData> {
        let data = self
            .writer
            .update(id, |m| {
                let data = decode(m).revision_data();
                if data.max_revisions == max_revisions {
                    return Ok(FieldChange::Keep(data));
                }
                let data = data.update_max_revisions(max_revisions);
                Ok(FieldChange::Write {
                    raw: Some(stringify_revision_data(m.deliverable_link.as_deref(), &data)),
                    output: data,
                })
            })
            .await?;

        info!(milestone_id = %id, max_revisions = ?max_revisions, "Revision quota updated");
        Ok(data)
    }
}
