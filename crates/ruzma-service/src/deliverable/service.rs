//! Read-side view of the deliverable field and legacy-format maintenance.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use ruzma_core::error::ErrorKind;
use ruzma_core::result::AppResult;
use ruzma_core::types::MilestoneId;
use ruzma_database::MilestoneStore;
use ruzma_entity::deliverable::{FieldFormat, RevisionData, SharedLink, canonicalize};

use super::decode;
use super::writer::{DeliverableWriter, FieldChange};

/// Decoded deliverable field of one milestone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverableView {
    /// The milestone.
    pub milestone_id: MilestoneId,
    /// Shape the field is stored in.
    pub format: FieldFormat,
    /// Shared links.
    pub links: Vec<SharedLink>,
    /// Revision ledger.
    pub revision_data: RevisionData,
    /// Requests left; `None` when unlimited.
    pub remaining_revisions: Option<u32>,
    /// Whether the client may submit another request.
    pub can_request_revision: bool,
}

/// One legacy field found by [`DeliverableService::normalize`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeEntry {
    /// The milestone.
    pub milestone_id: MilestoneId,
    /// Format before the rewrite.
    pub format: FieldFormat,
    /// Whether the rewrite was stored.
    pub rewritten: bool,
}

/// Summary of a normalization pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReport {
    /// Fields inspected.
    pub scanned: usize,
    /// Fields that could not be decoded and were left alone.
    pub corrupt: usize,
    /// Fields skipped because another writer kept winning.
    pub conflicts: usize,
    /// Legacy fields found.
    pub entries: Vec<NormalizeEntry>,
}

impl NormalizeReport {
    /// Number of fields actually rewritten.
    pub fn rewritten(&self) -> usize {
        self.entries.iter().filter(|e| e.rewritten).count()
    }
}

/// Reads deliverable fields and rewrites legacy ones.
#[derive(Debug, Clone)]
pub struct DeliverableService {
    store: Arc<dyn MilestoneStore>,
    writer: Arc<DeliverableWriter>,
}

impl DeliverableService {
    /// Creates a new deliverable service.
    pub fn new(store: Arc<dyn MilestoneStore>, writer: Arc<DeliverableWriter>) -> Self {
        Self { store, writer }
    }

    /// Decoded view of a milestone's field.
    pub async fn view(&self, id: MilestoneId) -> AppResult<DeliverableView> {
        let milestone = self.writer.load(id).await?;
        let decoded = decode(&milestone);
        let revision_data = decoded.revision_data();

        Ok(DeliverableView {
            milestone_id: milestone.id,
            format: decoded.format(),
            remaining_revisions: revision_data.remaining_revisions(),
            can_request_revision: revision_data.can_request_revision(),
            links: decoded.into_links(),
            revision_data,
        })
    }

    /// Rewrite bare-array and plain-string fields into the document format.
    ///
    /// Document, empty and corrupt fields are never touched. With `dry_run`
    /// the legacy fields are reported but not written.
    pub async fn normalize(&self, dry_run: bool) -> AppResult<NormalizeReport> {
        let milestones = self.store.find_with_deliverable().await?;
        let mut report = NormalizeReport {
            scanned: milestones.len(),
            ..NormalizeReport::default()
        };

        for milestone in milestones {
            let decoded = decode(&milestone);
            if decoded.is_corrupt() {
                report.corrupt += 1;
                continue;
            }
            let format = decoded.format();
            if !format.is_legacy() {
                continue;
            }
            if dry_run {
                report.entries.push(NormalizeEntry {
                    milestone_id: milestone.id,
                    format,
                    rewritten: false,
                });
                continue;
            }

            let result = self
                .writer
                .update(milestone.id, |m| {
                    Ok(match canonicalize(m.deliverable_link.as_deref()) {
                        Some(raw) => FieldChange::Write {
                            raw: Some(raw),
                            output: true,
                        },
                        None => FieldChange::Keep(false),
                    })
                })
                .await;

            match result {
                Ok(rewritten) => report.entries.push(NormalizeEntry {
                    milestone_id: milestone.id,
                    format,
                    rewritten,
                }),
                Err(e) if matches!(e.kind, ErrorKind::Conflict | ErrorKind::NotFound) => {
                    report.conflicts += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            scanned = report.scanned,
            legacy = report.entries.len(),
            rewritten = report.rewritten(),
            corrupt = report.corrupt,
            dry_run,
            "Deliverable field normalization finished"
        );
        Ok(report)
    }
}
