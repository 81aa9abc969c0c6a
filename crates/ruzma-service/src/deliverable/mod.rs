//! Deliverable field use cases: shared links, revision requests, and the
//! compare-and-swap writer they share.

pub mod links;
pub mod revisions;
pub mod service;
pub mod writer;

pub use links::LinkService;
pub use revisions::{RevisionOutcome, RevisionService};
pub use service::{DeliverableService, DeliverableView, NormalizeEntry, NormalizeReport};
pub use writer::{DeliverableWriter, FieldChange};

use tracing::warn;

use ruzma_entity::deliverable::DecodedField;
use ruzma_entity::milestone::Milestone;

/// Decode a milestone's field, logging unreadable content.
pub(crate) fn decode(milestone: &Milestone) -> DecodedField {
    let decoded = milestone.deliverable();
    if let DecodedField::Corrupt(raw) = &decoded {
        warn!(
            milestone_id = %milestone.id,
            raw_len = raw.len(),
            "Unreadable deliverable field, falling back to defaults"
        );
    }
    decoded
}
