//! # ruzma-service
//!
//! Business logic for Ruzma. Services take their store through constructor
//! injection as an `Arc<dyn MilestoneStore>` and return [`AppResult`]s that
//! the API layer maps onto HTTP responses.
//!
//! Every change to a milestone's deliverable field goes through
//! [`DeliverableWriter`], which retries a compare-and-swap until it wins or
//! gives up with a conflict.
//!
//! [`AppResult`]: ruzma_core::AppResult

pub mod deliverable;
pub mod milestone;

pub use deliverable::{
    DeliverableService, DeliverableView, DeliverableWriter, FieldChange, LinkService,
    NormalizeEntry, NormalizeReport, RevisionOutcome, RevisionService,
};
pub use milestone::MilestoneService;
