//! Deliverable field: shared links and revision ledger stored in one column.

pub mod field;
pub mod link;
pub mod revision;

pub use field::{
    DecodedField, FieldFormat, canonicalize, parse_links, parse_revision_data, serialize_links,
    stringify_revision_data,
};
pub use link::{
    DEFAULT_LINK_TITLE, LinkIssue, LinkIssueReason, MAX_SHARED_LINKS, SharedLink, SharedLinks,
    TooManyLinks, normalize_link, prepare_links, validate_link,
};
pub use revision::{RevisionData, RevisionLimitReached, RevisionRequest, RevisionStatus};
