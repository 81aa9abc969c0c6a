//! Revision request ledger.
//!
//! Tracks client revision requests against a milestone and the optional
//! per-milestone quota. Decoding is lenient: stored requests written by older
//! clients (numeric ids, a `timestamp` field instead of `requestedAt`,
//! missing status) are normalized rather than rejected.

use std::fmt;

use chrono::{DateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

/// Status of a revision request. Moves one way: pending, then addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionStatus {
    /// Waiting for the freelancer.
    Pending,
    /// The freelancer has handled it.
    Addressed,
}

impl RevisionStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Addressed => "addressed",
        }
    }
}

impl fmt::Display for RevisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A client's request for changes to delivered work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredRevisionRequest")]
pub struct RevisionRequest {
    /// Identifier assigned at creation.
    pub id: String,
    /// What the client wants changed.
    pub feedback: String,
    /// URLs of images the client attached.
    pub images: Vec<String>,
    /// When the request was made.
    #[serde(serialize_with = "serialize_iso_millis")]
    pub requested_at: DateTime<Utc>,
    /// Current status.
    pub status: RevisionStatus,
}

impl RevisionRequest {
    /// Create a pending request stamped now.
    pub fn new(feedback: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            feedback: feedback.into(),
            images,
            requested_at: now_millis(),
            status: RevisionStatus::Pending,
        }
    }

    /// Whether the request still awaits the freelancer.
    pub fn is_pending(&self) -> bool {
        self.status == RevisionStatus::Pending
    }
}

/// Revision quota and request history for one milestone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredRevisionData")]
pub struct RevisionData {
    /// Quota; `None` means unlimited.
    pub max_revisions: Option<u32>,
    /// Requests accepted so far. Never decreases.
    pub used_revisions: u32,
    /// Requests in the order they were made.
    pub requests: Vec<RevisionRequest>,
}

/// Returned when a request is made after the quota is used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionLimitReached {
    /// The quota.
    pub max_revisions: u32,
    /// Requests already accepted.
    pub used_revisions: u32,
}

impl fmt::Display for RevisionLimitReached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Revision limit reached")
    }
}

impl std::error::Error for RevisionLimitReached {}

impl RevisionData {
    /// Ledger with the given quota and no history.
    pub fn with_limit(max_revisions: Option<u32>) -> Self {
        Self {
            max_revisions,
            ..Self::default()
        }
    }

    /// Whether another request fits in the quota.
    pub fn can_request_revision(&self) -> bool {
        match self.max_revisions {
            None => true,
            Some(max) => self.used_revisions < max,
        }
    }

    /// Requests left in the quota; `None` when unlimited.
    pub fn remaining_revisions(&self) -> Option<u32> {
        self.max_revisions
            .map(|max| max.saturating_sub(self.used_revisions))
    }

    /// Append a pending request and count it against the quota.
    ///
    /// The quota is not checked here; callers go through
    /// [`can_request_revision`](Self::can_request_revision) first or use
    /// [`try_add_revision_request`](Self::try_add_revision_request).
    pub fn add_revision_request(mut self, feedback: impl Into<String>, images: Vec<String>) -> Self {
        self.requests.push(RevisionRequest::new(feedback, images));
        self.used_revisions = self.used_revisions.saturating_add(1);
        self
    }

    /// Append a request only if the quota allows it.
    pub fn try_add_revision_request(
        self,
        feedback: impl Into<String>,
        images: Vec<String>,
    ) -> Result<Self, RevisionLimitReached> {
        if let Some(max) = self.max_revisions {
            if self.used_revisions >= max {
                return Err(RevisionLimitReached {
                    max_revisions: max,
                    used_revisions: self.used_revisions,
                });
            }
        }
        Ok(self.add_revision_request(feedback, images))
    }

    /// Mark the request with `request_id` as addressed. Unknown ids are ignored.
    pub fn mark_revision_addressed(mut self, request_id: &str) -> Self {
        if let Some(request) = self.requests.iter_mut().find(|r| r.id == request_id) {
            request.status = RevisionStatus::Addressed;
        }
        self
    }

    /// Replace the quota. Requests already made are kept even when the new
    /// quota is below `used_revisions`.
    pub fn update_max_revisions(mut self, max_revisions: Option<u32>) -> Self {
        self.max_revisions = max_revisions;
        self
    }

    /// Look up a request by id.
    pub fn find_request(&self, request_id: &str) -> Option<&RevisionRequest> {
        self.requests.iter().find(|r| r.id == request_id)
    }

    /// The most recent request.
    pub fn latest_request(&self) -> Option<&RevisionRequest> {
        self.requests.last()
    }

    /// Number of requests still pending.
    pub fn pending_count(&self) -> usize {
        self.requests.iter().filter(|r| r.is_pending()).count()
    }
}

/// Current time at the millisecond precision the wire format keeps.
pub(crate) fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn serialize_iso_millis<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Id prefix for stored requests that carry no id of their own.
const LEGACY_ID_PREFIX: &str = "legacy-";

/// Stored request as older and newer clients wrote it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredRevisionRequest {
    id: Value,
    feedback: Value,
    images: Value,
    requested_at: Value,
    timestamp: Value,
    status: Value,
}

impl From<StoredRevisionRequest> for RevisionRequest {
    fn from(stored: StoredRevisionRequest) -> Self {
        stored.into_request(0)
    }
}

impl StoredRevisionRequest {
    /// Convert a request found at `index` of the stored list. Requests stored
    /// without an id get `legacy-{index}` so every read yields the same id.
    fn into_request(self, index: usize) -> RevisionRequest {
        let id = match self.id {
            Value::String(id) => id,
            Value::Number(n) => n.to_string(),
            _ => format!("{LEGACY_ID_PREFIX}{index}"),
        };

        let images = match self.images {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(url) => Some(url),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let requested_at = parse_timestamp(&self.requested_at)
            .or_else(|| parse_timestamp(&self.timestamp))
            .unwrap_or_else(now_millis);

        let status = match self.status.as_str() {
            Some("addressed") => RevisionStatus::Addressed,
            _ => RevisionStatus::Pending,
        };

        RevisionRequest {
            id,
            feedback: self.feedback.as_str().unwrap_or_default().to_string(),
            images,
            requested_at,
            status,
        }
    }
}

/// Stored ledger; every field optional and loosely typed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredRevisionData {
    max_revisions: Value,
    used_revisions: Value,
    requests: Value,
}

impl From<StoredRevisionData> for RevisionData {
    fn from(stored: StoredRevisionData) -> Self {
        let requests = match stored.requests {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .filter(|(_, item)| item.is_object())
                .filter_map(|(index, item)| {
                    serde_json::from_value::<StoredRevisionRequest>(item)
                        .ok()
                        .map(|stored| stored.into_request(index))
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            max_revisions: value_as_count(&stored.max_revisions),
            used_revisions: value_as_count(&stored.used_revisions).unwrap_or(0),
            requests,
        }
    }
}

/// Read a non-negative count from a JSON number or numeric string.
fn value_as_count(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    Some(u32::try_from(n).unwrap_or(u32::MAX))
}

/// ISO-8601 string, or epoch milliseconds as older clients stored them.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}
