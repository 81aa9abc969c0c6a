//! Encoding of the milestone `deliverable_link` column.
//!
//! The column holds a JSON document `{ "links": [...], "revisionData": {...} }`.
//! Older rows may instead hold a bare JSON array of links or a single plain
//! URL. Every write goes through [`serialize_links`] or
//! [`stringify_revision_data`], each of which replaces exactly one key and
//! keeps everything else in the stored document.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::link::{DEFAULT_LINK_TITLE, SharedLink, SharedLinks};
use super::revision::RevisionData;

const LINKS_KEY: &str = "links";
const REVISION_DATA_KEY: &str = "revisionData";

/// Stored shape of a deliverable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFormat {
    /// `NULL`, blank or JSON `null`.
    Empty,
    /// JSON object.
    Document,
    /// Bare JSON array of links.
    LegacyLinks,
    /// A plain string that is not JSON.
    LegacyPlainLink,
    /// Valid JSON that is neither an object nor an array.
    Corrupt,
}

impl FieldFormat {
    /// Return the format as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Document => "document",
            Self::LegacyLinks => "legacy_links",
            Self::LegacyPlainLink => "legacy_plain_link",
            Self::Corrupt => "corrupt",
        }
    }

    /// Whether the field predates the document format.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyLinks | Self::LegacyPlainLink)
    }
}

impl fmt::Display for FieldFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decoded deliverable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedField {
    /// Nothing stored yet.
    Empty,
    /// The current document format.
    Document {
        /// Shared links; may exceed the write cap in old data.
        links: Vec<SharedLink>,
        /// `None` when the document has no usable `revisionData` object.
        revision_data: Option<RevisionData>,
    },
    /// Bare array of links, no revision history.
    LegacyLinks(Vec<SharedLink>),
    /// Single plain URL, no revision history.
    LegacyPlainLink(SharedLink),
    /// Parseable but meaningless content, kept verbatim.
    Corrupt(String),
}

impl DecodedField {
    /// Decode a raw column value. Never fails.
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Empty;
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Null) => Self::Empty,
            Ok(Value::Array(items)) => Self::LegacyLinks(links_from_values(items)),
            Ok(Value::Object(mut doc)) => {
                let links = match doc.remove(LINKS_KEY) {
                    Some(Value::Array(items)) => links_from_values(items),
                    _ => Vec::new(),
                };
                let revision_data = match doc.remove(REVISION_DATA_KEY) {
                    Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
                    _ => None,
                };
                Self::Document {
                    links,
                    revision_data,
                }
            }
            Ok(_) => Self::Corrupt(raw.to_string()),
            Err(_) => Self::LegacyPlainLink(SharedLink::untitled(raw)),
        }
    }

    /// The stored shape.
    pub fn format(&self) -> FieldFormat {
        match self {
            Self::Empty => FieldFormat::Empty,
            Self::Document { .. } => FieldFormat::Document,
            Self::LegacyLinks(_) => FieldFormat::LegacyLinks,
            Self::LegacyPlainLink(_) => FieldFormat::LegacyPlainLink,
            Self::Corrupt(_) => FieldFormat::Corrupt,
        }
    }

    /// Borrow the shared links.
    pub fn links(&self) -> &[SharedLink] {
        match self {
            Self::Document { links, .. } | Self::LegacyLinks(links) => links,
            Self::LegacyPlainLink(link) => std::slice::from_ref(link),
            Self::Empty | Self::Corrupt(_) => &[],
        }
    }

    /// Take the shared links out.
    pub fn into_links(self) -> Vec<SharedLink> {
        match self {
            Self::Document { links, .. } | Self::LegacyLinks(links) => links,
            Self::LegacyPlainLink(link) => vec![link],
            Self::Empty | Self::Corrupt(_) => Vec::new(),
        }
    }

    /// The revision ledger, or the empty unlimited ledger when none is stored.
    pub fn revision_data(&self) -> RevisionData {
        match self {
            Self::Document {
                revision_data: Some(data),
                ..
            } => data.clone(),
            _ => RevisionData::default(),
        }
    }

    /// Whether the field holds something other than a usable value.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }
}

fn links_from_values(items: Vec<Value>) -> Vec<SharedLink> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(_) => serde_json::from_value(item).ok(),
            Value::String(url) => Some(SharedLink::untitled(url)),
            _ => None,
        })
        .collect()
}

/// Shared links stored in `raw`, tolerating every legacy shape.
pub fn parse_links(raw: Option<&str>) -> Vec<SharedLink> {
    DecodedField::decode(raw).into_links()
}

/// Revision ledger stored in `raw`; the empty unlimited ledger when absent,
/// unparseable or in a legacy links-only shape.
pub fn parse_revision_data(raw: Option<&str>) -> RevisionData {
    DecodedField::decode(raw).revision_data()
}

/// Recover the document object that new values are merged into.
fn recover_base(raw: Option<&str>) -> Map<String, Value> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Map::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(doc)) => doc,
        Ok(Value::Array(items)) => {
            let mut doc = Map::new();
            doc.insert(LINKS_KEY.to_string(), Value::Array(items));
            doc
        }
        Ok(_) => Map::new(),
        Err(_) => {
            let mut doc = Map::new();
            doc.insert(
                LINKS_KEY.to_string(),
                json!([{ "url": raw, "title": DEFAULT_LINK_TITLE }]),
            );
            doc
        }
    }
}

/// Replace the links in `existing_raw`, keeping `revisionData` and any other
/// stored key as they were.
pub fn serialize_links(links: &SharedLinks, existing_raw: Option<&str>) -> String {
    let mut doc = recover_base(existing_raw);
    doc.insert(LINKS_KEY.to_string(), json!(links));
    Value::Object(doc).to_string()
}

/// Replace the revision ledger in `original_raw`, keeping the links (in
/// whichever shape they were stored) and any other stored key.
pub fn stringify_revision_data(original_raw: Option<&str>, data: &RevisionData) -> String {
    let mut doc = recover_base(original_raw);
    doc.insert(REVISION_DATA_KEY.to_string(), json!(data));
    Value::Object(doc).to_string()
}

/// Rewrite a legacy field into the document format without changing what it
/// decodes to. Returns `None` for fields that need no rewrite.
pub fn canonicalize(raw: Option<&str>) -> Option<String> {
    if !DecodedField::decode(raw).format().is_legacy() {
        return None;
    }
    Some(Value::Object(recover_base(raw)).to_string())
}
