//! Shared deliverable links.
//!
//! A milestone can carry up to [`MAX_SHARED_LINKS`] links to delivered work.
//! Stored data is read permissively (any number of links, any shape that
//! deserializes), while the write path only accepts a [`SharedLinks`] value,
//! which cannot hold more than the cap.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum number of shared links a milestone may hold.
pub const MAX_SHARED_LINKS: usize = 3;

/// Title given to links that were stored without one.
pub const DEFAULT_LINK_TITLE: &str = "Shared Link";

/// Permissive URL shape: optional scheme (or `//`), credentials only after
/// one of those, a dotted host, `localhost` or an IPv4 address, optional
/// port, optional path. `mailto:x@y.com` is therefore not a link.
static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:[a-z][a-z0-9+.-]*://|//)(?:[^\s/@:]+(?::[^\s/@]*)?@)?)?(?:localhost|(?:[\p{L}\p{N}](?:[\p{L}\p{N}-]*[\p{L}\p{N}])?\.)+\p{L}{2,}|\d{1,3}(?:\.\d{1,3}){3})(?::\d{1,5})?(?:[/?#]\S*)?$",
    )
    .expect("URL shape pattern is valid")
});

static HAS_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").expect("scheme pattern is valid"));

/// A link to delivered work, shown to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SharedLink {
    /// Target URL.
    #[serde(default)]
    pub url: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
}

impl SharedLink {
    /// Create a link.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }

    /// Create a link titled [`DEFAULT_LINK_TITLE`].
    pub fn untitled(url: impl Into<String>) -> Self {
        Self::new(url, DEFAULT_LINK_TITLE)
    }
}

/// Check that `url` looks like a web address. Empty input is rejected;
/// a missing scheme is accepted.
pub fn validate_link(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && URL_SHAPE.is_match(url)
}

/// Prefix `https://` when `url` carries no scheme.
pub fn normalize_link(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || HAS_SCHEME.is_match(url) {
        url.to_string()
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!("https://{url}")
    }
}

/// Returned when a link list would exceed [`MAX_SHARED_LINKS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooManyLinks {
    /// Number of links the caller tried to hold.
    pub attempted: usize,
}

impl fmt::Display for TooManyLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a milestone can hold at most {MAX_SHARED_LINKS} links ({} given)",
            self.attempted
        )
    }
}

impl std::error::Error for TooManyLinks {}

/// An ordered list of at most [`MAX_SHARED_LINKS`] links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SharedLinks(Vec<SharedLink>);

impl SharedLinks {
    /// Create an empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a link, refusing once the list is full.
    pub fn try_push(&mut self, link: SharedLink) -> Result<(), TooManyLinks> {
        if self.is_full() {
            return Err(TooManyLinks {
                attempted: self.0.len() + 1,
            });
        }
        self.0.push(link);
        Ok(())
    }

    /// Whether another link would exceed the cap.
    pub fn is_full(&self) -> bool {
        self.0.len() >= MAX_SHARED_LINKS
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the links.
    pub fn as_slice(&self) -> &[SharedLink] {
        &self.0
    }

    /// Iterate over the links.
    pub fn iter(&self) -> std::slice::Iter<'_, SharedLink> {
        self.0.iter()
    }

    /// Take the links out.
    pub fn into_vec(self) -> Vec<SharedLink> {
        self.0
    }
}

impl TryFrom<Vec<SharedLink>> for SharedLinks {
    type Error = TooManyLinks;

    fn try_from(links: Vec<SharedLink>) -> Result<Self, Self::Error> {
        if links.len() > MAX_SHARED_LINKS {
            return Err(TooManyLinks {
                attempted: links.len(),
            });
        }
        Ok(Self(links))
    }
}

impl<'a> IntoIterator for &'a SharedLinks {
    type Item = &'a SharedLink;
    type IntoIter = std::slice::Iter<'a, SharedLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Why a submitted link was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkIssueReason {
    /// The URL does not look like a web address.
    InvalidUrl,
    /// The link would push the list past [`MAX_SHARED_LINKS`].
    LimitExceeded,
}

/// A single refused link in a save request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkIssue {
    /// Position of the link in the submitted list.
    pub index: usize,
    /// The URL as submitted.
    pub url: String,
    /// Why it was refused.
    pub reason: LinkIssueReason,
}

/// Validate and normalize links submitted from the link editor.
///
/// Rows with an empty URL are dropped. Every other row must validate; its URL
/// is normalized and an empty title becomes [`DEFAULT_LINK_TITLE`]. All
/// offending rows are reported together so the editor can flag each one.
pub fn prepare_links(drafts: Vec<SharedLink>) -> Result<SharedLinks, Vec<LinkIssue>> {
    let mut issues = Vec::new();
    let mut accepted = SharedLinks::new();

    for (index, draft) in drafts.into_iter().enumerate() {
        let url = draft.url.trim();
        if url.is_empty() {
            continue;
        }
        if !validate_link(url) {
            issues.push(LinkIssue {
                index,
                url: draft.url.clone(),
                reason: LinkIssueReason::InvalidUrl,
            });
            continue;
        }

        let title = draft.title.trim();
        let link = SharedLink::new(
            normalize_link(url),
            if title.is_empty() { DEFAULT_LINK_TITLE } else { title },
        );
        if accepted.try_push(link).is_err() {
            issues.push(LinkIssue {
                index,
                url: draft.url.clone(),
                reason: LinkIssueReason::LimitExceeded,
            });
        }
    }

    if issues.is_empty() {
        Ok(accepted)
    } else {
        Err(issues)
    }
}
