//! Bookmark entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::property::{Property, PropertyId};

/// Unique identifier for a bookmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookmarkId(pub Uuid);

impl BookmarkId {
    /// Create a new random bookmark ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a bookmark ID from a string
    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| StoreError::Validation(format!("Invalid bookmark ID format: {s}")))
    }
}

impl Default for BookmarkId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user's bookmark of a property
///
/// `user_email` is the tenant-scoping key; `property` is a non-owning
/// reference. The `(user_email, property)` pair is unique, enforced by a
/// unique index in the store rather than application-level checks alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub user_email: String,
    pub property: PropertyId,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    /// Create a new bookmark with a fresh id and timestamp
    pub fn new(user_email: String, property: PropertyId) -> Self {
        Self {
            id: BookmarkId::new(),
            user_email,
            property,
            created_at: Utc::now(),
        }
    }
}

/// A bookmark expanded with the current snapshot of its property
///
/// Returned by the bookmark guard for caller convenience; the property data
/// is read at expansion time, never denormalized into the bookmark row.
#[derive(Debug, Clone)]
pub struct ExpandedBookmark {
    pub bookmark: Bookmark,
    pub property: Property,
}
