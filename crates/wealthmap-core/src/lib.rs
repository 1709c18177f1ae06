//! WealthMap Core - property directory domain and query engine
//!
//! This crate provides the core functionality for the wealthmap property
//! directory backend:
//!
//! - **Property**: Geotagged listings with owner financial/demographic
//!   metadata and read-time derived fields (formatted address, income tier)
//! - **Bookmark**: Per-user property bookmarks with a store-enforced
//!   uniqueness invariant on the (user, property) pair
//! - **Query**: The filter compiler - loosely-typed request parameters
//!   compiled into a structured predicate plus a sort/pagination spec
//! - **Geo**: Haversine distance math, exposed to SQLite as a scalar
//!   function for radius filtering and nearest-first ordering
//! - **Persistence**: SQLite-based record store; query executor and bookmark
//!   guard live on the `Repository`
//!
//! # Architecture
//!
//! All mutation flows through an explicit `Repository` handle (opened at
//! process start, injected into each component). Filter compilation and
//! derived-field computation are pure; the unique index on bookmarks - not
//! in-process locking - is the concurrency-correctness mechanism.

pub mod bookmark;
pub mod error;
pub mod geo;
pub mod persistence;
pub mod property;
pub mod query;

pub use bookmark::{Bookmark, BookmarkId, ExpandedBookmark};
pub use error::{Result, StoreError};
pub use persistence::{PropertyPage, Repository, Schema};
pub use property::{
    Address, GeoPoint, IncomeTier, OwnerDetails, Property, PropertyId, Sex,
    OWNER_IMAGE_PLACEHOLDER, PROPERTY_IMAGE_PLACEHOLDER,
};
pub use query::{compile, ListParams, NearFilter, PageSpec, PropertyFilter};
