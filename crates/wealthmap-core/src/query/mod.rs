//! Query types - filter compilation and pagination

mod filter;

pub use filter::{
    compile, ListParams, NearFilter, PageSpec, PropertyFilter, SortDirection, SortField,
    DEFAULT_PAGE_SIZE,
};
