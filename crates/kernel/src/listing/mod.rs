//! Keyset listing engine.
//!
//! This module provides:
//! - FilterNormalizer: raw query parameters to typed queries
//! - Cursor codec: opaque, URL-safe continuation tokens
//! - Predicate: storage-neutral filter expressions
//! - Seek predicates and the fetch-one-extra page protocol

pub mod cursor;
pub mod normalize;
pub mod paginate;
pub mod predicate;
pub mod seek;
pub mod types;

pub use cursor::{Cursor, CursorValue, decode_cursor, encode_cursor};
pub use normalize::{FilterNormalizer, ValidationMode};
pub use paginate::{OrderBy, PagePlan, assemble_page, plan_page};
pub use predicate::{Column, CompareOp, Predicate, Record, SqlValue};
pub use seek::seek_predicate;
pub use types::{
    FilterCriteria, Page, PriceRange, ProductSort, QuerySpec, ReviewQuery, ReviewSort,
    SortDirection, SortField, SortSpec,
};
