//! Listing engine types.
//!
//! Provides type definitions for keyset pagination:
//! - SortSpec / SortField: one enumerated sort key plus direction
//! - FilterCriteria: category and price constraints for the catalogue
//! - QuerySpec / ReviewQuery: fully normalized listing requests
//! - Page: a trimmed page of rows plus the continuation token

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cursor::{Cursor, CursorValue};
use super::predicate::{Column, CompareOp, Predicate, Record, SqlValue};
use crate::models::{Product, Review};

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse `asc` / `desc`, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Comparison that moves strictly past a row in this direction.
    pub fn seek_op(self) -> CompareOp {
        match self {
            SortDirection::Asc => CompareOp::Gt,
            SortDirection::Desc => CompareOp::Lt,
        }
    }
}

/// A column that can drive keyset pagination for one row type.
///
/// Each variant owns its column mapping, the coercion applied to a
/// client-supplied cursor value, and the extraction of the cursor value from
/// a row. The tiebreaker is always the row's unique id.
pub trait SortField: Copy + fmt::Debug + Send + Sync + 'static {
    type Row: Record;

    /// Column ordered by this key.
    fn column(self) -> Column;

    /// Unique tiebreaker column of the row type.
    fn id_column() -> Column;

    /// Coerce a decoded cursor value to the column's native type.
    ///
    /// `None` means the value cannot be compared against this column.
    fn coerce(self, raw: &CursorValue) -> Option<SqlValue>;

    /// Sort value of `row`, in cursor wire form.
    fn cursor_value(self, row: &Self::Row) -> CursorValue;

    /// Stable name used in query parameters and scope fingerprints.
    fn as_str(self) -> &'static str;
}

/// Sort keys exposed on the catalogue listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProductSort {
    Price,
    #[default]
    Rating,
    Name,
}

impl ProductSort {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "price" => Some(ProductSort::Price),
            "rating" => Some(ProductSort::Rating),
            "name" => Some(ProductSort::Name),
            _ => None,
        }
    }
}

impl SortField for ProductSort {
    type Row = Product;

    fn column(self) -> Column {
        match self {
            ProductSort::Price => Column::ProductPrice,
            ProductSort::Rating => Column::ProductAverageRating,
            ProductSort::Name => Column::ProductName,
        }
    }

    fn id_column() -> Column {
        Column::ProductId
    }

    fn coerce(self, raw: &CursorValue) -> Option<SqlValue> {
        match self {
            ProductSort::Price | ProductSort::Rating => raw.as_f64().map(SqlValue::Float),
            ProductSort::Name => Some(SqlValue::Text(raw.to_text())),
        }
    }

    fn cursor_value(self, row: &Product) -> CursorValue {
        match self {
            ProductSort::Price => CursorValue::Number(row.price),
            ProductSort::Rating => CursorValue::Number(row.average_rating),
            ProductSort::Name => CursorValue::Text(row.name.clone()),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ProductSort::Price => "price",
            ProductSort::Rating => "rating",
            ProductSort::Name => "name",
        }
    }
}

/// The review listing has a single, fixed sort key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSort {
    #[default]
    CreatedAt,
}

impl SortField for ReviewSort {
    type Row = Review;

    fn column(self) -> Column {
        Column::ReviewCreatedAt
    }

    fn id_column() -> Column {
        Column::ReviewId
    }

    fn coerce(self, raw: &CursorValue) -> Option<SqlValue> {
        match raw {
            CursorValue::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|t| SqlValue::Timestamp(t.with_timezone(&Utc))),
            CursorValue::Number(_) => None,
        }
    }

    fn cursor_value(self, row: &Review) -> CursorValue {
        CursorValue::Text(row.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    fn as_str(self) -> &'static str {
        "created_at"
    }
}

/// Sort specification: one key, one direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub struct SortSpec<K> {
    pub key: K,
    #[serde(default)]
    pub direction: SortDirection,
}

impl<K> SortSpec<K> {
    pub fn new(key: K, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

/// Inclusive price bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Catalogue filter constraints.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FilterCriteria {
    /// Categories matched with OR. Empty means no category filter.
    #[serde(default)]
    pub categories: BTreeSet<String>,

    /// Price bounds, if any.
    pub price: Option<PriceRange>,
}

impl FilterCriteria {
    /// Storage-layer expression for these constraints.
    pub fn to_predicate(&self) -> Predicate {
        let mut parts = Vec::new();

        if !self.categories.is_empty() {
            parts.push(Predicate::In {
                column: Column::ProductCategory,
                values: self
                    .categories
                    .iter()
                    .map(|c| SqlValue::Text(c.clone()))
                    .collect(),
            });
        }

        if let Some(range) = self.price {
            if let Some(min) = range.min {
                parts.push(Predicate::compare(
                    Column::ProductPrice,
                    CompareOp::Gte,
                    SqlValue::Float(min),
                ));
            }
            if let Some(max) = range.max {
                parts.push(Predicate::compare(
                    Column::ProductPrice,
                    CompareOp::Lte,
                    SqlValue::Float(max),
                ));
            }
        }

        Predicate::all(parts)
    }

    /// Canonical rendering used to fingerprint cursor scope.
    pub fn canonical(&self) -> String {
        let categories: Vec<&str> = self.categories.iter().map(String::as_str).collect();
        let (min, max) = self
            .price
            .map(|p| (p.min, p.max))
            .unwrap_or((None, None));
        format!(
            "categories={};min={};max={}",
            categories.join(","),
            min.map(|v| v.to_string()).unwrap_or_default(),
            max.map(|v| v.to_string()).unwrap_or_default(),
        )
    }
}

/// A normalized catalogue listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub filter: FilterCriteria,
    pub sort: SortSpec<ProductSort>,
    pub page_size: u32,
    pub cursor: Option<Cursor>,
}

impl QuerySpec {
    /// Scope fingerprint binding cursors to this `(filter, sort)` pair.
    pub fn scope(&self) -> String {
        super::cursor::scope_fingerprint(&format!(
            "product;{};sort={}:{}",
            self.filter.canonical(),
            self.sort.key.as_str(),
            self.sort.direction.as_str()
        ))
    }
}

/// A normalized review listing request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewQuery {
    pub product_id: Uuid,
    pub page_size: u32,
    pub cursor: Option<Cursor>,
}

impl ReviewQuery {
    /// Reviews are always newest first.
    pub const SORT: SortSpec<ReviewSort> = SortSpec {
        key: ReviewSort::CreatedAt,
        direction: SortDirection::Desc,
    };

    pub fn base_filter(&self) -> Predicate {
        Predicate::compare(
            Column::ReviewProductId,
            CompareOp::Eq,
            SqlValue::Uuid(self.product_id),
        )
    }

    pub fn scope(&self) -> String {
        super::cursor::scope_fingerprint(&format!(
            "review;product={};sort={}:{}",
            self.product_id,
            Self::SORT.key.as_str(),
            Self::SORT.direction.as_str()
        ))
    }
}

/// One page of a keyset listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Convert each item, keeping the continuation token.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}
