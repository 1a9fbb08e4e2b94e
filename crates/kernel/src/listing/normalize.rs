//! Request normalization for listings.
//!
//! Raw query parameters go in; a fully-populated [`QuerySpec`] or
//! [`ReviewQuery`] comes out. In lenient mode every bad field falls back to
//! its own default (per-field, not all-or-nothing). Strict mode reports the
//! same problems as field-level errors instead. Cursors are never an error:
//! a broken one means "first page" in both modes.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use uuid::Uuid;

use super::cursor::decode_cursor;
use super::types::{
    FilterCriteria, PriceRange, ProductSort, QuerySpec, ReviewQuery, SortDirection, SortSpec,
};
use crate::validation::{ValidationError, Validator};

/// Catalogue page size bounds and default.
pub const DEFAULT_PAGE_SIZE: u32 = 24;
pub const MIN_PAGE_SIZE: u32 = 12;
pub const MAX_PAGE_SIZE: u32 = 96;

/// Review page size bounds and default.
pub const DEFAULT_REVIEW_PAGE_SIZE: u32 = 10;
pub const MIN_REVIEW_PAGE_SIZE: u32 = 1;
pub const MAX_REVIEW_PAGE_SIZE: u32 = 50;

const CATEGORY_PARAM: &str = "category";
const MIN_PRICE_PARAM: &str = "min";
const MAX_PRICE_PARAM: &str = "max";
const SORT_PARAM: &str = "sort";
const DIR_PARAM: &str = "dir";
const PAGE_SIZE_PARAM: &str = "pageSize";
const CURSOR_PARAM: &str = "cursor";
const PRODUCT_ID_PARAM: &str = "productId";

/// How invalid listing input is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Repair silently with defaults.
    #[default]
    Lenient,
    /// Reject with field-level errors.
    Strict,
}

impl FromStr for ValidationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(ValidationMode::Lenient),
            "strict" => Ok(ValidationMode::Strict),
            other => anyhow::bail!("invalid validation mode '{other}': must be 'lenient' or 'strict'"),
        }
    }
}

/// The single boundary where raw listing input becomes typed queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterNormalizer {
    mode: ValidationMode,
}

impl FilterNormalizer {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    /// Normalize catalogue listing parameters.
    ///
    /// Never fails in lenient mode.
    pub fn listing(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<QuerySpec, Vec<ValidationError>> {
        let mut v = Validator::new();

        let categories = parse_categories(param(params, CATEGORY_PARAM));
        let min = self.price_bound(&mut v, MIN_PRICE_PARAM, param(params, MIN_PRICE_PARAM));
        let max = self.price_bound(&mut v, MAX_PRICE_PARAM, param(params, MAX_PRICE_PARAM));
        let price = self.price_range(&mut v, min, max);

        let key = self.choice(
            &mut v,
            SORT_PARAM,
            param(params, SORT_PARAM),
            ProductSort::parse,
            ProductSort::default(),
            "must be one of price, rating, name",
        );
        let direction = self.choice(
            &mut v,
            DIR_PARAM,
            param(params, DIR_PARAM),
            SortDirection::parse,
            SortDirection::default(),
            "must be asc or desc",
        );
        let page_size = self.page_size(
            &mut v,
            param(params, PAGE_SIZE_PARAM),
            DEFAULT_PAGE_SIZE,
            MIN_PAGE_SIZE,
            MAX_PAGE_SIZE,
        );

        v.finish(QuerySpec {
            filter: FilterCriteria { categories, price },
            sort: SortSpec::new(key, direction),
            page_size,
            cursor: decode_cursor(param(params, CURSOR_PARAM)),
        })
    }

    /// Normalize review listing parameters.
    ///
    /// A missing or malformed product id is rejected in both modes.
    pub fn reviews(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<ReviewQuery, Vec<ValidationError>> {
        let mut v = Validator::new();

        let product_id = match param(params, PRODUCT_ID_PARAM) {
            None => {
                v.field(PRODUCT_ID_PARAM, "productId is required");
                None
            }
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    v.field(PRODUCT_ID_PARAM, "productId must be a valid id");
                    None
                }
            },
        };

        let page_size = self.page_size(
            &mut v,
            param(params, PAGE_SIZE_PARAM),
            DEFAULT_REVIEW_PAGE_SIZE,
            MIN_REVIEW_PAGE_SIZE,
            MAX_REVIEW_PAGE_SIZE,
        );
        let cursor = decode_cursor(param(params, CURSOR_PARAM));

        match product_id {
            Some(product_id) => v.finish(ReviewQuery {
                product_id,
                page_size,
                cursor,
            }),
            None => Err(v.into_errors()),
        }
    }

    fn strict(&self) -> bool {
        self.mode == ValidationMode::Strict
    }

    fn page_size(
        &self,
        v: &mut Validator,
        raw: Option<&str>,
        default: u32,
        min: u32,
        max: u32,
    ) -> u32 {
        let Some(raw) = raw else {
            return default;
        };

        let Some(n) = raw.parse::<f64>().ok().filter(|n| n.is_finite()) else {
            if self.strict() {
                v.field(PAGE_SIZE_PARAM, "pageSize must be a number");
            }
            return default;
        };

        if self.strict() {
            if n.fract() != 0.0 {
                v.field(PAGE_SIZE_PARAM, "pageSize must be an integer");
            } else if n < f64::from(min) || n > f64::from(max) {
                v.field(
                    PAGE_SIZE_PARAM,
                    format!("pageSize must be between {min} and {max}"),
                );
            }
        }

        n.trunc().clamp(f64::from(min), f64::from(max)) as u32
    }

    fn price_bound(&self, v: &mut Validator, name: &str, raw: Option<&str>) -> Option<f64> {
        let raw = raw?;
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => Some(n),
            _ => {
                if self.strict() {
                    v.field(name, format!("{name} must be a non-negative number"));
                }
                None
            }
        }
    }

    fn price_range(
        &self,
        v: &mut Validator,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Option<PriceRange> {
        let range = match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => {
                if self.strict() {
                    v.field(
                        MAX_PRICE_PARAM,
                        "Minimum price must be less than or equal to maximum price",
                    );
                }
                PriceRange {
                    min: Some(hi),
                    max: Some(lo),
                }
            }
            _ => PriceRange { min, max },
        };
        (!range.is_open()).then_some(range)
    }

    fn choice<T>(
        &self,
        v: &mut Validator,
        name: &str,
        raw: Option<&str>,
        parse: impl Fn(&str) -> Option<T>,
        default: T,
        message: &str,
    ) -> T {
        let Some(raw) = raw else {
            return default;
        };
        match parse(raw) {
            Some(value) => value,
            None => {
                if self.strict() {
                    v.field(name, format!("{name} {message}"));
                }
                default
            }
        }
    }
}

/// Non-empty, trimmed parameter value.
fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

fn parse_categories(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
