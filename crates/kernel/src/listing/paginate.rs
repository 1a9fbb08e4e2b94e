//! Fetch-one-extra page protocol.
//!
//! A page fetch is planned as `filter AND seek`, ordered by `(sort_col, id)`
//! in the same direction, with `LIMIT page_size + 1`. The extra row only
//! signals that another page exists; it is trimmed before the next cursor is
//! taken from the last retained row.

use super::cursor::{Cursor, encode_cursor};
use super::predicate::{Column, Predicate, Record};
use super::seek::seek_predicate;
use super::types::{Page, SortDirection, SortField, SortSpec};

/// One ORDER BY term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Column,
    pub direction: SortDirection,
}

/// Everything the store needs to run one page query.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub filter: Predicate,
    pub order: Vec<OrderBy>,
    pub limit: u64,
}

/// Plan a page query.
///
/// A cursor minted for a different scope is ignored and the listing starts
/// over, rather than seeking with a value from another sort order.
pub fn plan_page<K: SortField>(
    base: Predicate,
    sort: SortSpec<K>,
    cursor: Option<&Cursor>,
    page_size: u32,
    scope: &str,
) -> PagePlan {
    let cursor = cursor.filter(|c| {
        let fits = c.fits_scope(scope);
        if !fits {
            tracing::debug!(scope, "discarding cursor minted for another query");
        }
        fits
    });

    PagePlan {
        filter: base.and(seek_predicate(sort, cursor)),
        order: vec![
            OrderBy {
                column: sort.key.column(),
                direction: sort.direction,
            },
            OrderBy {
                column: K::id_column(),
                direction: sort.direction,
            },
        ],
        limit: u64::from(page_size) + 1,
    }
}

/// Trim the over-fetched rows into a page and mint the next cursor.
pub fn assemble_page<K: SortField>(
    mut rows: Vec<K::Row>,
    sort: SortSpec<K>,
    page_size: u32,
    scope: &str,
) -> Page<K::Row> {
    let page_size = page_size as usize;
    if rows.len() <= page_size {
        return Page {
            items: rows,
            next_cursor: None,
        };
    }

    rows.truncate(page_size);
    let next_cursor = rows.last().map(|last| {
        encode_cursor(
            &Cursor::new(sort.key.cursor_value(last), last.id().to_string()).scoped(scope),
        )
    });

    Page {
        items: rows,
        next_cursor,
    }
}
