//! Seek predicate construction.
//!
//! Given a sort and the last row of the previous page, produce the filter
//! that selects rows strictly after it:
//!
//! ```text
//! (sort_col CMP v) OR (sort_col = v AND id CMP last_id)
//! ```
//!
//! where `CMP` is `>` for ascending and `<` for descending. The id branch
//! breaks ties between rows that share a sort value, so the order is total.

use uuid::Uuid;

use super::cursor::Cursor;
use super::predicate::{CompareOp, Predicate, SqlValue};
use super::types::{SortField, SortSpec};

/// Build the seek predicate for `sort` resuming after `cursor`.
///
/// Returns [`Predicate::True`] when there is no cursor or when its value or
/// id cannot be coerced to the column types; the listing then starts from
/// the first page.
pub fn seek_predicate<K: SortField>(sort: SortSpec<K>, cursor: Option<&Cursor>) -> Predicate {
    let Some(cursor) = cursor else {
        return Predicate::True;
    };

    let Some(value) = sort.key.coerce(&cursor.value) else {
        tracing::debug!(
            sort = sort.key.as_str(),
            "discarding cursor: sort value does not fit column"
        );
        return Predicate::True;
    };

    let Ok(last_id) = Uuid::parse_str(cursor.id.trim()) else {
        tracing::debug!(id = %cursor.id, "discarding cursor: id is not a uuid");
        return Predicate::True;
    };

    let op = sort.direction.seek_op();
    let column = sort.key.column();

    Predicate::Or(vec![
        Predicate::compare(column, op, value.clone()),
        Predicate::And(vec![
            Predicate::compare(column, CompareOp::Eq, value),
            Predicate::compare(K::id_column(), op, SqlValue::Uuid(last_id)),
        ]),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::listing::cursor::CursorValue;
    use crate::listing::predicate::Column;
    use crate::listing::types::{ProductSort, ReviewSort, SortDirection};

    const ID: &str = "0195f3c4-0000-7000-8000-000000000010";

    fn cursor(value: CursorValue) -> Cursor {
        Cursor::new(value, ID)
    }

    #[test]
    fn no_cursor_is_identity() {
        let sort = SortSpec::new(ProductSort::Price, SortDirection::Asc);
        assert_eq!(seek_predicate(sort, None), Predicate::True);
    }

    #[test]
    fn ascending_uses_greater_than() {
        let sort = SortSpec::new(ProductSort::Price, SortDirection::Asc);
        let c = cursor(CursorValue::Number(9.5));
        let id = Uuid::parse_str(ID).unwrap();

        let expected = Predicate::Or(vec![
            Predicate::compare(Column::ProductPrice, CompareOp::Gt, SqlValue::Float(9.5)),
            Predicate::And(vec![
                Predicate::compare(Column::ProductPrice, CompareOp::Eq, SqlValue::Float(9.5)),
                Predicate::compare(Column::ProductId, CompareOp::Gt, SqlValue::Uuid(id)),
            ]),
        ]);
        assert_eq!(seek_predicate(sort, Some(&c)), expected);
    }

    #[test]
    fn descending_uses_less_than_on_both_branches() {
        let sort = SortSpec::new(ProductSort::Name, SortDirection::Desc);
        let c = cursor(CursorValue::Text("Lamp".to_string()));

        let Predicate::Or(branches) = seek_predicate(sort, Some(&c)) else {
            panic!("expected a disjunction");
        };
        assert!(matches!(
            &branches[0],
            Predicate::Compare { op: CompareOp::Lt, column: Column::ProductName, .. }
        ));
        let Predicate::And(tie) = &branches[1] else {
            panic!("expected tie branch");
        };
        assert!(matches!(
            &tie[1],
            Predicate::Compare { op: CompareOp::Lt, column: Column::ProductId, .. }
        ));
    }

    #[test]
    fn uncoercible_value_degrades_to_first_page() {
        let sort = SortSpec::new(ProductSort::Rating, SortDirection::Desc);
        let c = cursor(CursorValue::Text("five stars".to_string()));
        assert_eq!(seek_predicate(sort, Some(&c)), Predicate::True);
    }

    #[test]
    fn bad_id_degrades_to_first_page() {
        let sort = SortSpec::new(ProductSort::Price, SortDirection::Asc);
        let c = Cursor::new(CursorValue::Number(1.0), "not-a-uuid");
        assert_eq!(seek_predicate(sort, Some(&c)), Predicate::True);
    }

    #[test]
    fn review_cursor_parses_timestamp() {
        let sort = SortSpec::new(ReviewSort::CreatedAt, SortDirection::Desc);
        let c = cursor(CursorValue::Text("2025-01-02T03:04:05.000006Z".to_string()));

        let Predicate::Or(branches) = seek_predicate(sort, Some(&c)) else {
            panic!("expected a disjunction");
        };
        assert!(matches!(
            &branches[0],
            Predicate::Compare {
                column: Column::ReviewCreatedAt,
                op: CompareOp::Lt,
                value: SqlValue::Timestamp(_),
            }
        ));
    }
}
