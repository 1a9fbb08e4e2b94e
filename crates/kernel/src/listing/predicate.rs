//! Storage-layer filter expressions.
//!
//! A [`Predicate`] is a small boolean expression over typed columns. The
//! PostgreSQL store renders it to a SeaQuery [`Cond`]; the in-memory store
//! evaluates it against rows through [`Record`].

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use sea_query::{Alias, Cond, Expr, SimpleExpr};
use uuid::Uuid;

/// Every column the listing engine can filter or order on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ProductId,
    ProductName,
    ProductCategory,
    ProductPrice,
    ProductAverageRating,
    ReviewId,
    ReviewProductId,
    ReviewRating,
    ReviewCreatedAt,
}

impl Column {
    pub fn table(self) -> &'static str {
        match self {
            Column::ProductId
            | Column::ProductName
            | Column::ProductCategory
            | Column::ProductPrice
            | Column::ProductAverageRating => "product",
            Column::ReviewId
            | Column::ReviewProductId
            | Column::ReviewRating
            | Column::ReviewCreatedAt => "review",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Column::ProductId | Column::ReviewId => "id",
            Column::ProductName => "name",
            Column::ProductCategory => "category",
            Column::ProductPrice => "price",
            Column::ProductAverageRating => "average_rating",
            Column::ReviewProductId => "product_id",
            Column::ReviewRating => "rating",
            Column::ReviewCreatedAt => "created_at",
        }
    }

    /// Qualified SeaQuery column expression.
    pub fn expr(self) -> Expr {
        Expr::col((Alias::new(self.table()), Alias::new(self.name())))
    }
}

/// A typed scalar compared against a column.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Float(f64),
    Integer(i64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Total order within a variant; values of different variants are
    /// incomparable.
    pub fn compare(&self, other: &SqlValue) -> Option<Ordering> {
        match (self, other) {
            (SqlValue::Float(a), SqlValue::Float(b)) => a.partial_cmp(b),
            (SqlValue::Integer(a), SqlValue::Integer(b)) => Some(a.cmp(b)),
            (SqlValue::Text(a), SqlValue::Text(b)) => Some(a.cmp(b)),
            (SqlValue::Uuid(a), SqlValue::Uuid(b)) => Some(a.cmp(b)),
            (SqlValue::Timestamp(a), SqlValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<&SqlValue> for sea_query::Value {
    fn from(value: &SqlValue) -> Self {
        match value {
            SqlValue::Float(f) => (*f).into(),
            SqlValue::Integer(i) => (*i).into(),
            SqlValue::Text(s) => s.clone().into(),
            SqlValue::Uuid(u) => (*u).into(),
            SqlValue::Timestamp(t) => (*t).into(),
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
        }
    }
}

/// A row that predicates can be evaluated against.
pub trait Record: Clone + Send + Sync + 'static {
    /// Unique, immutable identifier (the pagination tiebreaker).
    fn id(&self) -> Uuid;

    /// Value of `column`, or `None` if the column belongs to another table.
    fn value(&self, column: Column) -> Option<SqlValue>;
}

/// Boolean filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every row.
    True,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Compare {
        column: Column,
        op: CompareOp,
        value: SqlValue,
    },
    /// Column equals any of the values. Never empty.
    In {
        column: Column,
        values: Vec<SqlValue>,
    },
}

impl Predicate {
    pub fn compare(column: Column, op: CompareOp, value: SqlValue) -> Self {
        Predicate::Compare { column, op, value }
    }

    /// Conjunction, dropping identity terms.
    pub fn all(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut parts: Vec<Predicate> = parts
            .into_iter()
            .filter(|p| *p != Predicate::True)
            .collect();
        match parts.len() {
            0 => Predicate::True,
            1 => parts.remove(0),
            _ => Predicate::And(parts),
        }
    }

    pub fn and(self, other: Predicate) -> Self {
        Predicate::all([self, other])
    }

    /// Render as a SeaQuery condition.
    pub fn to_condition(&self) -> Cond {
        match self {
            Predicate::True => Cond::all(),
            Predicate::And(parts) => parts
                .iter()
                .fold(Cond::all(), |cond, p| cond.add(p.to_condition())),
            Predicate::Or(parts) => parts
                .iter()
                .fold(Cond::any(), |cond, p| cond.add(p.to_condition())),
            Predicate::Compare { column, op, value } => {
                Cond::all().add(compare_expr(*column, *op, value))
            }
            Predicate::In { column, values } => Cond::all().add(
                column
                    .expr()
                    .is_in(values.iter().map(sea_query::Value::from)),
            ),
        }
    }

    /// Evaluate against a row.
    pub fn matches<R: Record>(&self, row: &R) -> bool {
        match self {
            Predicate::True => true,
            Predicate::And(parts) => parts.iter().all(|p| p.matches(row)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(row)),
            Predicate::Compare { column, op, value } => row
                .value(*column)
                .and_then(|actual| actual.compare(value))
                .is_some_and(|ordering| op.holds(ordering)),
            Predicate::In { column, values } => row.value(*column).is_some_and(|actual| {
                values
                    .iter()
                    .any(|v| actual.compare(v) == Some(Ordering::Equal))
            }),
        }
    }
}

fn compare_expr(column: Column, op: CompareOp, value: &SqlValue) -> SimpleExpr {
    let value = sea_query::Value::from(value);
    let col = column.expr();
    match op {
        CompareOp::Eq => col.eq(value),
        CompareOp::Gt => col.gt(value),
        CompareOp::Gte => col.gte(value),
        CompareOp::Lt => col.lt(value),
        CompareOp::Lte => col.lte(value),
    }
}
