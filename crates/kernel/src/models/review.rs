//! Review model.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::listing::{Column, Record, SqlValue};

/// Review record.
///
/// Serialized in camelCase; it is returned to API clients as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Reviewed product.
    pub product_id: Uuid,

    pub author_name: String,

    pub title: String,

    pub body: String,

    /// Star rating, 1 to 5.
    pub rating: i16,

    /// Creation time, microsecond precision.
    pub created_at: DateTime<Utc>,
}

impl Record for Review {
    fn id(&self) -> Uuid {
        self.id
    }

    fn value(&self, column: Column) -> Option<SqlValue> {
        match column {
            Column::ReviewId => Some(SqlValue::Uuid(self.id)),
            Column::ReviewProductId => Some(SqlValue::Uuid(self.product_id)),
            Column::ReviewRating => Some(SqlValue::Integer(i64::from(self.rating))),
            Column::ReviewCreatedAt => Some(SqlValue::Timestamp(self.created_at)),
            _ => None,
        }
    }
}

/// A validated review, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub product_id: Uuid,
    pub author_name: String,
    pub title: String,
    pub body: String,
    pub rating: i16,
}

impl NewReview {
    /// Materialize the row with a fresh id and timestamp.
    ///
    /// The timestamp is truncated to microseconds so that the stored value,
    /// the value in a cursor, and the value compared by a seek all agree.
    pub fn into_review(self) -> Review {
        Review {
            id: Uuid::now_v7(),
            product_id: self.product_id,
            author_name: self.author_name,
            title: self.title,
            body: self.body,
            rating: self.rating,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}
