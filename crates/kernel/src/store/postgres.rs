//! PostgreSQL catalogue engine.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_query::{Alias, Expr, Order, PostgresQueryBuilder, Query, SelectStatement};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{CatalogStore, ReviewTransaction};
use crate::db;
use crate::listing::{Column, OrderBy, Predicate, SortDirection};
use crate::models::{Product, RatingAggregate, Review, ReviewStats};

const PRODUCT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "description",
    "category",
    "price",
    "image_url",
    "average_rating",
    "review_count",
    "created_at",
];

const REVIEW_COLUMNS: &[&str] = &[
    "id",
    "product_id",
    "author_name",
    "title",
    "body",
    "rating",
    "created_at",
];

/// PostgreSQL-backed [`CatalogStore`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run a generated listing SELECT with a statement timeout.
    ///
    /// `SET LOCAL` only applies inside a transaction and resets on commit.
    async fn fetch_listing<T>(&self, sql: &str) -> Result<Vec<T>>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin listing transaction")?;

        sqlx::query("SET LOCAL statement_timeout = '10s'")
            .execute(&mut *tx)
            .await
            .context("failed to set statement timeout")?;

        let rows = sqlx::query_as::<_, T>(sql)
            .fetch_all(&mut *tx)
            .await
            .context("failed to execute listing query")?;

        tx.commit()
            .await
            .context("failed to commit listing transaction")?;

        Ok(rows)
    }
}

/// `SELECT <columns> FROM <table> [WHERE ..] ORDER BY .. LIMIT n`.
fn listing_sql(
    table: &str,
    columns: &[&str],
    filter: &Predicate,
    order: &[OrderBy],
    limit: u64,
) -> String {
    let mut query = select_from(table, columns);

    if *filter != Predicate::True {
        query.cond_where(filter.to_condition());
    }

    for term in order {
        query.order_by(column_ref(term.column), sea_order(term.direction));
    }

    query.limit(limit);
    query.to_string(PostgresQueryBuilder)
}

/// `SELECT COUNT(*), AVG(rating) FROM review [WHERE ..]`.
fn aggregate_sql(filter: &Predicate) -> String {
    let mut query = Query::select();
    query
        .expr(Expr::cust("COUNT(*)"))
        .expr(Expr::cust(
            r#"COALESCE(AVG("review"."rating"), 0)::float8"#,
        ))
        .from(Alias::new("review"));
    if *filter != Predicate::True {
        query.cond_where(filter.to_condition());
    }
    query.to_string(PostgresQueryBuilder)
}

fn select_from(table: &str, columns: &[&str]) -> SelectStatement {
    let mut query = Query::select();
    for column in columns {
        query.column((Alias::new(table), Alias::new(*column)));
    }
    query.from(Alias::new(table));
    query
}

fn column_ref(column: Column) -> (Alias, Alias) {
    (Alias::new(column.table()), Alias::new(column.name()))
}

fn sea_order(direction: SortDirection) -> Order {
    match direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn query_products(
        &self,
        filter: &Predicate,
        order: &[OrderBy],
        limit: u64,
    ) -> Result<Vec<Product>> {
        let sql = listing_sql("product", PRODUCT_COLUMNS, filter, order, limit);
        tracing::debug!(%sql, "product listing query");
        self.fetch_listing(&sql).await
    }

    async fn query_reviews(
        &self,
        filter: &Predicate,
        order: &[OrderBy],
        limit: u64,
    ) -> Result<Vec<Review>> {
        let sql = listing_sql("review", REVIEW_COLUMNS, filter, order, limit);
        tracing::debug!(%sql, "review listing query");
        self.fetch_listing(&sql).await
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, category, price, image_url,
                   average_rating, review_count, created_at
            FROM product WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch product by id")?;

        Ok(product)
    }

    async fn aggregate_reviews(&self, filter: &Predicate) -> Result<ReviewStats> {
        let sql = aggregate_sql(filter);
        tracing::debug!(%sql, "review aggregate query");

        let (count, average): (i64, f64) = sqlx::query_as(&sql)
            .fetch_one(&self.pool)
            .await
            .context("failed to aggregate reviews")?;

        Ok(ReviewStats { count, average })
    }

    async fn begin(&self) -> Result<Box<dyn ReviewTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .context("failed to begin review transaction")?;
        Ok(Box::new(PgReviewTx { tx }))
    }

    async fn healthy(&self) -> bool {
        db::check_health(&self.pool).await
    }
}

/// Review write transaction. Rolls back on drop unless committed.
struct PgReviewTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ReviewTransaction for PgReviewTx {
    async fn lock_product(&mut self, product_id: Uuid) -> Result<Option<RatingAggregate>> {
        let row: Option<(i32, f64)> = sqlx::query_as(
            "SELECT review_count, average_rating FROM product WHERE id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("failed to lock product row")?;

        Ok(row.map(|(review_count, average_rating)| RatingAggregate {
            review_count,
            average_rating,
        }))
    }

    async fn insert_review(&mut self, review: &Review) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO review (id, product_id, author_name, title, body, rating, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(review.id)
        .bind(review.product_id)
        .bind(&review.author_name)
        .bind(&review.title)
        .bind(&review.body)
        .bind(review.rating)
        .bind(review.created_at)
        .execute(&mut *self.tx)
        .await
        .context("failed to insert review")?;

        Ok(())
    }

    async fn update_aggregate(
        &mut self,
        product_id: Uuid,
        aggregate: RatingAggregate,
    ) -> Result<()> {
        sqlx::query("UPDATE product SET review_count = $1, average_rating = $2 WHERE id = $3")
            .bind(aggregate.review_count)
            .bind(aggregate.average_rating)
            .bind(product_id)
            .execute(&mut *self.tx)
            .await
            .context("failed to update product rating aggregate")?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .context("failed to commit review transaction")?;
        Ok(())
    }
}
