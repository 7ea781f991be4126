//! Generic SQLite table.
//!
//! Queries are built at runtime from the entity's column list, so a single
//! implementation serves every table. Column and table names come from
//! compile-time constants and are never taken from user input.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{FromRow, Sqlite, SqlitePool};
use tracing::debug;

use nexo_core::generate_id;

use crate::error::{StoreError, StoreResult};
use crate::table::{check_filter, Entity, Ordering, Table};

/// A query with positional arguments bound.
pub type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Mapping between an entity and its SQLite row.
pub trait SqlRow: Entity + for<'r> FromRow<'r, SqliteRow> {
    /// Every column, in the order [`SqlRow::bind_columns`] binds them.
    const COLUMNS: &'static [&'static str];

    /// Binds every column value, in `COLUMNS` order.
    fn bind_columns<'q>(&self, query: SqliteQuery<'q>) -> SqliteQuery<'q>;
}

fn quote(column: &str) -> String {
    format!("\"{column}\"")
}

fn order_clause(ordering: &Ordering) -> String {
    format!(
        "ORDER BY {} {}, \"id\" ASC",
        quote(ordering.column),
        ordering.direction.as_sql()
    )
}

/// `Table<E>` over the local pool.
pub struct SqlTable<E> {
    pool: SqlitePool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: SqlRow> SqlTable<E> {
    pub fn new(pool: SqlitePool) -> Self {
        SqlTable {
            pool,
            _entity: PhantomData,
        }
    }

    fn insert_sql() -> String {
        let columns: Vec<String> = E::COLUMNS.iter().map(|c| quote(c)).collect();
        let placeholders = vec!["?"; E::COLUMNS.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            E::TABLE,
            columns.join(", "),
            placeholders
        )
    }

    fn update_sql() -> String {
        let assignments: Vec<String> = E::COLUMNS
            .iter()
            .map(|c| format!("{} = ?", quote(c)))
            .collect();
        format!(
            "UPDATE {} SET {} WHERE \"id\" = ?",
            E::TABLE,
            assignments.join(", ")
        )
    }
}

#[async_trait]
impl<E: SqlRow> Table<E> for SqlTable<E> {
    async fn list(&self, ordering: Ordering) -> StoreResult<Vec<E>> {
        ordering.check::<E>()?;
        let sql = format!("SELECT * FROM {} {}", E::TABLE, order_clause(&ordering));

        let rows = sqlx::query_as::<_, E>(&sql).fetch_all(&self.pool).await?;
        debug!(table = E::TABLE, count = rows.len(), "Listed records");
        Ok(rows)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<E>> {
        let sql = format!("SELECT * FROM {} WHERE \"id\" = ?", E::TABLE);
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by(&self, column: &str, value: &str, ordering: Ordering) -> StoreResult<Vec<E>> {
        check_filter::<E>(column)?;
        ordering.check::<E>()?;
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ? {}",
            E::TABLE,
            quote(column),
            order_clause(&ordering)
        );

        let rows = sqlx::query_as::<_, E>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        debug!(table = E::TABLE, column, count = rows.len(), "Filtered records");
        Ok(rows)
    }

    async fn create(&self, new: E::New) -> StoreResult<E> {
        let record = E::build(generate_id(), new, Utc::now());
        let sql = Self::insert_sql();

        record
            .bind_columns(sqlx::query(&sql))
            .execute(&self.pool)
            .await?;

        debug!(table = E::TABLE, id = record.id(), "Inserted record");
        Ok(record)
    }

    /// Read, patch and write back inside one transaction.
    async fn update(&self, id: &str, patch: E::Patch) -> StoreResult<E> {
        let mut tx = self.pool.begin().await?;

        let select = format!("SELECT * FROM {} WHERE \"id\" = ?", E::TABLE);
        let mut record = sqlx::query_as::<_, E>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found(E::LABEL, id))?;

        record.apply(&patch, Utc::now());

        let sql = Self::update_sql();
        record
            .bind_columns(sqlx::query(&sql))
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(table = E::TABLE, id, "Updated record");
        Ok(record)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE \"id\" = ?", E::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(E::LABEL, id));
        }

        debug!(table = E::TABLE, id, "Deleted record");
        Ok(())
    }
}
