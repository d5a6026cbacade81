//! Postgres-backed inventory store.
//!
//! Uses runtime-checked queries against the `sweets` table. Stock changes are a
//! single conditional `UPDATE`, so the bounds check and the write are atomic
//! at the row level.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use tracing::instrument;

use sweetshop_core::SweetId;
use sweetshop_inventory::{InventoryRecord, InventoryStore, MAX_STOCK, StockChange, StoreError, ValidSweet};

use crate::db::describe;

const COLUMNS: &str = "id, name, category, price, quantity_in_stock";

#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: Arc<PgPool>,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    StoreError::Backend(describe(operation, &err))
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[instrument(skip(self, sweet), err)]
    async fn insert(&self, sweet: ValidSweet) -> Result<InventoryRecord, StoreError> {
        let sql = format!(
            "INSERT INTO sweets (name, category, price, quantity_in_stock) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SweetRow>(&sql)
            .bind(sweet.name())
            .bind(sweet.category())
            .bind(sweet.price())
            .bind(sweet.quantity_in_stock())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_sweet", e))?;

        Ok(row.into())
    }

    #[instrument(skip(self), fields(sweet_id = %id), err)]
    async fn get_by_id(&self, id: SweetId) -> Result<Option<InventoryRecord>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM sweets WHERE id = $1");
        let row = sqlx::query_as::<_, SweetRow>(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_sweet", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, sweet), fields(sweet_id = %id), err)]
    async fn replace(&self, id: SweetId, sweet: ValidSweet) -> Result<InventoryRecord, StoreError> {
        let sql = format!(
            "UPDATE sweets \
             SET name = $2, category = $3, price = $4, quantity_in_stock = $5, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SweetRow>(&sql)
            .bind(id.get())
            .bind(sweet.name())
            .bind(sweet.category())
            .bind(sweet.price())
            .bind(sweet.quantity_in_stock())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("replace_sweet", e))?;

        row.map(Into::into).ok_or(StoreError::NotFound(id))
    }

    #[instrument(skip(self), fields(sweet_id = %id), err)]
    async fn remove(&self, id: SweetId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM sweets WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_sweet", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn all(&self) -> Result<Vec<InventoryRecord>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM sweets ORDER BY id ASC");
        let rows = sqlx::query_as::<_, SweetRow>(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_sweets", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), err)]
    async fn find_by_text(&self, needle: &str) -> Result<Vec<InventoryRecord>, StoreError> {
        // strpos avoids LIKE wildcard escaping.
        let sql = format!(
            "SELECT {COLUMNS} FROM sweets \
             WHERE strpos(LOWER(name), LOWER($1)) > 0 OR strpos(LOWER(category), LOWER($1)) > 0 \
             ORDER BY id ASC"
        );
        let rows = sqlx::query_as::<_, SweetRow>(&sql)
            .bind(needle)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("search_sweets", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), fields(sweet_id = %id), err)]
    async fn adjust_stock(&self, id: SweetId, delta: i64) -> Result<StockChange, StoreError> {
        let sql = format!(
            "UPDATE sweets \
             SET quantity_in_stock = quantity_in_stock + $2, updated_at = NOW() \
             WHERE id = $1 AND quantity_in_stock::BIGINT + $2 BETWEEN 0 AND $3 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, SweetRow>(&sql)
            .bind(id.get())
            .bind(delta)
            .bind(MAX_STOCK)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("adjust_stock", e))?;

        if let Some(row) = updated {
            return Ok(StockChange::Applied(row.into()));
        }

        // Nothing was written; report why from the current row.
        let available: Option<i32> = sqlx::query_scalar("SELECT quantity_in_stock FROM sweets WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("read_stock", e))?;

        let available = i64::from(available.ok_or(StoreError::NotFound(id))?);
        if available + delta < 0 {
            Ok(StockChange::Insufficient { available })
        } else {
            Ok(StockChange::CapacityExceeded { available })
        }
    }
}

#[derive(Debug)]
struct SweetRow {
    id: i64,
    name: String,
    category: String,
    price: Decimal,
    quantity_in_stock: i32,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for SweetRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(SweetRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            price: row.try_get("price")?,
            quantity_in_stock: row.try_get("quantity_in_stock")?,
        })
    }
}

impl From<SweetRow> for InventoryRecord {
    fn from(row: SweetRow) -> Self {
        InventoryRecord {
            id: SweetId::new(row.id),
            name: row.name,
            category: row.category,
            price: row.price,
            quantity_in_stock: i64::from(row.quantity_in_stock),
        }
    }
}
