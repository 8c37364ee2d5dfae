use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Column, ColumnChanges, ColumnRow, NewColumn};

/// Columns created on an empty board when seeding is enabled.
pub const DEFAULT_COLUMNS: [(&str, &str); 3] = [
    ("To Do", "#22c55e"),
    ("In Progress", "#3b82f6"),
    ("Done", "#a855f7"),
];

#[derive(Clone)]
pub struct ColumnRepository {
    pool: Arc<SqlitePool>,
}

impl ColumnRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &NewColumn) -> Result<Column> {
        input.validate().map_err(AppError::Validation)?;

        let row = sqlx::query_as::<_, ColumnRow>(
            r#"
            INSERT INTO columns (id, name, color, "order", created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.color)
        .bind(input.order)
        .bind(Utc::now())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    pub async fn list(&self) -> Result<Vec<Column>> {
        let rows = sqlx::query_as::<_, ColumnRow>(
            r#"SELECT * FROM columns ORDER BY "order" ASC, id ASC"#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Column::from).collect())
    }

    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM columns")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count.0)
    }

    pub async fn update(&self, id: Uuid, changes: &ColumnChanges) -> Result<Column> {
        changes.validate().map_err(AppError::Validation)?;

        let row = sqlx::query_as::<_, ColumnRow>(
            r#"
            UPDATE columns
            SET name = COALESCE($2, name),
                color = COALESCE($3, color)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.color.as_deref())
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AppError::NotFound)?;

        Ok(row.into())
    }

    /// Deletes the column; its cards go with it through the foreign key.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM columns WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    /// Inserts [`DEFAULT_COLUMNS`] when the board has no columns yet.
    pub async fn seed_defaults(&self) -> Result<Vec<Column>> {
        if self.count().await? > 0 {
            return Ok(Vec::new());
        }

        let mut created = Vec::with_capacity(DEFAULT_COLUMNS.len());
        for (order, (name, color)) in DEFAULT_COLUMNS.iter().enumerate() {
            let column = self
                .create(&NewColumn {
                    name: name.to_string(),
                    color: color.to_string(),
                    order: order as i32,
                })
                .await?;
            created.push(column);
        }

        tracing::info!("Seeded {} default columns", created.len());
        Ok(created)
    }
}
