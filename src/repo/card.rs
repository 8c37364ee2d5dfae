use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::card::labels_to_json;
use crate::models::{Card, CardChanges, CardRow, NewCard};

#[derive(Clone)]
pub struct CardRepository {
    pool: Arc<SqlitePool>,
}

impl CardRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    async fn column_exists(&self, column_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM columns WHERE id = $1)")
            .bind(column_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(exists)
    }

    pub async fn create(&self, input: &NewCard) -> Result<Card> {
        input.validate().map_err(AppError::Validation)?;

        if !self.column_exists(input.column_id).await? {
            return Err(AppError::Validation(format!(
                "Unknown column {}",
                input.column_id
            )));
        }

        let row = sqlx::query_as::<_, CardRow>(
            r#"
            INSERT INTO cards (id, column_id, title, description, labels, due_date, "order",
                               attachment_count, comment_count, archived_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.column_id)
        .bind(&input.title)
        .bind(input.description.as_deref())
        .bind(labels_to_json(&input.labels))
        .bind(input.due_date)
        .bind(input.order)
        .bind(input.attachment_count)
        .bind(input.comment_count)
        .bind(Utc::now())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Card>> {
        let row = sqlx::query_as::<_, CardRow>("SELECT * FROM cards WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Card::from))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Card> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// All cards, active and archived.
    pub async fn list(&self) -> Result<Vec<Card>> {
        let rows = sqlx::query_as::<_, CardRow>(
            r#"SELECT * FROM cards ORDER BY "order" ASC, created_at ASC, id ASC"#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Card::from).collect())
    }

    pub async fn update(&self, id: Uuid, changes: &CardChanges) -> Result<Card> {
        changes.validate().map_err(AppError::Validation)?;

        let row = sqlx::query_as::<_, CardRow>(
            r#"
            UPDATE cards
            SET title = $2,
                description = $3,
                labels = $4,
                due_date = $5,
                attachment_count = $6,
                comment_count = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(changes.description.as_deref())
        .bind(labels_to_json(&changes.labels))
        .bind(changes.due_date)
        .bind(changes.attachment_count)
        .bind(changes.comment_count)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AppError::NotFound)?;

        Ok(row.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    pub async fn set_column(&self, id: Uuid, column_id: Uuid) -> Result<Card> {
        if !self.column_exists(column_id).await? {
            return Err(AppError::Validation(format!("Unknown column {}", column_id)));
        }

        let row = sqlx::query_as::<_, CardRow>(
            "UPDATE cards SET column_id = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(column_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AppError::NotFound)?;

        Ok(row.into())
    }

    /// Sets or clears `archived_at`, the card's only archival flag.
    pub async fn set_archived(&self, id: Uuid, archived_at: Option<DateTime<Utc>>) -> Result<Card> {
        let row = sqlx::query_as::<_, CardRow>(
            "UPDATE cards SET archived_at = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(archived_at)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AppError::NotFound)?;

        Ok(row.into())
    }
}
