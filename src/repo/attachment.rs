use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Attachment, AttachmentRow, NewAttachment};

#[derive(Clone)]
pub struct AttachmentRepository {
    pool: Arc<SqlitePool>,
}

impl AttachmentRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &NewAttachment) -> Result<Attachment> {
        input.validate().map_err(AppError::Validation)?;

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, Option<i64>>(
            "SELECT attachment_count FROM cards WHERE id = $1",
        )
        .bind(input.card_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;

        if current.unwrap_or(0) >= i64::from(i32::MAX) {
            return Err(AppError::Validation(
                "Card has reached the attachment limit".to_string(),
            ));
        }

        sqlx::query(
            "UPDATE cards SET attachment_count = COALESCE(attachment_count, 0) + 1 WHERE id = $1",
        )
        .bind(input.card_id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, AttachmentRow>(
            r#"
            INSERT INTO attachments (id, card_id, name, type, url, size, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.card_id)
        .bind(&input.name)
        .bind(input.kind.to_string())
        .bind(input.url.as_deref())
        .bind(input.normalized_size())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    pub async fn list_by_card(&self, card_id: Uuid) -> Result<Vec<Attachment>> {
        let rows = sqlx::query_as::<_, AttachmentRow>(
            "SELECT * FROM attachments WHERE card_id = $1 ORDER BY created_at ASC",
        )
        .bind(card_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Attachment::from).collect())
    }

    /// Deletes the attachment and returns the id of the card it belonged to.
    pub async fn delete(&self, id: Uuid) -> Result<Uuid> {
        let mut tx = self.pool.begin().await?;

        let card_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM attachments WHERE id = $1 RETURNING card_id",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;

        sqlx::query(
            r#"
            UPDATE cards
            SET attachment_count = MAX(COALESCE(attachment_count, 0) - 1, 0)
            WHERE id = $1
            "#,
        )
        .bind(card_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(card_id)
    }
}
