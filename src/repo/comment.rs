use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Comment, CommentRow, NewComment};

#[derive(Clone)]
pub struct CommentRepository {
    pool: Arc<SqlitePool>,
}

impl CommentRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Appends a comment and bumps the card's `comment_count` in one transaction.
    pub async fn create(&self, input: &NewComment) -> Result<Comment> {
        input.validate().map_err(AppError::Validation)?;

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, Option<i64>>(
            "SELECT comment_count FROM cards WHERE id = $1",
        )
        .bind(input.card_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;

        if current.unwrap_or(0) >= i64::from(i32::MAX) {
            return Err(AppError::Validation(
                "Card has reached the comment limit".to_string(),
            ));
        }

        sqlx::query("UPDATE cards SET comment_count = COALESCE(comment_count, 0) + 1 WHERE id = $1")
            .bind(input.card_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (id, card_id, author, author_initials, text, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.card_id)
        .bind(&input.author)
        .bind(input.author_initials.as_deref())
        .bind(&input.text)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// List all comments for a card, ordered by creation time
    pub async fn list_by_card(&self, card_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT * FROM comments WHERE card_id = $1 ORDER BY created_at ASC",
        )
        .bind(card_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    /// Count comments for a card
    pub async fn count_by_card(&self, card_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE card_id = $1")
            .bind(card_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count.0)
    }
}
