use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, StoreError, StoreResult};
use crate::models::{
    Attachment, Card, CardChanges, Column, ColumnChanges, Comment, NewAttachment, NewCard,
    NewColumn, NewComment,
};
use crate::state::AppState;

use super::RemoteStore;

/// Remote store backed directly by the SQLite repositories.
#[derive(Clone)]
pub struct SqliteStore {
    state: AppState,
}

impl SqliteStore {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self::new(AppState::new(pool))
    }

    async fn require_card(&self, id: Uuid) -> StoreResult<()> {
        self.state
            .cards
            .get_by_id(id)
            .await
            .map_err(not_found("card", id))?;
        Ok(())
    }
}

/// Repository `NotFound` carries no subject; name it for the caller.
fn not_found(what: &'static str, id: Uuid) -> impl FnOnce(AppError) -> StoreError {
    move |err| match err {
        AppError::NotFound => StoreError::NotFound(format!("{} {}", what, id)),
        other => other.into(),
    }
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn list_columns(&self) -> StoreResult<Vec<Column>> {
        Ok(self.state.columns.list().await?)
    }

    async fn list_cards(&self) -> StoreResult<Vec<Card>> {
        Ok(self.state.cards.list().await?)
    }

    async fn create_column(&self, input: NewColumn) -> StoreResult<Column> {
        Ok(self.state.columns.create(&input).await?)
    }

    async fn update_column(&self, id: Uuid, changes: ColumnChanges) -> StoreResult<()> {
        self.state
            .columns
            .update(id, &changes)
            .await
            .map_err(not_found("column", id))?;
        Ok(())
    }

    async fn delete_column(&self, id: Uuid) -> StoreResult<()> {
        self.state
            .columns
            .delete(id)
            .await
            .map_err(not_found("column", id))
    }

    async fn create_card(&self, input: NewCard) -> StoreResult<Card> {
        Ok(self.state.cards.create(&input).await?)
    }

    async fn update_card(&self, id: Uuid, changes: CardChanges) -> StoreResult<()> {
        self.state
            .cards
            .update(id, &changes)
            .await
            .map_err(not_found("card", id))?;
        Ok(())
    }

    async fn delete_card(&self, id: Uuid) -> StoreResult<()> {
        self.state
            .cards
            .delete(id)
            .await
            .map_err(not_found("card", id))
    }

    async fn set_card_column(&self, id: Uuid, column_id: Uuid) -> StoreResult<()> {
        self.state
            .cards
            .set_column(id, column_id)
            .await
            .map_err(not_found("card", id))?;
        Ok(())
    }

    async fn set_card_archived(
        &self,
        id: Uuid,
        archived_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        self.state
            .cards
            .set_archived(id, archived_at)
            .await
            .map_err(not_found("card", id))?;
        Ok(())
    }

    async fn list_comments(&self, card_id: Uuid) -> StoreResult<Vec<Comment>> {
        self.require_card(card_id).await?;
        Ok(self.state.comments.list_by_card(card_id).await?)
    }

    async fn add_comment(&self, input: NewComment) -> StoreResult<Comment> {
        let card_id = input.card_id;
        self.state
            .comments
            .create(&input)
            .await
            .map_err(not_found("card", card_id))
    }

    async fn list_attachments(&self, card_id: Uuid) -> StoreResult<Vec<Attachment>> {
        self.require_card(card_id).await?;
        Ok(self.state.attachments.list_by_card(card_id).await?)
    }

    async fn add_attachment(&self, input: NewAttachment) -> StoreResult<Attachment> {
        let card_id = input.card_id;
        self.state
            .attachments
            .create(&input)
            .await
            .map_err(not_found("card", card_id))
    }

    async fn delete_attachment(&self, id: Uuid) -> StoreResult<Uuid> {
        self.state
            .attachments
            .delete(id)
            .await
            .map_err(not_found("attachment", id))
    }
}
