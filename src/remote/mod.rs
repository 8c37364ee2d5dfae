//! The boundary between the board state store and whatever persists the board.
//!
//! [`RemoteStore`] is the only contract the store depends on. [`SqliteStore`]
//! talks to the relational backend in-process; [`HttpStore`] talks to the same
//! backend through its JSON API.

pub mod http;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{
    Attachment, Card, CardChanges, Column, ColumnChanges, Comment, NewAttachment, NewCard,
    NewColumn, NewComment,
};

pub use http::HttpStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Columns ordered ascending by `order`.
    async fn list_columns(&self) -> StoreResult<Vec<Column>>;

    /// Every card, active and archived.
    async fn list_cards(&self) -> StoreResult<Vec<Card>>;

    async fn create_column(&self, input: NewColumn) -> StoreResult<Column>;
    async fn update_column(&self, id: Uuid, changes: ColumnChanges) -> StoreResult<()>;

    /// The backend removes the column's cards along with it.
    async fn delete_column(&self, id: Uuid) -> StoreResult<()>;

    async fn create_card(&self, input: NewCard) -> StoreResult<Card>;
    async fn update_card(&self, id: Uuid, changes: CardChanges) -> StoreResult<()>;
    async fn delete_card(&self, id: Uuid) -> StoreResult<()>;
    async fn set_card_column(&self, id: Uuid, column_id: Uuid) -> StoreResult<()>;
    async fn set_card_archived(&self, id: Uuid, archived_at: Option<DateTime<Utc>>)
        -> StoreResult<()>;

    async fn list_comments(&self, card_id: Uuid) -> StoreResult<Vec<Comment>>;
    async fn add_comment(&self, input: NewComment) -> StoreResult<Comment>;

    async fn list_attachments(&self, card_id: Uuid) -> StoreResult<Vec<Attachment>>;
    async fn add_attachment(&self, input: NewAttachment) -> StoreResult<Attachment>;

    /// Returns the id of the card the attachment belonged to.
    async fn delete_attachment(&self, id: Uuid) -> StoreResult<Uuid>;
}
