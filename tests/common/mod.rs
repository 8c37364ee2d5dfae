#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};
use uuid::Uuid;

use kanban_sync::error::{StoreError, StoreResult};
use kanban_sync::models::{
    Attachment, Card, CardChanges, Column, ColumnChanges, Comment, NewAttachment, NewCard,
    NewColumn, NewComment,
};
use kanban_sync::{test_utils, RemoteStore, SqliteStore};

/// Holds `list_cards` after it has read the backend until released.
pub struct Gate {
    pub entered: Notify,
    release: Semaphore,
}

impl Gate {
    pub fn release(&self) {
        self.release.add_permits(1);
    }
}

/// Wraps a [`SqliteStore`] with failure injection, latency and gating.
pub struct ControlledStore {
    pub inner: SqliteStore,
    fail: AtomicBool,
    write_delay: Mutex<Option<Duration>>,
    gate: Mutex<Option<Arc<Gate>>>,
    pub list_cards_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
}

impl ControlledStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            fail: AtomicBool::new(false),
            write_delay: Mutex::new(None),
            gate: Mutex::new(None),
            list_cards_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn set_write_delay(&self, delay: Option<Duration>) {
        *self.write_delay.lock().unwrap() = delay;
    }

    /// Gates the next `list_cards` calls until the gate is removed.
    pub fn install_gate(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate {
            entered: Notify::new(),
            release: Semaphore::new(0),
        });
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn remove_gate(&self) {
        *self.gate.lock().unwrap() = None;
    }

    pub fn list_cards_calls(&self) -> usize {
        self.list_cards_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> StoreResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("backend unavailable".to_string()));
        }
        Ok(())
    }

    async fn before_write(&self) -> StoreResult<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let delay = *self.write_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

pub async fn sqlite_store() -> SqliteStore {
    SqliteStore::from_pool(test_utils::create_test_pool().await)
}

pub async fn controlled_store() -> Arc<ControlledStore> {
    Arc::new(ControlledStore::new(sqlite_store().await))
}

/// Every card id appears in exactly one of the two card collections.
pub fn assert_partitioned(state: &kanban_sync::BoardState) {
    for card in &state.active_cards {
        assert!(card.archived_at.is_none(), "active card {} is archived", card.id);
        assert!(
            state.archived_card(card.id).is_none(),
            "card {} is both active and archived",
            card.id
        );
    }
    for card in &state.archived_cards {
        assert!(card.archived_at.is_some(), "archived card {} has no timestamp", card.id);
    }
}

#[async_trait]
impl RemoteStore for ControlledStore {
    async fn list_columns(&self) -> StoreResult<Vec<Column>> {
        self.check()?;
        self.inner.list_columns().await
    }

    async fn list_cards(&self) -> StoreResult<Vec<Card>> {
        self.list_cards_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let cards = self.inner.list_cards().await?;

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release
                .acquire()
                .await
                .expect("gate semaphore closed")
                .forget();
        }

        Ok(cards)
    }

    async fn create_column(&self, input: NewColumn) -> StoreResult<Column> {
        self.before_write().await?;
        self.inner.create_column(input).await
    }

    async fn update_column(&self, id: Uuid, changes: ColumnChanges) -> StoreResult<()> {
        self.before_write().await?;
        self.inner.update_column(id, changes).await
    }

    async fn delete_column(&self, id: Uuid) -> StoreResult<()> {
        self.before_write().await?;
        self.inner.delete_column(id).await
    }

    async fn create_card(&self, input: NewCard) -> StoreResult<Card> {
        self.before_write().await?;
        self.inner.create_card(input).await
    }

    async fn update_card(&self, id: Uuid, changes: CardChanges) -> StoreResult<()> {
        self.before_write().await?;
        self.inner.update_card(id, changes).await
    }

    async fn delete_card(&self, id: Uuid) -> StoreResult<()> {
        self.before_write().await?;
        self.inner.delete_card(id).await
    }

    async fn set_card_column(&self, id: Uuid, column_id: Uuid) -> StoreResult<()> {
        self.before_write().await?;
        self.inner.set_card_column(id, column_id).await
    }

    async fn set_card_archived(
        &self,
        id: Uuid,
        archived_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        self.before_write().await?;
        self.inner.set_card_archived(id, archived_at).await
    }

    async fn list_comments(&self, card_id: Uuid) -> StoreResult<Vec<Comment>> {
        self.check()?;
        self.inner.list_comments(card_id).await
    }

    async fn add_comment(&self, input: NewComment) -> StoreResult<Comment> {
        self.before_write().await?;
        self.inner.add_comment(input).await
    }

    async fn list_attachments(&self, card_id: Uuid) -> StoreResult<Vec<Attachment>> {
        self.check()?;
        self.inner.list_attachments(card_id).await
    }

    async fn add_attachment(&self, input: NewAttachment) -> StoreResult<Attachment> {
        self.before_write().await?;
        self.inner.add_attachment(input).await
    }

    async fn delete_attachment(&self, id: Uuid) -> StoreResult<Uuid> {
        self.before_write().await?;
        self.inner.delete_attachment(id).await
    }
}
