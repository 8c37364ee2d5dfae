//! In-memory board cache kept in step with a [`RemoteStore`].
//!
//! Mutations write through to the remote store first and touch the cache only
//! once the remote call succeeded. [`BoardStore::refresh`] replaces the whole
//! cache with a fresh read and is the authoritative reconciliation step: a
//! refresh that started before a mutation but finishes after it overwrites the
//! mutation's local effect until the next refresh reads it back.

pub mod state;
pub mod sync;

use chrono::Utc;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Attachment, Card, CardChanges, CardDraft, Column, ColumnChanges, Comment, NewAttachment,
    NewColumn, NewComment,
};
use crate::remote::RemoteStore;

pub use state::BoardState;
pub use sync::SyncHandle;

#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// Delay between scheduled refreshes.
    pub interval: Duration,
    /// Upper bound for any single remote call.
    pub remote_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            remote_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&Config> for SyncConfig {
    fn from(config: &Config) -> Self {
        Self {
            interval: config.sync_interval,
            remote_timeout: config.remote_timeout,
        }
    }
}

struct Inner {
    remote: Arc<dyn RemoteStore>,
    state: watch::Sender<BoardState>,
    refresh_lock: Mutex<()>,
    closed: AtomicBool,
    remote_timeout: Duration,
}

/// Handle to the board cache. Cheap to clone; all clones share one cache.
#[derive(Clone)]
pub struct BoardStore {
    inner: Arc<Inner>,
}

impl BoardStore {
    /// Creates a store with an empty, loading cache. Nothing is fetched until
    /// [`BoardStore::refresh`] runs; [`BoardStore::open`] does both.
    pub fn new(remote: Arc<dyn RemoteStore>, remote_timeout: Duration) -> Self {
        let (state, _) = watch::channel(BoardState::default());
        Self {
            inner: Arc::new(Inner {
                remote,
                state,
                refresh_lock: Mutex::new(()),
                closed: AtomicBool::new(false),
                remote_timeout,
            }),
        }
    }

    /// Performs the initial refresh, then starts the synchronization loop.
    ///
    /// A failed initial refresh leaves the board empty with `last_error` set;
    /// the loop retries on its next tick.
    pub async fn open(remote: Arc<dyn RemoteStore>, config: SyncConfig) -> (Self, SyncHandle) {
        let store = Self::new(remote, config.remote_timeout);

        if let Err(e) = store.refresh().await {
            tracing::warn!("Initial board refresh failed: {}", e);
        }

        let handle = SyncHandle::spawn(store.clone(), config.interval);
        (store, handle)
    }

    pub fn snapshot(&self) -> BoardState {
        self.inner.state.borrow().clone()
    }

    /// Change feed: the receiver is marked changed after every cache write.
    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.inner.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn last_error(&self) -> Option<StoreError> {
        self.inner.state.borrow().last_error.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    async fn call<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        match tokio::time::timeout(self.inner.remote_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Transport(format!(
                "{} timed out after {:?}",
                operation, self.inner.remote_timeout
            ))),
        }
    }

    /// Re-reads columns and cards and replaces the cache with them.
    ///
    /// Waits for a refresh already in flight rather than running alongside
    /// it. On failure the cache keeps its last good contents and records the
    /// error in `last_error`.
    pub async fn refresh(&self) -> StoreResult<()> {
        let _guard = self.inner.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Like [`BoardStore::refresh`], but returns `None` without doing anything
    /// when another refresh is in flight.
    pub(crate) async fn try_refresh(&self) -> Option<StoreResult<()>> {
        let Ok(_guard) = self.inner.refresh_lock.try_lock() else {
            return None;
        };
        Some(self.refresh_locked().await)
    }

    async fn refresh_locked(&self) -> StoreResult<()> {
        let remote = &self.inner.remote;
        let result = tokio::try_join!(
            self.call("list_columns", remote.list_columns()),
            self.call("list_cards", remote.list_cards()),
        );

        if self.is_closed() {
            tracing::debug!("Discarding refresh result, board store is closed");
            return result.map(|_| ());
        }

        match result {
            Ok((columns, cards)) => {
                let next = BoardState::from_remote(columns, cards);
                let changed = self.inner.state.send_if_modified(|state| {
                    if *state == next {
                        return false;
                    }
                    *state = next;
                    true
                });
                tracing::debug!(changed, "Board refreshed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Board refresh failed, keeping cached board: {}", e);
                self.inner.state.send_modify(|state| {
                    state.loading = false;
                    state.last_error = Some(e.clone());
                });
                Err(e)
            }
        }
    }

    /// Creates a column at the end of the board.
    pub async fn add_column(&self, name: &str, color: &str) -> StoreResult<Column> {
        let input = NewColumn {
            name: name.to_string(),
            color: color.to_string(),
            order: self.inner.state.borrow().columns.len() as i32,
        };
        input.validate().map_err(StoreError::Validation)?;

        let column = self
            .call("create_column", self.inner.remote.create_column(input))
            .await?;

        self.inner
            .state
            .send_modify(|state| state.columns.push(column.clone()));
        Ok(column)
    }

    pub async fn update_column(&self, column: Column) -> StoreResult<()> {
        let changes = ColumnChanges::from(&column);
        changes.validate().map_err(StoreError::Validation)?;

        self.call(
            "update_column",
            self.inner.remote.update_column(column.id, changes),
        )
        .await?;

        self.inner.state.send_modify(|state| {
            if let Some(slot) = state.columns.iter_mut().find(|c| c.id == column.id) {
                // order is not part of an update
                let order = slot.order;
                *slot = Column { order, ..column };
            }
        });
        Ok(())
    }

    /// Deletes a column. The backend removes its cards; the cache drops them
    /// on the next refresh.
    pub async fn delete_column(&self, id: Uuid) -> StoreResult<()> {
        self.call("delete_column", self.inner.remote.delete_column(id))
            .await?;

        self.inner
            .state
            .send_modify(|state| state.columns.retain(|c| c.id != id));
        Ok(())
    }

    /// Creates a card at the bottom of its column.
    pub async fn add_card(&self, draft: CardDraft) -> StoreResult<Card> {
        draft.validate().map_err(StoreError::Validation)?;

        let order = self.inner.state.borrow().active_count_in(draft.column_id) as i32;
        let input = draft.into_new_card(order);

        let card = self
            .call("create_card", self.inner.remote.create_card(input))
            .await?;

        self.inner
            .state
            .send_modify(|state| state.active_cards.push(card.clone()));
        Ok(card)
    }

    /// Writes the card's editable fields and mirrors the card in the cache.
    pub async fn update_card(&self, card: Card) -> StoreResult<()> {
        let changes = CardChanges::from(&card);
        changes.validate().map_err(StoreError::Validation)?;

        self.call("update_card", self.inner.remote.update_card(card.id, changes))
            .await?;

        self.inner.state.send_modify(|state| {
            if let Some(slot) = state.card_mut(card.id) {
                // archival state is owned by archive/restore
                let archived_at = slot.archived_at;
                *slot = Card { archived_at, ..card };
            }
        });
        Ok(())
    }

    pub async fn delete_card(&self, id: Uuid) -> StoreResult<()> {
        self.call("delete_card", self.inner.remote.delete_card(id))
            .await?;

        self.inner.state.send_modify(|state| {
            state.active_cards.retain(|c| c.id != id);
            state.archived_cards.retain(|c| c.id != id);
        });
        Ok(())
    }

    pub async fn move_card(&self, id: Uuid, column_id: Uuid) -> StoreResult<()> {
        self.call(
            "set_card_column",
            self.inner.remote.set_card_column(id, column_id),
        )
        .await?;

        self.inner.state.send_modify(|state| {
            if let Some(card) = state.active_cards.iter_mut().find(|c| c.id == id) {
                card.column_id = column_id;
            }
        });
        Ok(())
    }

    /// Archives an active card. Fails with `NotFound` when the card is not in
    /// the active collection.
    pub async fn archive_card(&self, id: Uuid) -> StoreResult<()> {
        if self.inner.state.borrow().active_card(id).is_none() {
            return Err(StoreError::NotFound(format!("active card {}", id)));
        }

        let now = Utc::now();
        self.call(
            "set_card_archived",
            self.inner.remote.set_card_archived(id, Some(now)),
        )
        .await?;

        self.inner.state.send_modify(|state| {
            if !state.archive(id, now) {
                tracing::debug!(%id, "Card left the active set while archiving");
            }
        });
        Ok(())
    }

    /// Restores an archived card. Fails with `NotFound` when the card is not
    /// in the archived collection.
    pub async fn restore_card(&self, id: Uuid) -> StoreResult<()> {
        if self.inner.state.borrow().archived_card(id).is_none() {
            return Err(StoreError::NotFound(format!("archived card {}", id)));
        }

        self.call(
            "set_card_archived",
            self.inner.remote.set_card_archived(id, None),
        )
        .await?;

        self.inner.state.send_modify(|state| {
            if !state.restore(id) {
                tracing::debug!(%id, "Card left the archived set while restoring");
            }
        });
        Ok(())
    }

    pub async fn comments(&self, card_id: Uuid) -> StoreResult<Vec<Comment>> {
        self.call("list_comments", self.inner.remote.list_comments(card_id))
            .await
    }

    pub async fn add_comment(&self, input: NewComment) -> StoreResult<Comment> {
        input.validate().map_err(StoreError::Validation)?;

        let comment = self
            .call("add_comment", self.inner.remote.add_comment(input))
            .await?;

        self.adjust_card(comment.card_id, |card| {
            card.comment_count = card.comment_count.saturating_add(1)
        });
        Ok(comment)
    }

    pub async fn attachments(&self, card_id: Uuid) -> StoreResult<Vec<Attachment>> {
        self.call(
            "list_attachments",
            self.inner.remote.list_attachments(card_id),
        )
        .await
    }

    pub async fn add_attachment(&self, input: NewAttachment) -> StoreResult<Attachment> {
        input.validate().map_err(StoreError::Validation)?;

        let attachment = self
            .call("add_attachment", self.inner.remote.add_attachment(input))
            .await?;

        self.adjust_card(attachment.card_id, |card| {
            card.attachment_count = card.attachment_count.saturating_add(1)
        });
        Ok(attachment)
    }

    pub async fn delete_attachment(&self, id: Uuid) -> StoreResult<()> {
        let card_id = self
            .call("delete_attachment", self.inner.remote.delete_attachment(id))
            .await?;

        self.adjust_card(card_id, |card| {
            card.attachment_count = (card.attachment_count - 1).max(0)
        });
        Ok(())
    }

    fn adjust_card(&self, card_id: Uuid, f: impl FnOnce(&mut Card)) {
        self.inner.state.send_if_modified(|state| match state.card_mut(card_id) {
            Some(card) => {
                f(card);
                true
            }
            None => false,
        });
    }
}
