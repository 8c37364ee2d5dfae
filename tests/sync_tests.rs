mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{assert_partitioned, controlled_store, ControlledStore};
use kanban_sync::models::{CardDraft, NewCard, NewColumn};
use kanban_sync::{BoardState, BoardStore, RemoteStore, SyncConfig, SyncHandle};

const HOUR: Duration = Duration::from_secs(3600);

fn config(interval: Duration) -> SyncConfig {
    SyncConfig {
        interval,
        remote_timeout: Duration::from_secs(5),
    }
}

async fn open(remote: &Arc<ControlledStore>, interval: Duration) -> (BoardStore, SyncHandle) {
    BoardStore::open(remote.clone(), config(interval)).await
}

fn new_column(name: &str, order: i32) -> NewColumn {
    NewColumn {
        name: name.to_string(),
        color: "#0ea5e9".to_string(),
        order,
    }
}

/// Waits until the store's snapshot satisfies `pred`.
async fn wait_until(store: &BoardStore, pred: impl Fn(&BoardState) -> bool) -> BoardState {
    let mut changes = store.subscribe();
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            {
                let state = changes.borrow_and_update();
                if pred(&*state) {
                    return state.clone();
                }
            }
            changes.changed().await.expect("board store dropped");
        }
    })
    .await
    .expect("condition not reached in time")
}

#[tokio::test]
async fn test_open_performs_initial_refresh() {
    let remote = controlled_store().await;
    let column = remote.inner.create_column(new_column("To Do", 0)).await.unwrap();

    let (store, handle) = open(&remote, HOUR).await;

    let state = store.snapshot();
    assert!(!state.loading);
    assert_eq!(state.columns, vec![column]);
    assert!(handle.is_running());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_open_against_failing_backend_recovers_on_next_tick() {
    let remote = controlled_store().await;
    remote.inner.create_column(new_column("To Do", 0)).await.unwrap();
    remote.set_failing(true);

    let (store, handle) = open(&remote, Duration::from_millis(50)).await;
    let state = store.snapshot();
    assert!(!state.loading);
    assert!(state.columns.is_empty());
    assert!(state.last_error.is_some());

    remote.set_failing(false);
    let state = wait_until(&store, |s| s.columns.len() == 1).await;
    assert!(state.last_error.is_none());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_scheduled_ticks_pick_up_remote_changes() {
    let remote = controlled_store().await;
    let column = remote.inner.create_column(new_column("To Do", 0)).await.unwrap();
    let (store, handle) = open(&remote, Duration::from_millis(50)).await;

    // another client adds a card directly at the backend
    let card = remote
        .inner
        .create_card(NewCard {
            column_id: column.id,
            title: "From elsewhere".to_string(),
            description: None,
            labels: vec![],
            due_date: None,
            order: 0,
            attachment_count: 0,
            comment_count: 0,
        })
        .await
        .unwrap();

    wait_until(&store, |s| s.active_card(card.id).is_some()).await;
    handle.shutdown().await;
}

#[tokio::test]
async fn test_notify_triggers_refresh() {
    let remote = controlled_store().await;
    let (store, handle) = open(&remote, HOUR).await;
    assert!(store.snapshot().columns.is_empty());

    remote.inner.create_column(new_column("Pushed", 0)).await.unwrap();
    handle.notify();

    wait_until(&store, |s| s.columns.len() == 1).await;
    handle.shutdown().await;
}

#[tokio::test]
async fn test_overlapping_notifications_collapse_into_one_refresh() {
    let remote = controlled_store().await;
    let (_store, handle) = open(&remote, HOUR).await;
    assert_eq!(remote.list_cards_calls(), 1);

    let gate = remote.install_gate();
    handle.notify();
    gate.entered.notified().await;
    assert_eq!(remote.list_cards_calls(), 2);

    for _ in 0..5 {
        handle.notify();
    }
    gate.release();

    // the collapsed notification runs exactly one more refresh
    gate.entered.notified().await;
    remote.remove_gate();
    gate.release();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(remote.list_cards_calls(), 3);
    handle.shutdown().await;
}

#[tokio::test]
async fn test_notification_during_explicit_refresh_runs_after_it() {
    let remote = controlled_store().await;
    let (store, handle) = open(&remote, HOUR).await;
    assert_eq!(remote.list_cards_calls(), 1);

    let gate = remote.install_gate();
    let explicit = {
        let store = store.clone();
        tokio::spawn(async move { store.refresh().await })
    };
    gate.entered.notified().await;

    // pushed after the in-flight refresh read the cards
    remote.inner.create_column(new_column("Pushed", 0)).await.unwrap();
    handle.notify();
    tokio::time::sleep(Duration::from_millis(20)).await;

    remote.remove_gate();
    gate.release();
    explicit.await.unwrap().unwrap();

    wait_until(&store, |s| s.columns.len() == 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(remote.list_cards_calls(), 3);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_ticks_skip_while_refresh_in_flight() {
    let remote = controlled_store().await;
    let (store, handle) = open(&remote, Duration::from_millis(20)).await;

    let gate = remote.install_gate();
    let explicit = {
        let store = store.clone();
        tokio::spawn(async move { store.refresh().await })
    };
    gate.entered.notified().await;
    let calls = remote.list_cards_calls();

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(remote.list_cards_calls(), calls, "a tick ran alongside a refresh");

    remote.remove_gate();
    gate.release();
    explicit.await.unwrap().unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(remote.list_cards_calls() > calls);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_discards_in_flight_refresh() {
    let remote = controlled_store().await;
    let (store, handle) = open(&remote, HOUR).await;

    remote.inner.create_column(new_column("Too late", 0)).await.unwrap();
    let gate = remote.install_gate();
    handle.notify();
    gate.entered.notified().await;

    let shutdown = tokio::spawn(handle.shutdown());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(store.is_closed());

    remote.remove_gate();
    gate.release();
    shutdown.await.unwrap();

    assert!(store.snapshot().columns.is_empty());
}

#[tokio::test]
async fn test_dropping_handle_tears_down_store() {
    let remote = controlled_store().await;
    let (store, handle) = open(&remote, Duration::from_millis(20)).await;

    drop(handle);
    assert!(store.is_closed());

    remote.inner.create_column(new_column("Ignored", 0)).await.unwrap();
    store.refresh().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(store.snapshot().columns.is_empty());
}

#[tokio::test]
async fn test_refresh_finishing_after_move_wins_until_next_refresh() {
    let remote = controlled_store().await;
    let (store, handle) = open(&remote, HOUR).await;
    let todo = store.add_column("To Do", "#22c55e").await.unwrap();
    let done = store.add_column("Done", "#a855f7").await.unwrap();
    let card = store.add_card(CardDraft::new(todo.id, "Race")).await.unwrap();

    // a tick reads the board before the move lands
    let gate = remote.install_gate();
    handle.notify();
    gate.entered.notified().await;

    store.move_card(card.id, done.id).await.unwrap();
    let moved = store.snapshot();
    assert_partitioned(&moved);
    assert_eq!(moved.active_card(card.id).unwrap().column_id, done.id);

    // the stale tick resolves last and overwrites the optimistic move
    remote.remove_gate();
    gate.release();
    let stale = wait_until(&store, |s| {
        s.active_card(card.id).map(|c| c.column_id) == Some(todo.id)
    })
    .await;
    assert_partitioned(&stale);

    // the next refresh observes the persisted move
    store.refresh().await.unwrap();
    let settled = store.snapshot();
    assert_partitioned(&settled);
    assert_eq!(settled.active_card(card.id).unwrap().column_id, done.id);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_move_finishing_after_refresh_wins() {
    let remote = controlled_store().await;
    let (store, handle) = open(&remote, HOUR).await;
    let todo = store.add_column("To Do", "#22c55e").await.unwrap();
    let done = store.add_column("Done", "#a855f7").await.unwrap();
    let card = store.add_card(CardDraft::new(todo.id, "Race")).await.unwrap();
    let (card_id, done_id) = (card.id, done.id);

    remote.set_write_delay(Some(Duration::from_millis(200)));
    let mover = {
        let store = store.clone();
        tokio::spawn(async move { store.move_card(card_id, done_id).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    store.refresh().await.unwrap();
    assert_eq!(store.snapshot().active_card(card.id).unwrap().column_id, todo.id);

    mover.await.unwrap().unwrap();
    let state = store.snapshot();
    assert_partitioned(&state);
    assert_eq!(state.active_card(card.id).unwrap().column_id, done.id);

    handle.shutdown().await;
}
