use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::BoardStore;

/// Owns the background refresh loop of a [`BoardStore`].
///
/// Dropping the handle tears the loop down just like [`SyncHandle::shutdown`],
/// without waiting for it.
pub struct SyncHandle {
    store: BoardStore,
    trigger: Arc<Notify>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    pub(crate) fn spawn(store: BoardStore, interval: Duration) -> Self {
        let trigger = Arc::new(Notify::new());
        let (shutdown, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(run(store.clone(), interval, trigger.clone(), shutdown_rx));

        Self {
            store,
            trigger,
            shutdown,
            task: Some(task),
        }
    }

    /// Push-style change notification: schedules one refresh that starts
    /// after any refresh already in flight. Notifications that arrive before
    /// the loop picks one up collapse into a single refresh.
    pub fn notify(&self) {
        self.trigger.notify_one();
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the loop and waits for an in-flight refresh to finish. Its result
    /// is discarded.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Board sync task ended abnormally: {}", e);
            }
        }
    }

    fn stop(&self) {
        self.store.close();
        // the loop may already be gone
        let _ = self.shutdown.send(true);
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    store: BoardStore,
    interval: Duration,
    trigger: Arc<Notify>,
    mut shutdown: watch::Receiver<bool>,
) {
    // the initial refresh already happened, so the first tick is one interval out
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::debug!("Board sync loop started, interval {:?}", interval);

    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {
                if store.try_refresh().await.is_none() {
                    tracing::debug!("Refresh already in flight, skipping tick");
                }
            }
            _ = trigger.notified() => {
                // an in-flight refresh may have read the board before the
                // change, so wait for it and read again
                let _ = store.refresh().await;
            }
        }
    }

    tracing::debug!("Board sync loop stopped");
}
