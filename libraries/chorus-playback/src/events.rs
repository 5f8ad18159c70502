//! Finish-notification routing
//!
//! The player collaborator pushes [`FinishNotification`]s into one channel.
//! The router fans them out to one worker task per session: notifications
//! for the same session are handled in emission order, while a slow
//! `player.start` in one session never holds up another.

use crate::advance::AdvanceController;
use crate::queue::SessionQueueStore;
use chorus_core::{FinishNotification, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Fans finish notifications out to per-session workers
pub struct FinishRouter {
    controller: AdvanceController,
    store: Arc<SessionQueueStore>,
    workers: HashMap<SessionId, mpsc::UnboundedSender<FinishNotification>>,
}

impl FinishRouter {
    /// Create a router; call [`FinishRouter::run`] or [`FinishRouter::spawn`]
    pub fn new(controller: AdvanceController, store: Arc<SessionQueueStore>) -> Self {
        Self {
            controller,
            store,
            workers: HashMap::new(),
        }
    }

    /// Run the router on its own task
    pub fn spawn(self, notifications: mpsc::Receiver<FinishNotification>) -> JoinHandle<()> {
        tokio::spawn(self.run(notifications))
    }

    /// Consume notifications until the sending side closes
    ///
    /// Pending per-session work still completes after the stream closes.
    pub async fn run(mut self, mut notifications: mpsc::Receiver<FinishNotification>) {
        while let Some(notification) = notifications.recv().await {
            self.dispatch(notification);
            self.prune();
        }

        info!("Finish notification stream closed");
    }

    fn dispatch(&mut self, notification: FinishNotification) {
        let session = notification.session;
        let controller = &self.controller;
        let worker = self
            .workers
            .entry(session)
            .or_insert_with(|| spawn_worker(controller.clone(), session));

        if let Err(mpsc::error::SendError(notification)) = worker.send(notification) {
            // Worker is gone; its queue was drained, so a fresh one keeps order
            let worker = spawn_worker(self.controller.clone(), session);
            if worker.send(notification).is_err() {
                warn!(session = %session, "Dropping finish notification");
            }
            self.workers.insert(session, worker);
        }
    }

    /// Drop workers of sessions that no longer have a queue entry
    ///
    /// Dropping the sender lets the worker finish what it holds and exit.
    fn prune(&mut self) {
        let store = &self.store;
        self.workers.retain(|session, _| store.exists(*session));
    }
}

fn spawn_worker(
    controller: AdvanceController,
    session: SessionId,
) -> mpsc::UnboundedSender<FinishNotification> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    debug!(session = %session, "Starting finish worker");

    tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            if let Err(e) = controller.on_track_finished(notification).await {
                warn!(session = %session, error = %e, "Failed to advance after track end");
            }
        }
        debug!(session = %session, "Finish worker stopped");
    });

    tx
}
