//! # Refresh Task
//!
//! A single coalesced reload loop replacing the storefront's blind
//! 1-second polling.
//!
//! ## Refresh Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Refresh Task Flow                                │
//! │                                                                         │
//! │             ┌────────────────────────────────────────────┐             │
//! │   interval  │                                            │             │
//! │   tick ────►│                                            │             │
//! │             │   store.reload().await   (run inline)      │             │
//! │   wake() ──►│                                            │             │
//! │             │                                            │             │
//! │   shutdown ►│   break                                    │             │
//! │             └────────────────────────────────────────────┘             │
//! │                                                                         │
//! │  Reloads run inside the task itself, so two reloads can never be in    │
//! │  flight at once: a slow fetch delays the next tick instead of racing   │
//! │  it. Queued wake signals are drained before reloading, so a burst of   │
//! │  focus events costs one reload.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `wake()` is the window-focus analog: callers trigger it whenever the
//! surrounding application regains attention and wants fresh data now
//! rather than at the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::store::Store;

/// Handle for controlling the refresh task.
#[derive(Clone)]
pub struct RefreshHandle {
    wake_tx: mpsc::Sender<()>,
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Requests an immediate reload (the window-focus analog). Multiple
    /// pending wakes coalesce into one reload.
    pub async fn wake(&self) {
        let _ = self.wake_tx.try_send(());
    }

    /// Stops the refresh loop.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// The refresh task. Create with [`RefreshTask::spawn`].
pub struct RefreshTask {
    store: Arc<Store>,
    interval: Duration,
    wake_rx: mpsc::Receiver<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl RefreshTask {
    /// Spawns the refresh loop for a store.
    pub fn spawn(store: Arc<Store>, interval: Duration) -> (RefreshHandle, JoinHandle<()>) {
        let (wake_tx, wake_rx) = mpsc::channel(4);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = RefreshTask {
            store,
            interval,
            wake_rx,
            shutdown_rx,
        };
        let handle = RefreshHandle {
            wake_tx,
            shutdown_tx,
        };
        (handle, tokio::spawn(task.run()))
    }

    async fn run(mut self) {
        info!(interval = ?self.interval, "Refresh task starting");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; the store just loaded, so skip it.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.reload_once().await;
                }

                Some(()) = self.wake_rx.recv() => {
                    // Drain queued wakes so a burst costs one reload.
                    while self.wake_rx.try_recv().is_ok() {}
                    self.reload_once().await;
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Refresh task shutting down");
                    break;
                }
            }
        }
    }

    async fn reload_once(&self) {
        match self.store.reload().await {
            Ok(true) => debug!("Reload picked up new data"),
            Ok(false) => {}
            Err(err) => warn!(error = %err, "Reload failed"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
