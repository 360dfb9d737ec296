//! Active notification queue with timer-driven expiry.
//!
//! Each pushed notification owns one tokio timer task: it moves the entry to
//! `Fading`, then removes it once the fade delay has run from that point.
//! Timers run independently of any render loop and are aborted when the
//! notification is dismissed early.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tokio::task::AbortHandle;

use super::deriver::{NotificationIcon, NotificationRequest};
use super::lifecycle::{transition, LifecycleEvent, NotificationPhase};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTimings {
    /// Time from creation until the fade-out begins.
    pub fade_after: Duration,
    /// Time from the start of the fade-out until removal.
    pub remove_after_fade: Duration,
}

impl Default for NotificationTimings {
    fn default() -> Self {
        Self {
            fade_after: Duration::from_millis(4000),
            remove_after_fade: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub icon: NotificationIcon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveNotification {
    pub notification: Notification,
    pub phase: NotificationPhase,
}

/// Pushed to subscribers whenever the queue changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationUpdate {
    Shown(Notification),
    Fading { id: String },
    Removed { id: String },
}

struct Entry {
    notification: Notification,
    phase: NotificationPhase,
    timer: AbortHandle,
}

#[derive(Clone)]
pub struct NotificationQueue {
    entries: Arc<Mutex<Vec<Entry>>>,
    timings: NotificationTimings,
    updates: broadcast::Sender<NotificationUpdate>,
}

impl NotificationQueue {
    pub fn new(timings: NotificationTimings) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            timings,
            updates,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationUpdate> {
        self.updates.subscribe()
    }

    /// Create a visible notification and schedule its expiry.
    /// Must be called from within a tokio runtime.
    pub async fn push(&self, request: NotificationRequest) -> String {
        let notification = Notification {
            id: uuid::Uuid::new_v4().to_string(),
            message: request.message,
            icon: request.icon,
        };
        let id = notification.id.clone();

        let mut entries = self.entries.lock().await;
        let timer = self.schedule(id.clone());
        entries.push(Entry {
            notification: notification.clone(),
            phase: NotificationPhase::Visible,
            timer,
        });
        drop(entries);

        tracing::debug!("[Notify] Shown {}: {}", id, notification.message);
        let _ = self.updates.send(NotificationUpdate::Shown(notification));
        id
    }

    /// Close a notification now and cancel its pending timers.
    /// Returns `false` if the id is not active.
    pub async fn dismiss(&self, id: &str) -> bool {
        self.apply(id, LifecycleEvent::Dismissed).await
    }

    /// Snapshot of live notifications in creation order.
    pub async fn active(&self) -> Vec<ActiveNotification> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|entry| ActiveNotification {
                notification: entry.notification.clone(),
                phase: entry.phase,
            })
            .collect()
    }

    /// The removal delay starts when the fade is applied, not at creation.
    fn schedule(&self, id: String) -> AbortHandle {
        let queue = self.clone();
        let timings = self.timings;
        tokio::spawn(async move {
            tokio::time::sleep(timings.fade_after).await;
            if !queue.apply(&id, LifecycleEvent::FadeElapsed).await {
                return;
            }
            tokio::time::sleep(timings.remove_after_fade).await;
            queue.apply(&id, LifecycleEvent::Expired).await;
        })
        .abort_handle()
    }

    async fn apply(&self, id: &str, event: LifecycleEvent) -> bool {
        let mut entries = self.entries.lock().await;
        let Some(index) = entries.iter().position(|e| e.notification.id == id) else {
            return false;
        };

        let next = transition(entries[index].phase, event);
        if next == entries[index].phase {
            return false;
        }

        match next {
            NotificationPhase::Removed => {
                let entry = entries.remove(index);
                drop(entries);
                if event == LifecycleEvent::Dismissed {
                    entry.timer.abort();
                }
                tracing::debug!("[Notify] Removed {} ({:?})", id, event);
                let _ = self.updates.send(NotificationUpdate::Removed { id: id.to_string() });
            }
            NotificationPhase::Fading => {
                entries[index].phase = next;
                drop(entries);
                let _ = self.updates.send(NotificationUpdate::Fading { id: id.to_string() });
            }
            NotificationPhase::Visible => {}
        }
        true
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(NotificationTimings::default())
    }
}
