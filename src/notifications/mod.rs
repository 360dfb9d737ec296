//! Notification derivation and the timed display queue.

pub mod deriver;
pub mod lifecycle;
pub mod queue;

pub use deriver::{derive, NotificationIcon, NotificationRequest};
pub use lifecycle::{transition, LifecycleEvent, NotificationPhase};
pub use queue::{
    ActiveNotification, Notification, NotificationQueue, NotificationTimings, NotificationUpdate,
};
