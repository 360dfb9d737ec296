//! Per-notification display state machine.
//!
//! ```text
//! Visible --FadeElapsed--> Fading --Expired--> Removed
//!    \___________________Dismissed_______________/
//! ```

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPhase {
    Visible,
    Fading,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// First timer: the fade-out starts.
    FadeElapsed,
    /// Second timer: the fade-out finished.
    Expired,
    /// Manual close from the rendering layer.
    Dismissed,
}

pub fn transition(phase: NotificationPhase, event: LifecycleEvent) -> NotificationPhase {
    use LifecycleEvent::*;
    use NotificationPhase::*;

    match (phase, event) {
        (Removed, _) => Removed,
        (_, Dismissed) => Removed,
        (Visible, FadeElapsed) => Fading,
        (Fading, FadeElapsed) => Fading,
        (Visible | Fading, Expired) => Removed,
    }
}
