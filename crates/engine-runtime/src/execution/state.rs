use std::fmt;
use tokio::sync::watch;
use tracing::info;

/// Lifecycle of one import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Running,
    /// The reader has delivered its whole range; the writer works through
    /// what is left in the channel.
    Draining,
    ShutdownRequested,
    Terminated,
}

impl ImportState {
    fn can_advance_to(self, next: ImportState) -> bool {
        use ImportState::*;
        matches!(
            (self, next),
            (Running, Draining)
                | (Running | Draining, ShutdownRequested)
                | (Running | Draining | ShutdownRequested, Terminated)
        )
    }
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportState::Running => "running",
            ImportState::Draining => "draining",
            ImportState::ShutdownRequested => "shutdown-requested",
            ImportState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Publishes [`ImportState`] transitions to any number of watchers.
#[derive(Debug)]
pub struct StateTracker {
    tx: watch::Sender<ImportState>,
}

impl StateTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ImportState::Running);
        Self { tx }
    }

    pub fn current(&self) -> ImportState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ImportState> {
        self.tx.subscribe()
    }

    /// Moves to `next` if the transition is allowed from the current state.
    /// Returns whether the state changed.
    pub fn advance(&self, next: ImportState) -> bool {
        let mut from = None;
        let changed = self.tx.send_if_modified(|state| {
            if state.can_advance_to(next) {
                from = Some(*state);
                *state = next;
                true
            } else {
                false
            }
        });
        if let Some(from) = from {
            info!(%from, to = %next, "Import state changed");
        }
        changed
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_path() {
        let tracker = StateTracker::new();
        assert!(tracker.advance(ImportState::Draining));
        assert!(tracker.advance(ImportState::Terminated));
        assert_eq!(tracker.current(), ImportState::Terminated);
    }

    #[test]
    fn interrupt_after_draining() {
        let tracker = StateTracker::new();
        tracker.advance(ImportState::Draining);
        assert!(tracker.advance(ImportState::ShutdownRequested));
        assert!(!tracker.advance(ImportState::Draining));
        assert_eq!(tracker.current(), ImportState::ShutdownRequested);
    }

    #[test]
    fn terminated_is_final() {
        let tracker = StateTracker::new();
        tracker.advance(ImportState::Terminated);
        assert!(!tracker.advance(ImportState::ShutdownRequested));
        assert!(!tracker.advance(ImportState::Terminated));
    }

    #[tokio::test]
    async fn watchers_see_transitions() {
        let tracker = StateTracker::new();
        let mut rx = tracker.subscribe();
        tracker.advance(ImportState::ShutdownRequested);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), ImportState::ShutdownRequested);
    }
}
