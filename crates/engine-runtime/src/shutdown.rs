use crate::execution::state::{ImportState, StateTracker};
use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::{signal, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Turns one external interrupt into a closed cancellation gate.
#[derive(Clone)]
pub struct InterruptListener {
    cancel_token: CancellationToken,
    state: Arc<StateTracker>,
    interrupted: Arc<AtomicBool>,
}

impl InterruptListener {
    pub fn new(cancel_token: CancellationToken, state: Arc<StateTracker>) -> Self {
        Self {
            cancel_token,
            state,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawns the listener task. It exits after the first `interrupt`, or
    /// without effect once the gate is closed for another reason.
    pub fn arm<F>(&self, interrupt: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = listener.cancel_token.cancelled() => {}
                _ = interrupt => listener.trigger(),
            }
        })
    }

    fn trigger(&self) {
        if self.interrupted.swap(true, Ordering::SeqCst) {
            return;
        }
        self.state.advance(ImportState::ShutdownRequested);
        self.cancel_token.cancel();
        info!("Shutdown signal broadcasted to both stages");
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

/// Resolves on SIGINT (Ctrl+C) or, on unix, SIGTERM. A handler that cannot
/// be installed is logged and never fires.
pub async fn os_interrupt() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT (Ctrl+C), initiating graceful shutdown"),
            Err(e) => {
                error!(error = %e, "Failed to install SIGINT handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown");
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn interrupt_closes_the_gate_once() {
        let cancel = CancellationToken::new();
        let state = Arc::new(StateTracker::new());
        let listener = InterruptListener::new(cancel.clone(), state.clone());

        let (tx, rx) = oneshot::channel::<()>();
        let handle = listener.arm(async move {
            let _ = rx.await;
        });
        assert!(!cancel.is_cancelled());

        tx.send(()).unwrap();
        handle.await.unwrap();

        assert!(cancel.is_cancelled());
        assert!(listener.is_interrupted());
        assert_eq!(state.current(), ImportState::ShutdownRequested);

        // A second trigger is a no-op.
        listener.trigger();
        cancel.cancel();
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn listener_exits_when_gate_closes_elsewhere() {
        let cancel = CancellationToken::new();
        let state = Arc::new(StateTracker::new());
        let listener = InterruptListener::new(cancel.clone(), state.clone());

        let handle = listener.arm(std::future::pending());
        cancel.cancel();
        handle.await.unwrap();

        assert!(!listener.is_interrupted());
        assert_eq!(state.current(), ImportState::Running);
    }

    #[tokio::test]
    async fn many_waiters_observe_one_close() {
        let cancel = CancellationToken::new();
        let waiters: Vec<_> = (0..16)
            .map(|_| {
                let token = cancel.clone();
                tokio::spawn(async move { token.cancelled().await })
            })
            .collect();

        cancel.cancel();
        cancel.cancel();
        for waiter in waiters {
            waiter.await.unwrap();
        }
    }
}
