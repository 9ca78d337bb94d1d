//! Stop-signal transport and per-worker lifecycle handles.

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Writer half of a worker's stop signal. Owned by the `GroupSupervisor`;
/// sending is idempotent (re-sending `true` before the worker notices is
/// harmless), unlike a `oneshot::Sender` which is consumed on first use.
#[derive(Debug, Clone)]
pub struct StopSender(watch::Sender<bool>);

/// Reader half, held by the worker. `should_stop` never blocks.
#[derive(Debug, Clone)]
pub struct StopReceiver(watch::Receiver<bool>);

/// Creates a fresh stop channel, initially un-signaled.
pub fn stop_channel() -> (StopSender, StopReceiver) {
    let (tx, rx) = watch::channel(false);
    (StopSender(tx), StopReceiver(rx))
}

impl StopSender {
    /// Flips the signal to `true`. A send after the receiver is gone is
    /// simply ignored (the worker has already exited).
    pub fn signal(&self) {
        let _ = self.0.send(true);
    }

    /// `true` once [`StopSender::signal`] has been called, regardless of
    /// whether the worker has observed it yet.
    pub fn is_signaled(&self) -> bool {
        *self.0.borrow()
    }
}

impl StopReceiver {
    /// Non-blocking peek at the current signal state.
    pub fn should_stop(&self) -> bool {
        *self.0.borrow()
    }
}

/// One live worker: its task handle plus the supervisor-owned stop sender.
pub struct WorkerHandle {
    pub join: JoinHandle<()>,
    stop: StopSender,
}

impl WorkerHandle {
    pub fn new(join: JoinHandle<()>, stop: StopSender) -> Self {
        Self { join, stop }
    }

    pub fn signal_stop(&self) {
        self.stop.signal();
    }

    pub fn is_signaled(&self) -> bool {
        self.stop.is_signaled()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
