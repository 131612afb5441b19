//! Run cancellation
//!
//! A `CancelTrigger` is fired once (on Ctrl-C); every clone of the paired
//! `CancelSignal` observes it. An in-flight encoder is killed when its signal
//! fires.

use tokio::sync::watch;

/// Fires the cancellation
#[derive(Debug)]
pub struct CancelTrigger {
    tx: watch::Sender<bool>,
}

/// Observes the cancellation
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

/// Create a connected trigger/signal pair
pub fn cancel_pair() -> (CancelTrigger, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelTrigger { tx }, CancelSignal { rx })
}

impl CancelTrigger {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelSignal {
    /// A signal that never fires
    #[cfg(test)]
    pub fn never() -> Self {
        let (trigger, signal) = cancel_pair();
        // Dropping the trigger leaves the value at `false` forever
        drop(trigger);
        signal
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the run has been cancelled
    ///
    /// Pends forever if the trigger is dropped without firing.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Fire `trigger` when the process receives Ctrl-C
pub fn cancel_on_ctrl_c(trigger: CancelTrigger) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::warn!("interrupted, stopping after killing the running encoder");
                trigger.cancel();
            }
            Err(e) => log::error!("failed to listen for Ctrl-C error={}", e),
        }
    });
}
