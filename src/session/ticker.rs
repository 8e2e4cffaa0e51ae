use super::SessionManager;
use std::sync::Arc;
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Handle on the periodic revalidation loop. Dropping it stops the loop; ticks
/// already in flight run to completion and are reconciled by the manager.
#[derive(Debug)]
pub struct RevalidationTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RevalidationTask {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancels the loop and waits for it to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Err(err) = (&mut self.handle).await {
            debug!("revalidation loop ended abnormally: {}", err);
        }
    }
}

impl Drop for RevalidationTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl SessionManager {
    /// Revalidates immediately, then on every tick interval until the returned
    /// handle is cancelled or dropped. Each tick runs as its own task so a slow
    /// backend never delays the cadence.
    #[must_use]
    pub fn start(self: &Arc<Self>) -> RevalidationTask {
        let manager = Arc::clone(self);
        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        let period = self.tick_interval;

        info!("revalidating session every {} seconds", period.as_secs());

        let handle = tokio::spawn(async move {
            let mut ticks = interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = stop.cancelled() => {
                        debug!("revalidation loop cancelled");
                        break;
                    }
                    _ = ticks.tick() => {
                        let manager = Arc::clone(&manager);
                        tokio::spawn(async move {
                            let outcome = manager.revalidate().await;
                            debug!(?outcome, "revalidation tick");
                        });
                    }
                }
            }
        });

        RevalidationTask { cancel, handle }
    }
}
