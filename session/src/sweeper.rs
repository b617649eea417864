use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::MatchService;

/// Running background sweep. Dropping the handle also stops the task.
pub struct SweeperHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stops the sweep and waits for the task to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(err) = self.task.await {
            log::error!("Timeout sweeper task failed: {}", err);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns the periodic timeout sweep on the current tokio runtime.
///
/// Each tick finalizes timed-out matches and then purges expired finished
/// ones. Missed ticks are skipped rather than bunched up.
pub fn spawn_sweeper(service: Arc<MatchService>) -> SweeperHandle {
    let period = service.config().sweep_interval();
    let (shutdown, mut stop) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // first tick completes immediately
        ticker.tick().await;
        log::info!("Timeout sweeper running every {:?}", period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let timed_out = service.sweep_timeouts();
                    let purged = service.purge_finished();
                    if timed_out > 0 || purged > 0 {
                        log::debug!("Sweep finished {} matches, purged {}", timed_out, purged);
                    }
                }
                _ = &mut stop => break,
            }
        }
        log::info!("Timeout sweeper stopped");
    });

    SweeperHandle { shutdown, task }
}
