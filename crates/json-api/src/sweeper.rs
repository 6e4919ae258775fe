//! Background discount deactivation sweeper.
//!
//! One task per process. It sweeps on a fixed interval, whenever a discount
//! list read nudges it through the shared [`Notify`], and stops when the
//! server shuts down.

use std::{sync::Arc, time::Duration};

use jiff::Timestamp;
use storefront_app::domain::discounts::DiscountSweeper;
use tokio::{
    sync::{Notify, watch},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::observability;

/// Running sweeper task.
#[derive(Debug)]
pub(crate) struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Start sweeping every `interval`, plus once per `trigger` notification.
    ///
    /// The first sweep runs immediately.
    pub(crate) fn spawn(
        sweeper: Arc<dyn DiscountSweeper>,
        trigger: Arc<Notify>,
        interval: Duration,
    ) -> Self {
        let (shutdown, stopped) = watch::channel(false);

        let task = tokio::spawn(run(sweeper, trigger, interval, stopped));

        Self { shutdown, task }
    }

    /// Signal the task to stop and wait for any in-progress sweep to finish.
    pub(crate) async fn stop(self) {
        if self.shutdown.send(true).is_err() {
            debug!("discount sweeper already stopped");
        }

        if let Err(source) = self.task.await {
            error!("discount sweeper task failed: {source}");
        }
    }
}

async fn run(
    sweeper: Arc<dyn DiscountSweeper>,
    trigger: Arc<Notify>,
    interval: Duration,
    mut stopped: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(interval);

    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval_seconds = interval.as_secs(), "discount sweeper started");

    loop {
        tokio::select! {
            changed = stopped.changed() => {
                if changed.is_err() || *stopped.borrow() {
                    break;
                }

                continue;
            }
            _ = ticker.tick() => {}
            () = trigger.notified() => {}
        }

        sweep(sweeper.as_ref()).await;
    }

    info!("discount sweeper stopped");
}

#[tracing::instrument(name = "discounts.sweeper.run", skip_all)]
async fn sweep(sweeper: &dyn DiscountSweeper) {
    match sweeper.sweep_once(Timestamp::now()).await {
        Ok(report) => {
            observability::observe_sweep(&report);

            if report.deactivated > 0 || report.failed > 0 {
                info!(
                    examined = report.examined,
                    deactivated = report.deactivated,
                    failed = report.failed,
                    "discount sweep finished"
                );
            } else {
                debug!(examined = report.examined, "discount sweep found nothing to do");
            }
        }
        Err(source) => {
            observability::observe_sweep_error();

            error!("discount sweep failed: {source}");
        }
    }
}
