//! Periodic background tasks
//!
//! Both tasks read from the store and never write to it. A failed run is
//! logged and the next tick tries again.

use std::{path::PathBuf, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use super::{export::ExportService, overdue::OverdueService};

/// How many overdue loans a monitor run names in the log
const OVERDUE_LOG_LIMIT: usize = 5;

/// Re-evaluate overdue loans every `period` and log them
pub fn spawn_overdue_monitor(overdue: OverdueService, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match overdue.overdue_today().await {
                Ok(loans) if loans.is_empty() => tracing::debug!("No overdue loans"),
                Ok(loans) => {
                    tracing::warn!("{} loan(s) overdue", loans.len());
                    for item in loans.iter().take(OVERDUE_LOG_LIMIT) {
                        tracing::warn!(
                            "  loan {}: '{}' held by {} is {} day(s) overdue",
                            item.loan.id,
                            item.loan.title.as_deref().unwrap_or("unknown book"),
                            item.loan.student_name.as_deref().unwrap_or("unknown student"),
                            item.overdue_days
                        );
                    }
                }
                Err(e) => tracing::error!("Overdue check failed: {}", e),
            }
        }
    })
}

/// Write a CSV snapshot of every table into `directory` every `period`
pub fn spawn_snapshot_export(export: ExportService, directory: PathBuf, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            match export.snapshot_to_dir(&directory).await {
                Ok(written) => {
                    let rows: usize = written.iter().map(|(_, count)| count).sum();
                    tracing::info!(
                        "Snapshot export wrote {} table(s), {} row(s) to {}",
                        written.len(),
                        rows,
                        directory.display()
                    );
                }
                Err(e) => tracing::error!("Snapshot export failed: {}", e),
            }
        }
    })
}
