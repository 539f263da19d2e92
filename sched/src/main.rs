use common::config::CONFIG;
use common::logging::setup_logging;
use common::persistence::database_url;
use sched::sweep::SoldSweepTask;
use sched::{ScheduledTask, Scheduler, hours};
use tracing::info;

#[tokio::main]
async fn main() {
    setup_logging("sched");
    info!("starting app");

    let persister = persister::connect(database_url())
        .await
        .expect("postgres not reachable");
    let cleanup = &CONFIG.cleanup;
    let sweep = Scheduler::run_task(
        ScheduledTask::Interval {
            task: Box::new(SoldSweepTask::new(persister, cleanup.retention_days)),
            interval: hours(cleanup.interval_hours.max(1)),
        },
        None,
    );

    info!(
        retention_days = cleanup.retention_days,
        interval_hours = cleanup.interval_hours,
        "app started"
    );
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl c event");
    sweep.abort();
    info!("exited");
}
