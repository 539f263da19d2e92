pub mod sweep;

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::debug;

pub type TaskOpts = HashMap<String, String>;

#[async_trait]
pub trait Task: Send + Sync {
    async fn run(&self, opts: Option<&TaskOpts>);

    fn descriptor(&self) -> &'static str;
}

pub enum ScheduledTask {
    /// Runs right away, then every `interval`.
    Interval {
        task: Box<dyn Task>,
        interval: Duration,
    },
    /// First run after one full `interval`.
    IntervalDeferred {
        task: Box<dyn Task>,
        interval: Duration,
    },
    /// Runs once at `when` (UTC), immediately if that already passed.
    Timed {
        task: Box<dyn Task>,
        when: chrono::NaiveDateTime,
    },
}

pub struct Scheduler;

impl Scheduler {
    /// Spawns `task` on the runtime. Aborting the handle stops all future runs.
    pub fn run_task(task: ScheduledTask, opts: Option<TaskOpts>) -> JoinHandle<()> {
        match task {
            ScheduledTask::Interval { task, interval } => {
                tokio::spawn(run_every(task, interval, false, opts))
            }
            ScheduledTask::IntervalDeferred { task, interval } => {
                tokio::spawn(run_every(task, interval, true, opts))
            }
            ScheduledTask::Timed { task, when } => tokio::spawn(run_at(task, when, opts)),
        }
    }
}

async fn run_every(
    task: Box<dyn Task>,
    interval: Duration,
    deferred: bool,
    opts: Option<TaskOpts>,
) {
    let mut ticker = tokio::time::interval(interval);
    // a slow run pushes the schedule back instead of triggering catch-up runs
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    if deferred {
        ticker.tick().await;
    }
    loop {
        ticker.tick().await;
        debug!(task = task.descriptor(), ?interval, "running scheduled task");
        task.run(opts.as_ref()).await;
    }
}

async fn run_at(task: Box<dyn Task>, when: chrono::NaiveDateTime, opts: Option<TaskOpts>) {
    let delay = (when - Utc::now().naive_utc())
        .to_std()
        .unwrap_or(Duration::ZERO);
    tokio::time::sleep(delay).await;
    debug!(task = task.descriptor(), %when, "running timed task");
    task.run(opts.as_ref()).await;
}

pub fn minutes(m: u64) -> Duration {
    Duration::from_secs(m * 60)
}

pub fn hours(h: u64) -> Duration {
    minutes(h * 60)
}

pub fn days(d: u64) -> Duration {
    hours(d * 24)
}

#[cfg(test)]
mod tests {
    use crate::{ScheduledTask, Scheduler, Task, TaskOpts, hours};
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::mpsc::{Receiver, Sender, channel};
    use tokio::time::{Duration, Instant};

    struct EchoTask {
        sender: Sender<Option<String>>,
    }

    #[async_trait]
    impl Task for EchoTask {
        async fn run(&self, opts: Option<&TaskOpts>) {
            let echoed = opts.and_then(|o| o.get("echo").cloned());
            let _ = self.sender.send(echoed).await;
        }

        fn descriptor(&self) -> &'static str {
            "echo"
        }
    }

    fn echo() -> (Box<dyn Task>, Receiver<Option<String>>) {
        let (sender, receiver) = channel(4);
        (Box::new(EchoTask { sender }), receiver)
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_runs_immediately_then_periodically() {
        let (task, mut rx) = echo();
        let start = Instant::now();
        let opts = TaskOpts::from([("echo".to_string(), "hi".to_string())]);
        let handle = Scheduler::run_task(
            ScheduledTask::Interval {
                task,
                interval: Duration::from_secs(3),
            },
            Some(opts),
        );

        assert_eq!(rx.recv().await, Some(Some("hi".to_string())));
        assert_eq!(start.elapsed(), Duration::ZERO);
        rx.recv().await;
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        rx.recv().await;
        assert_eq!(start.elapsed(), Duration::from_secs(6));
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_interval_waits_one_period() {
        let (task, mut rx) = echo();
        let start = Instant::now();
        let handle = Scheduler::run_task(
            ScheduledTask::IntervalDeferred {
                task,
                interval: hours(6),
            },
            None,
        );

        assert_eq!(rx.recv().await, Some(None));
        assert_eq!(start.elapsed(), hours(6));
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_task_runs_once() {
        let (task, mut rx) = echo();
        let start = Instant::now();
        let handle = Scheduler::run_task(
            ScheduledTask::Timed {
                task,
                when: Utc::now().naive_utc() + chrono::Duration::seconds(30),
            },
            None,
        );

        assert_eq!(rx.recv().await, Some(None));
        assert!(start.elapsed() > Duration::from_secs(29));
        handle.await.unwrap();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_timed_task_runs_right_away() {
        let (task, mut rx) = echo();
        let start = Instant::now();
        Scheduler::run_task(
            ScheduledTask::Timed {
                task,
                when: Utc::now().naive_utc() - chrono::Duration::hours(1),
            },
            None,
        );

        assert_eq!(rx.recv().await, Some(None));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
