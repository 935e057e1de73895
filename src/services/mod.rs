use log::debug;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub mod loader;
pub mod session;

pub use loader::CategoryLoader;
pub use session::FeedSession;

/// A job re-run on a fixed period until cancelled or dropped.
///
/// Firings never overlap: the next one waits for the previous job to finish,
/// and late firings are delayed rather than bunched.
#[derive(Debug)]
pub struct PeriodicTask {
    name: String,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// First firing one `period` after the call.
    pub fn spawn<F, Fut>(name: impl Into<String>, period: Duration, job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_at(name.into(), Instant::now() + period, period, job)
    }

    /// First firing right away, then every `period`.
    pub fn spawn_now<F, Fut>(name: impl Into<String>, period: Duration, job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_at(name.into(), Instant::now(), period, job)
    }

    fn spawn_at<F, Fut>(name: String, start: Instant, period: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        // interval panics on a zero period
        let period = period.max(Duration::from_millis(1));
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("Running periodic task '{}'", task_name);
                job().await;
            }
        });
        debug!("Scheduled periodic task '{}' every {}ms", name, period.as_millis());
        Self { name, handle }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops future firings. A firing in progress is dropped at its next
    /// await point.
    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            debug!("Cancelling periodic task '{}'", self.name);
        }
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
