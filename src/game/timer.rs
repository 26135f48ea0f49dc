//! Wall-clock access and the optional deadline watcher.
//!
//! The command loop compares elapsed time against the limit itself before and
//! after every command. The [`DeadlineWatcher`] only exists so a loop blocked
//! on stdin can notice the deadline without waiting for the next line.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Source of the current time. Injected so tests can move time forward.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(chrono::Duration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Whole seconds between `start` and `now`, clamped at zero.
pub fn elapsed_secs(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    elapsed_millis(start, now) / 1000
}

/// Milliseconds between `start` and `now`, clamped at zero.
pub fn elapsed_millis(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - start).num_milliseconds().max(0) as u64
}

/// `mm:ss` for status lines.
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Background one-shot that flips `expired` once the deadline passes.
///
/// The task reads nothing but the tokio clock and writes nothing but its own
/// flag. Dropping the watcher aborts the task.
pub struct DeadlineWatcher {
    expired: Arc<AtomicBool>,
    notify: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl DeadlineWatcher {
    /// Start watching. Must be called inside a tokio runtime.
    pub fn spawn(remaining: Duration) -> Self {
        let expired = Arc::new(AtomicBool::new(false));
        let notify = Arc::new(Notify::new());
        let task_flag = expired.clone();
        let task_notify = notify.clone();
        debug!("Deadline watcher armed for {}s", remaining.as_secs());
        let handle = tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            if !task_flag.swap(true, Ordering::SeqCst) {
                info!("Deadline watcher fired");
            }
            task_notify.notify_waiters();
            // notify_one stores a permit for a waiter that has not registered yet.
            task_notify.notify_one();
        });
        Self {
            expired,
            notify,
            handle,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    /// Resolves once the deadline has passed.
    pub async fn fired(&self) {
        if self.is_expired() {
            return;
        }
        self.notify.notified().await;
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for DeadlineWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
