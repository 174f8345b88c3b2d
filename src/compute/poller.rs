//! Polling of long-running operations and resources with a status field

use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;
use tokio::time::{sleep, Instant};

use super::models::is_operation;
use super::traits::{ComputeResource, StatusSource};
use crate::config::Settings;

/// Which field to watch and which values end the wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSpec {
    pub status_field: &'static str,
    pub terminal: &'static [&'static str],
}

impl PollSpec {
    pub const OPERATION: PollSpec = PollSpec {
        status_field: "status",
        terminal: &["DONE"],
    };

    pub const DISK: PollSpec = PollSpec {
        status_field: "status",
        terminal: &["READY", "FAILED"],
    };

    pub const INSTANCE: PollSpec = PollSpec {
        status_field: "status",
        terminal: &["RUNNING", "TERMINATED"],
    };

    pub const SNAPSHOT: PollSpec = PollSpec {
        status_field: "status",
        terminal: &["READY", "FAILED"],
    };

    pub fn status<'v>(&self, value: &'v Value) -> Option<&'v str> {
        value.get(self.status_field).and_then(Value::as_str)
    }

    /// A value without the status field has nothing left to wait for
    pub fn is_terminal(&self, value: &Value) -> bool {
        match self.status(value) {
            Some(status) => self.terminal.contains(&status),
            None => true,
        }
    }
}

/// Waits for operations (or resources) to reach a terminal status
#[derive(Debug, Clone)]
pub struct OperationPoller {
    interval: Duration,
    max_wait: Duration,
}

impl OperationPoller {
    pub fn new(settings: &Settings) -> Self {
        Self::with_timing(settings.poll_interval, settings.max_wait)
    }

    pub fn with_timing(interval: Duration, max_wait: Duration) -> Self {
        Self { interval, max_wait }
    }

    /// Wait for an operation to finish
    ///
    /// Anything that is not an operation is returned as is, without polling.
    pub async fn wait_for_operation(&self, initial: Value, source: &dyn StatusSource) -> Value {
        if !is_operation(&initial) {
            debug!("Result is not an operation, nothing to wait for");
            return initial;
        }
        self.wait(initial, &PollSpec::OPERATION, source).await
    }

    /// Poll until `spec` reports a terminal status or the wait budget runs out
    ///
    /// The last known state is returned in every case. Timeouts and fetch
    /// failures are logged, never raised.
    pub async fn wait(&self, initial: Value, spec: &PollSpec, source: &dyn StatusSource) -> Value {
        let start = Instant::now();
        let mut current = initial;

        loop {
            if spec.is_terminal(&current) {
                break;
            }

            let elapsed = start.elapsed();
            if elapsed >= self.max_wait {
                warn!(
                    "Timed out after {}s waiting for '{}' (last {}: {})",
                    self.max_wait.as_secs(),
                    current.name().unwrap_or("<unnamed>"),
                    spec.status_field,
                    spec.status(&current).unwrap_or("<unknown>")
                );
                break;
            }

            let nap = self.interval.min(self.max_wait - elapsed);
            debug!(
                "'{}' is {}, checking again in {:?}",
                current.name().unwrap_or("<unnamed>"),
                spec.status(&current).unwrap_or("<unknown>"),
                nap
            );
            sleep(nap).await;

            match source.refresh(&current).await {
                Ok(next) => current = next,
                Err(e) => {
                    warn!(
                        "Failed to refresh '{}': {}",
                        current.name().unwrap_or("<unnamed>"),
                        e
                    );
                    break;
                }
            }
        }

        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ComputeError, Result};
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays a fixed sequence of states, repeating the last one
    struct ScriptedSource {
        states: Vec<Value>,
        calls: Mutex<usize>,
    }

    impl ScriptedSource {
        fn new(states: Vec<Value>) -> Self {
            Self {
                states,
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl StatusSource for ScriptedSource {
        fn refresh<'a>(&'a self, _current: &'a Value) -> BoxFuture<'a, Result<Value>> {
            let mut calls = self.calls.lock().unwrap();
            let state = self.states[(*calls).min(self.states.len() - 1)].clone();
            *calls += 1;
            async move { Ok(state) }.boxed()
        }
    }

    struct FailingSource;

    impl StatusSource for FailingSource {
        fn refresh<'a>(&'a self, _current: &'a Value) -> BoxFuture<'a, Result<Value>> {
            async { Err(ComputeError::Command("connection reset".to_string())) }.boxed()
        }
    }

    fn op(status: &str) -> Value {
        json!({"kind": "compute#operation", "name": "op-1", "status": status})
    }

    fn poller() -> OperationPoller {
        OperationPoller::with_timing(Duration::from_secs(1), Duration::from_secs(30))
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_operation_is_not_polled() {
        let source = ScriptedSource::new(vec![op("DONE")]);
        let disk = json!({"kind": "compute#disk", "name": "d1"});
        let result = poller().wait_for_operation(disk.clone(), &source).await;
        assert_eq!(result, disk);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_operation_is_not_polled() {
        let source = ScriptedSource::new(vec![op("DONE")]);
        let result = poller().wait_for_operation(op("DONE"), &source).await;
        assert_eq!(result["status"], "DONE");
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_running_done_takes_two_polls() {
        let source = ScriptedSource::new(vec![op("RUNNING"), op("DONE")]);
        let result = poller().wait_for_operation(op("PENDING"), &source).await;
        assert_eq!(result["status"], "DONE");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_last_state() {
        let source = ScriptedSource::new(vec![op("PENDING")]);
        let start = Instant::now();
        let result = poller().wait_for_operation(op("PENDING"), &source).await;
        assert_eq!(result["status"], "PENDING");
        assert_eq!(source.calls(), 30);
        assert!(start.elapsed() >= Duration::from_secs(30));
        assert!(start.elapsed() < Duration::from_secs(31));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_sleep_is_capped_by_remaining_budget() {
        let poller =
            OperationPoller::with_timing(Duration::from_secs(4), Duration::from_secs(10));
        let source = ScriptedSource::new(vec![op("RUNNING")]);
        let start = Instant::now();
        poller.wait_for_operation(op("PENDING"), &source).await;
        // sleeps of 4s, 4s, 2s
        assert_eq!(source.calls(), 3);
        assert!(start.elapsed() >= Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_failure_keeps_last_state() {
        let result = poller().wait_for_operation(op("RUNNING"), &FailingSource).await;
        assert_eq!(result["status"], "RUNNING");
    }

    #[tokio::test(start_paused = true)]
    async fn test_disk_spec_waits_for_ready() {
        let source = ScriptedSource::new(vec![
            json!({"name": "d1", "status": "CREATING"}),
            json!({"name": "d1", "status": "READY"}),
        ]);
        let result = poller()
            .wait(json!({"name": "d1", "status": "CREATING"}), &PollSpec::DISK, &source)
            .await;
        assert_eq!(result["status"], "READY");
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn test_missing_status_is_terminal() {
        assert!(PollSpec::DISK.is_terminal(&json!({"name": "d1"})));
        assert!(!PollSpec::DISK.is_terminal(&json!({"status": "CREATING"})));
        assert!(PollSpec::DISK.is_terminal(&json!({"status": "FAILED"})));
    }
}
