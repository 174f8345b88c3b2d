//! Concurrent execution of independent requests

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use log::debug;
use serde_json::Value;

use super::models::{is_operation, BatchOutcome};
use super::poller::OperationPoller;
use super::traits::StatusSource;
use crate::config::Settings;
use crate::error::Result;

/// A request ready to be sent
pub type PendingRequest<'r> = BoxFuture<'r, Result<Value>>;

/// Runs a batch of requests through a bounded worker pool
///
/// No request's failure cancels another. With a poller attached, each
/// successful result that is an operation is waited on before it is stored.
pub struct BatchExecutor<'a> {
    max_concurrency: usize,
    poller: Option<(&'a OperationPoller, &'a dyn StatusSource)>,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(settings: &Settings) -> Self {
        Self::with_concurrency(settings.max_concurrency)
    }

    pub fn with_concurrency(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            poller: None,
        }
    }

    /// Wait for returned operations through `source`
    pub fn with_poller(mut self, poller: &'a OperationPoller, source: &'a dyn StatusSource) -> Self {
        self.poller = Some((poller, source));
        self
    }

    /// Run every request and split successes from failures
    ///
    /// Successes are returned in submission order, failures in the order
    /// they completed.
    pub async fn execute(&self, requests: Vec<PendingRequest<'_>>) -> BatchOutcome<Value> {
        let total = requests.len();
        debug!(
            "Executing {} request(s), up to {} at a time",
            total, self.max_concurrency
        );

        let completed: Vec<(usize, Result<Value>)> = stream::iter(requests.into_iter().enumerate())
            .map(|(index, request)| async move {
                let result = match request.await {
                    Ok(value) => Ok(self.settle(value).await),
                    Err(e) => Err(e),
                };
                (index, result)
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let mut successes = Vec::with_capacity(total);
        let mut outcome = BatchOutcome::default();
        for (index, result) in completed {
            match result {
                Ok(value) => successes.push((index, value)),
                Err(e) => {
                    debug!("Request {} failed: {}", index, e);
                    outcome.exceptions.push(e);
                }
            }
        }

        successes.sort_by_key(|(index, _)| *index);
        outcome.results = successes.into_iter().map(|(_, value)| value).collect();

        debug!(
            "Batch finished: {} succeeded, {} failed",
            outcome.results.len(),
            outcome.exceptions.len()
        );
        outcome
    }

    async fn settle(&self, value: Value) -> Value {
        match self.poller {
            Some((poller, source)) if is_operation(&value) => {
                poller.wait_for_operation(value, source).await
            }
            _ => value,
        }
    }
}
