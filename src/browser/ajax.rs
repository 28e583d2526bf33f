// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scripted requests issued on behalf of a page

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::bookmarks::SubmissionOutcome;
use crate::error::{Error, Result};
use crate::http::{Request, Response};
use crate::network::{EventType, NetworkInterceptor};

/// Outcomes kept for `wait_for_idle` when nobody collects them
const MAX_COMPLETED: usize = 64;

/// How often `wait_for_idle` checks running submissions
const IDLE_POLL: Duration = Duration::from_millis(10);

#[derive(Default)]
struct Submissions {
    running: Vec<JoinHandle<SubmissionOutcome>>,
    completed: VecDeque<SubmissionOutcome>,
}

impl Submissions {
    /// Move finished tasks' outcomes into the completed buffer
    fn reap(&mut self) {
        let mut still_running = Vec::with_capacity(self.running.len());
        for mut handle in self.running.drain(..) {
            if !handle.is_finished() {
                still_running.push(handle);
                continue;
            }
            // A finished handle is ready; `None` only if the poll was not
            // allowed to run, so keep it for the next pass
            match (&mut handle).now_or_never() {
                Some(Ok(outcome)) => {
                    if self.completed.len() == MAX_COMPLETED {
                        self.completed.pop_front();
                        tracing::debug!("Dropping oldest uncollected submission outcome");
                    }
                    self.completed.push_back(outcome);
                }
                Some(Err(e)) => tracing::error!(error = %e, "Submission task did not complete"),
                None => still_running.push(handle),
            }
        }
        self.running = still_running;
    }
}

/// The page's AJAX utility.
///
/// Requests go through the page's interceptor chain. Background
/// submissions are tracked so callers can wait for them; finished ones are
/// collected on every spawn, keeping at most the latest outcomes.
#[derive(Clone)]
pub struct Ajax {
    network: NetworkInterceptor,
    submissions: Arc<Mutex<Submissions>>,
}

impl Ajax {
    pub fn new(network: NetworkInterceptor) -> Self {
        Self {
            network,
            submissions: Arc::new(Mutex::new(Submissions::default())),
        }
    }

    /// Send a request through the interceptor chain
    pub async fn send(&self, request: Request) -> Result<Response> {
        self.network.execute(request, EventType::Xhr).await
    }

    /// Run a submission in the background on the current tokio runtime
    pub(crate) fn spawn<F>(&self, task: F) -> Result<()>
    where
        F: Future<Output = SubmissionOutcome> + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Runtime(e.to_string()))?;
        let mut submissions = self.submissions.lock();
        submissions.reap();
        submissions.running.push(runtime.spawn(task));
        Ok(())
    }

    /// Submissions still running
    pub fn in_flight(&self) -> usize {
        let mut submissions = self.submissions.lock();
        submissions.reap();
        submissions.running.len()
    }

    /// Wait until no submission is running, including ones started while
    /// waiting, and return the outcomes not yet collected.
    ///
    /// Cancel safe: tasks stay tracked if the returned future is dropped.
    pub async fn wait_for_idle(&self) -> Vec<SubmissionOutcome> {
        loop {
            {
                let mut submissions = self.submissions.lock();
                submissions.reap();
                if submissions.running.is_empty() {
                    return submissions.completed.drain(..).collect();
                }
            }
            tokio::time::sleep(IDLE_POLL).await;
        }
    }

    pub fn network(&self) -> &NetworkInterceptor {
        &self.network
    }
}

impl std::fmt::Debug for Ajax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ajax")
            .field("network", &self.network)
            .field("in_flight", &self.submissions.lock().running.len())
            .finish()
    }
}
