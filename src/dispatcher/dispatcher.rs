//! Instruction Dispatcher
//!
//! Fans instructions out to cluster members through a backend and gathers the results
//! under one deadline.
//!
//! ## Contract
//! - The result only ever contains requested members, at most once each.
//! - Members that miss the deadline are reported to the observer and left out. Their work
//!   keeps running; nothing here cancels it.
//! - The first execution failure, submission failure or cancellation aborts the whole call.
//!   Results gathered so far are discarded and the remaining instructions are abandoned.

use super::observer::{DispatchObserver, TracingObserver};
use crate::backend::ClusterBackend;
use crate::config::ClusterConfig;
use crate::error::DispatchError;
use crate::instruction::SharedInstruction;
use crate::membership::Member;

use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Member → instruction assignments. `None` skips the member.
pub type Assignments<T> = HashMap<Member, Option<SharedInstruction<T>>>;

pub struct Dispatcher<B> {
    backend: Arc<B>,
    timeout: Duration,
    observer: Arc<dyn DispatchObserver>,
}

impl<B> Clone for Dispatcher<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            timeout: self.timeout,
            observer: self.observer.clone(),
        }
    }
}

impl<B: ClusterBackend> Dispatcher<B> {
    /// Creates a dispatcher that reports through `tracing`.
    pub fn new(backend: Arc<B>, config: &ClusterConfig) -> Self {
        Self::with_observer(backend, config, Arc::new(TracingObserver))
    }

    pub fn with_observer(
        backend: Arc<B>,
        config: &ClusterConfig,
        observer: Arc<dyn DispatchObserver>,
    ) -> Self {
        Self {
            backend,
            timeout: config.instruction_timeout(),
            observer,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Runs `instruction` on every member the backend currently knows.
    pub async fn submit<T: Send + 'static>(
        &self,
        instruction: SharedInstruction<T>,
    ) -> Result<HashMap<Member, T>, DispatchError> {
        self.submit_with_cancel(instruction, &CancellationToken::new())
            .await
    }

    pub async fn submit_with_cancel<T: Send + 'static>(
        &self,
        instruction: SharedInstruction<T>,
        cancel: &CancellationToken,
    ) -> Result<HashMap<Member, T>, DispatchError> {
        let assignments: Assignments<T> = self
            .backend
            .list_members()
            .into_iter()
            .map(|member| (member, Some(instruction.clone())))
            .collect();

        self.submit_many_with_cancel(assignments, cancel).await
    }

    /// Runs each assigned instruction on its member and collects the results.
    pub async fn submit_many<T: Send + 'static>(
        &self,
        assignments: Assignments<T>,
    ) -> Result<HashMap<Member, T>, DispatchError> {
        self.submit_many_with_cancel(assignments, &CancellationToken::new())
            .await
    }

    /// Like `submit_many`, but fails with `DispatchError::Interrupted` as soon as `cancel`
    /// is cancelled.
    pub async fn submit_many_with_cancel<T: Send + 'static>(
        &self,
        assignments: Assignments<T>,
        cancel: &CancellationToken,
    ) -> Result<HashMap<Member, T>, DispatchError> {
        let mut pending = FuturesUnordered::new();
        let mut outstanding = HashSet::new();

        for (member, instruction) in assignments {
            let Some(instruction) = instruction else {
                tracing::trace!("No instruction assigned to {}, skipping", member);
                continue;
            };

            let handle = match self.backend.submit(&member, instruction) {
                Ok(handle) => handle,
                Err(e) => {
                    self.observer.instruction_failed(&e);
                    return Err(e);
                }
            };

            outstanding.insert(member.clone());
            pending.push(async move { (member, handle.await) });
        }

        let deadline = tokio::time::sleep_until(Instant::now() + self.timeout);
        tokio::pin!(deadline);

        let mut results = HashMap::with_capacity(outstanding.len());

        tracing::debug!(
            "Waiting up to {:?} for {} instruction(s)",
            self.timeout,
            outstanding.len()
        );

        while !outstanding.is_empty() {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::debug!(
                        "Dispatch interrupted with {} instruction(s) outstanding",
                        outstanding.len()
                    );
                    let error = DispatchError::Interrupted;
                    self.observer.instruction_failed(&error);
                    return Err(error);
                }

                Some((member, outcome)) = pending.next() => {
                    outstanding.remove(&member);
                    match outcome {
                        Ok(value) => {
                            tracing::trace!("Instruction on {} completed", member);
                            results.insert(member, value);
                        }
                        Err(e) => {
                            self.observer.instruction_failed(&e);
                            return Err(e);
                        }
                    }
                }

                _ = &mut deadline => {
                    for member in &outstanding {
                        self.observer.instruction_timed_out(member, self.timeout);
                    }
                    break;
                }
            }
        }

        Ok(results)
    }
}
