//! Standalone Backend
//!
//! A single-node backend for development and for deployments without a coordination
//! engine. The only member is this process; instructions run on a local worker pool and
//! properties live in a process-wide map.

use super::ClusterBackend;
use super::handle::DispatchHandle;
use crate::error::DispatchError;
use crate::instruction::SharedInstruction;
use crate::membership::Member;
use crate::storage::{LocalStore, SharedStore};

use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

/// Default number of instructions the local pool runs at once.
pub const DEFAULT_WORKERS: usize = 64;

pub struct StandaloneBackend {
    member: Member,
    workers: Arc<Semaphore>,
    worker_count: usize,
    store: Arc<LocalStore>,
}

impl StandaloneBackend {
    /// Creates a backend whose member is `"localhost"`.
    pub fn new() -> Self {
        Self::with_member(Member::local())
    }

    pub fn with_member(member: Member) -> Self {
        Self {
            member,
            workers: Arc::new(Semaphore::new(DEFAULT_WORKERS)),
            worker_count: DEFAULT_WORKERS,
            store: LocalStore::new(),
        }
    }

    /// Bounds the worker pool to `worker_count` concurrent instructions (at least one).
    pub fn with_workers(mut self, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        self.workers = Arc::new(Semaphore::new(worker_count));
        self.worker_count = worker_count;
        self
    }

    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Instructions currently holding a worker.
    pub fn busy_workers(&self) -> usize {
        self.worker_count - self.workers.available_permits()
    }
}

impl Default for StandaloneBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterBackend for StandaloneBackend {
    fn list_members(&self) -> Vec<Member> {
        vec![self.member.clone()]
    }

    fn submit<T: Send + 'static>(
        &self,
        member: &Member,
        instruction: SharedInstruction<T>,
    ) -> Result<DispatchHandle<T>, DispatchError> {
        if member != &self.member {
            tracing::warn!("Rejected instruction for unknown member {}", member);
            return Err(DispatchError::submission(
                member,
                anyhow::anyhow!("member is not part of this standalone cluster"),
            ));
        }

        let runtime = Handle::try_current().map_err(|e| DispatchError::submission(member, e))?;

        let workers = self.workers.clone();
        let executing = member.clone();
        let task = runtime.spawn(async move {
            let _permit = workers.acquire_owned().await?;
            tracing::trace!("Running instruction on {}", executing);
            instruction.execute(&executing).await
        });

        tracing::debug!("Submitted instruction to {}", member);
        Ok(DispatchHandle::from_task(member.clone(), task))
    }

    fn shared_store(&self) -> Arc<dyn SharedStore> {
        self.store.clone()
    }
}
