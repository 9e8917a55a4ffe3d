//! In-Process Coordination Engine
//!
//! Hosts several simulated cluster nodes inside one process. Each node has its own job
//! queue and bounded worker loop, so instructions addressed to different members really
//! run in parallel and member-local behaviour can be observed. Named maps are shared by
//! every node, like the distributed maps of a real engine.
//!
//! Nodes can join and leave at runtime. A node that leaves stops at once: queued jobs are
//! dropped and running jobs are aborted, so their callers see the member disappear.

use super::clustered::{CoordinationEngine, Job};
use crate::membership::{Member, MemberSelector};
use crate::storage::{LocalStore, SharedStore};

use anyhow::{Result, bail};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;

/// Default number of jobs one simulated node runs at once.
pub const DEFAULT_NODE_WORKERS: usize = 16;

struct LocalNode {
    jobs: mpsc::UnboundedSender<Job>,
    shutdown: CancellationToken,
}

pub struct LocalCluster {
    nodes: DashMap<Member, LocalNode>,
    maps: DashMap<String, Arc<LocalStore>>,
    workers_per_node: usize,
}

impl LocalCluster {
    pub fn new() -> Arc<Self> {
        Self::with_workers_per_node(DEFAULT_NODE_WORKERS)
    }

    pub fn with_workers_per_node(workers_per_node: usize) -> Arc<Self> {
        Arc::new(Self {
            nodes: DashMap::new(),
            maps: DashMap::new(),
            workers_per_node: workers_per_node.max(1),
        })
    }

    /// Creates a cluster and joins every member in `members`.
    pub fn with_members(members: impl IntoIterator<Item = Member>) -> Result<Arc<Self>> {
        let cluster = Self::new();
        for member in members {
            cluster.join(member)?;
        }
        Ok(cluster)
    }

    /// Starts a node for `member`. Must be called from within a Tokio runtime.
    pub fn join(&self, member: Member) -> Result<()> {
        if self.nodes.contains_key(&member) {
            bail!("Member {} is already part of the cluster", member);
        }

        let (jobs, queue) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let workers = Arc::new(Semaphore::new(self.workers_per_node));

        let runtime = tokio::runtime::Handle::try_current()?;
        runtime.spawn(node_loop(member.clone(), queue, shutdown.clone(), workers));

        self.nodes.insert(member.clone(), LocalNode { jobs, shutdown });

        tracing::info!("Member {} joined the cluster", member);
        tracing::info!("Cluster size now: {}", self.nodes.len());
        Ok(())
    }

    /// Stops the node for `member` and forgets it. Returns `false` if it was not a member.
    pub fn leave(&self, member: &Member) -> bool {
        match self.nodes.remove(member) {
            Some((_, node)) => {
                node.shutdown.cancel();
                tracing::info!("Member {} left the cluster", member);
                tracing::info!("Cluster size now: {}", self.nodes.len());
                true
            }
            None => {
                tracing::debug!("Leave requested for unknown member {}", member);
                false
            }
        }
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_member(&self, member: &Member) -> bool {
        self.nodes.contains_key(member)
    }
}

impl Drop for LocalCluster {
    fn drop(&mut self) {
        for entry in self.nodes.iter() {
            entry.value().shutdown.cancel();
        }
    }
}

impl CoordinationEngine for LocalCluster {
    fn members(&self) -> Vec<Member> {
        let mut members: Vec<Member> = self.nodes.iter().map(|entry| entry.key().clone()).collect();
        members.sort();
        members
    }

    fn execute(&self, job: Job, selector: &dyn MemberSelector) -> Result<()> {
        let Some(node) = self.nodes.iter().find(|entry| selector.select(entry.key())) else {
            bail!("No live cluster member matched the selector");
        };

        if node.value().jobs.send(job).is_err() {
            bail!("Cluster member {} is shutting down", node.key());
        }

        tracing::trace!("Queued job on {}", node.key());
        Ok(())
    }

    fn shared_map(&self, name: &str) -> Arc<dyn SharedStore> {
        self.maps
            .entry(name.to_string())
            .or_insert_with(LocalStore::new)
            .clone()
    }
}

/// Worker loop of one simulated node.
///
/// Pulls jobs off the node's queue and runs each on its own task, at most
/// `workers` at a time. Shutdown aborts running jobs and drops queued ones.
async fn node_loop(
    member: Member,
    mut queue: mpsc::UnboundedReceiver<Job>,
    shutdown: CancellationToken,
    workers: Arc<Semaphore>,
) {
    tracing::debug!("Node {} started", member);

    loop {
        let job = tokio::select! {
            _ = shutdown.cancelled() => break,
            job = queue.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let permit = tokio::select! {
            _ = shutdown.cancelled() => break,
            permit = workers.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let executing = member.clone();
        let stop = shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = stop.cancelled() => {
                    tracing::debug!("Aborted job on departed member {}", executing);
                }
                _ = job(executing.clone()) => {}
            }
            drop(permit);
        });
    }

    tracing::debug!("Node {} stopped", member);
}
