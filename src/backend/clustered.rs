//! Clustered Backend
//!
//! Delegates membership, execution and shared storage to an external coordination
//! engine. The engine owns failure detection and transport; this backend only
//! translates typed instructions into engine jobs and pins each job to one member.

use super::ClusterBackend;
use super::handle::DispatchHandle;
use crate::error::DispatchError;
use crate::instruction::SharedInstruction;
use crate::membership::{Member, MemberSelector, SingleMemberSelector};
use crate::storage::SharedStore;

use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Name of the engine map that backs distributed properties.
pub const PROPERTIES_MAP_NAME: &str = "distributed-properties";

/// Type-erased work handed to an engine. It receives the member it runs on.
pub type Job = Box<dyn FnOnce(Member) -> BoxFuture<'static, ()> + Send>;

/// What the clustered backend needs from a group-membership / execution engine.
pub trait CoordinationEngine: Send + Sync + 'static {
    /// Live members as the engine currently sees them.
    fn members(&self) -> Vec<Member>;

    /// Runs `job` on one live member accepted by `selector`.
    ///
    /// Fails if no live member is accepted or the chosen member cannot take work.
    fn execute(&self, job: Job, selector: &dyn MemberSelector) -> anyhow::Result<()>;

    /// A cluster-wide map identified by `name`.
    fn shared_map(&self, name: &str) -> Arc<dyn SharedStore>;
}

pub struct ClusteredBackend<E> {
    engine: Arc<E>,
    properties: Arc<dyn SharedStore>,
}

impl<E: CoordinationEngine> ClusteredBackend<E> {
    pub fn new(engine: Arc<E>) -> Self {
        let properties = engine.shared_map(PROPERTIES_MAP_NAME);
        tracing::info!(
            "Clustered backend attached ({} live members)",
            engine.members().len()
        );

        Self { engine, properties }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }
}

impl<E: CoordinationEngine> ClusterBackend for ClusteredBackend<E> {
    fn list_members(&self) -> Vec<Member> {
        self.engine.members()
    }

    fn submit<T: Send + 'static>(
        &self,
        member: &Member,
        instruction: SharedInstruction<T>,
    ) -> Result<DispatchHandle<T>, DispatchError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        let job: Job = Box::new(move |executing: Member| {
            async move {
                let result = instruction.execute(&executing).await;
                // Nobody is listening once the dispatcher has timed out.
                let _ = reply_tx.send(result);
            }
            .boxed()
        });

        let selector = SingleMemberSelector::new(member.clone());
        if let Err(e) = self.engine.execute(job, &selector) {
            tracing::warn!("Engine refused instruction for {}: {}", member, e);
            return Err(DispatchError::submission(member, e));
        }

        tracing::debug!("Submitted instruction to {}", member);
        Ok(DispatchHandle::from_reply(member.clone(), reply_rx))
    }

    fn shared_store(&self) -> Arc<dyn SharedStore> {
        self.properties.clone()
    }
}
