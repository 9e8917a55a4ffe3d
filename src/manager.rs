//! Cluster Manager
//!
//! The application-facing entry point. Bundles a backend with the dispatcher and the
//! property accessor built on top of it, so callers never touch the backend directly.

use crate::backend::{ClusterBackend, ClusteredBackend, CoordinationEngine, StandaloneBackend};
use crate::config::ClusterConfig;
use crate::dispatcher::{Assignments, DispatchObserver, Dispatcher};
use crate::error::DispatchError;
use crate::instruction::SharedInstruction;
use crate::membership::Member;
use crate::storage::Properties;

use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct ClusterManager<B> {
    backend: Arc<B>,
    dispatcher: Dispatcher<B>,
    properties: Properties,
}

impl ClusterManager<StandaloneBackend> {
    /// Single-node manager; the default when no coordination engine is available.
    pub fn standalone(config: &ClusterConfig) -> Self {
        Self::new(Arc::new(StandaloneBackend::new()), config)
    }
}

impl<E: CoordinationEngine> ClusterManager<ClusteredBackend<E>> {
    pub fn clustered(engine: Arc<E>, config: &ClusterConfig) -> Self {
        Self::new(Arc::new(ClusteredBackend::new(engine)), config)
    }
}

impl<B: ClusterBackend> ClusterManager<B> {
    pub fn new(backend: Arc<B>, config: &ClusterConfig) -> Self {
        let dispatcher = Dispatcher::new(backend.clone(), config);
        Self::assemble(backend, dispatcher)
    }

    pub fn with_observer(
        backend: Arc<B>,
        config: &ClusterConfig,
        observer: Arc<dyn DispatchObserver>,
    ) -> Self {
        let dispatcher = Dispatcher::with_observer(backend.clone(), config, observer);
        Self::assemble(backend, dispatcher)
    }

    fn assemble(backend: Arc<B>, dispatcher: Dispatcher<B>) -> Self {
        let properties = Properties::new(backend.shared_store());
        Self {
            backend,
            dispatcher,
            properties,
        }
    }

    /// Members currently sharing the workload.
    pub fn members(&self) -> Vec<Member> {
        self.backend.list_members()
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn dispatcher(&self) -> &Dispatcher<B> {
        &self.dispatcher
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Runs `instruction` on every member. See [`Dispatcher::submit`].
    pub async fn submit<T: Send + 'static>(
        &self,
        instruction: SharedInstruction<T>,
    ) -> Result<HashMap<Member, T>, DispatchError> {
        self.dispatcher.submit(instruction).await
    }

    pub async fn submit_with_cancel<T: Send + 'static>(
        &self,
        instruction: SharedInstruction<T>,
        cancel: &CancellationToken,
    ) -> Result<HashMap<Member, T>, DispatchError> {
        self.dispatcher.submit_with_cancel(instruction, cancel).await
    }

    /// Runs each assigned instruction on its member. See [`Dispatcher::submit_many`].
    pub async fn submit_many<T: Send + 'static>(
        &self,
        assignments: Assignments<T>,
    ) -> Result<HashMap<Member, T>, DispatchError> {
        self.dispatcher.submit_many(assignments).await
    }

    pub async fn submit_many_with_cancel<T: Send + 'static>(
        &self,
        assignments: Assignments<T>,
        cancel: &CancellationToken,
    ) -> Result<HashMap<Member, T>, DispatchError> {
        self.dispatcher
            .submit_many_with_cancel(assignments, cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalCluster;
    use crate::instruction::from_fn;
    use std::time::Duration;

    #[tokio::test]
    async fn test_standalone_manager_end_to_end() {
        let manager = ClusterManager::standalone(&ClusterConfig::default());

        manager.properties().set("mode", "maintenance").unwrap();
        let props = manager.properties().clone();
        let read_mode = from_fn(move |_member: Member| {
            let props = props.clone();
            async move { Ok(props.get("mode")) }
        });
        let results = manager.submit(read_mode).await.unwrap();

        assert_eq!(manager.members(), vec![Member::local()]);
        assert_eq!(
            results.get(&Member::local()),
            Some(&Some("maintenance".to_string()))
        );
    }

    #[tokio::test]
    async fn test_clustered_managers_share_properties_and_members() {
        let cluster = LocalCluster::with_members([Member::named("a"), Member::named("b")]).unwrap();
        let config = ClusterConfig::with_instruction_timeout(Duration::from_secs(5));
        let first = ClusterManager::clustered(cluster.clone(), &config);
        let second = ClusterManager::clustered(cluster, &config);

        first.properties().set("epoch", &3u32).unwrap();

        assert_eq!(second.properties().get_as::<u32>("epoch"), Some(3));
        assert_eq!(first.members(), second.members());
    }

    #[tokio::test]
    async fn test_manager_submit_many_with_skipped_member() {
        let cluster = LocalCluster::with_members([Member::named("a"), Member::named("b")]).unwrap();
        let manager = ClusterManager::clustered(cluster, &ClusterConfig::default());
        let double = from_fn(|member: Member| async move { Ok(member.id().repeat(2)) });
        let assignments: Assignments<String> = [
            (Member::named("a"), Some(double)),
            (Member::named("b"), None),
        ]
        .into_iter()
        .collect();

        let results = manager.submit_many(assignments).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[&Member::named("a")], "aa");
    }
}
