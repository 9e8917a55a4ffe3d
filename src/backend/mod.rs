//! Cluster Backend Module
//!
//! A backend supplies the three capabilities the dispatch layer consumes: the current
//! membership, single-member instruction submission, and a shared key/value store.
//!
//! ## Variants
//! - **`standalone`**: One synthetic member for this process. Instructions run on a bounded
//!   local worker pool and the store is an in-memory map.
//! - **`clustered`**: Membership, execution and storage are delegated to a
//!   `CoordinationEngine`. Submission uses a single-member selector against the engine's live
//!   membership, so an instruction only ever runs on the node it was addressed to.
//! - **`local_cluster`**: An in-process `CoordinationEngine` hosting several simulated nodes.
//!
//! The variant is chosen when the backend is constructed; nothing dispatches on it at runtime.

pub mod clustered;
pub mod handle;
pub mod local_cluster;
pub mod standalone;

pub use clustered::{ClusteredBackend, CoordinationEngine, Job, PROPERTIES_MAP_NAME};
pub use handle::DispatchHandle;
pub use local_cluster::LocalCluster;
pub use standalone::StandaloneBackend;

use crate::error::DispatchError;
use crate::instruction::SharedInstruction;
use crate::membership::Member;
use crate::storage::SharedStore;

use std::sync::Arc;

/// Capability set every backend provides.
pub trait ClusterBackend: Send + Sync + 'static {
    /// Currently known members. Order is not significant and may change between calls.
    fn list_members(&self) -> Vec<Member>;

    /// Starts `instruction` on exactly `member`.
    ///
    /// Returns a submission failure when the member is unknown or the backend cannot
    /// accept work. Must be called from within a Tokio runtime.
    fn submit<T: Send + 'static>(
        &self,
        member: &Member,
        instruction: SharedInstruction<T>,
    ) -> Result<DispatchHandle<T>, DispatchError>;

    /// The store backing distributed properties.
    fn shared_store(&self) -> Arc<dyn SharedStore>;
}
