//! Cluster Management Library
//!
//! A cluster-abstraction layer that lets an application discover its peer nodes, share
//! small pieces of state ("distributed properties") and dispatch units of work
//! ("instructions") to some or all peers, collecting their results under a timeout.
//!
//! Application code depends only on `ClusterManager`; whether a single in-process node or
//! a real coordination engine sits underneath is decided when the manager is built.
//!
//! ## Modules
//! - **`membership`**: Member identity and the selectors used to target one node.
//! - **`instruction`**: The unit-of-work trait and the registry of instruction factories.
//! - **`backend`**: The capability set a substrate must provide, with standalone and clustered
//!   variants and an in-process multi-node engine.
//! - **`storage`**: The shared key/value store and the typed property accessor over it.
//! - **`dispatcher`**: Fan-out of instructions and deadline-bounded aggregation of results.
//! - **`manager`**: The facade tying the above together.

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod instruction;
pub mod manager;
pub mod membership;
pub mod storage;

pub use backend::{ClusterBackend, ClusteredBackend, CoordinationEngine, LocalCluster, StandaloneBackend};
pub use config::ClusterConfig;
pub use dispatcher::{Assignments, DispatchObserver, Dispatcher, TracingObserver};
pub use error::{DispatchError, ErrorKind};
pub use instruction::{Instruction, InstructionRegistry, SharedInstruction, from_fn};
pub use manager::ClusterManager;
pub use membership::Member;
pub use storage::{Properties, SharedStore};
