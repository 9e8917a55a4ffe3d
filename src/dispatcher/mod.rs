//! Instruction Dispatch Module
//!
//! The fan-out/aggregate engine at the heart of the crate.
//!
//! - **`dispatcher`**: Submits instructions through a `ClusterBackend` and waits on every
//!   handle at once, bounded by the configured instruction timeout.
//! - **`observer`**: The explicit sink for timeout exclusions and aborts.

pub mod dispatcher;
pub mod observer;

pub use dispatcher::{Assignments, Dispatcher};
pub use observer::{DispatchObserver, TracingObserver};
