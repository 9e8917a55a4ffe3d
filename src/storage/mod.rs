//! Shared Storage Module
//!
//! The key/value state every cluster member can see, and the typed accessor layered
//! on top of it.
//!
//! ## Core Concepts
//! - **`SharedStore`**: Name → JSON value map supplied by a backend. Clustered backends hand
//!   out a map owned by the coordination engine; the standalone backend uses a `LocalStore`.
//! - **`Properties`**: Typed get/set over a `SharedStore`. Last write wins, no versioning.

pub mod memory;
pub mod properties;
pub mod store;

pub use memory::LocalStore;
pub use properties::Properties;
pub use store::SharedStore;
