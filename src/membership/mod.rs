//! Membership Module
//!
//! Identity types for cluster nodes and the predicates used to target them.
//!
//! Members are discovered by a backend and are never created by the dispatch layer
//! itself. A backend may report a different member set on every call; a member that
//! has left is simply no longer listed.
//!
//! - **`Member`**: Opaque, comparable node identity.
//! - **`MemberSelector`**: Predicate over live members, used by coordination engines.
//! - **`SingleMemberSelector`**: Identity-exact selection of one node.

pub mod types;

pub use types::{LOCAL_MEMBER_ID, Member, MemberSelector, SingleMemberSelector};
