use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier used for the single member of a standalone backend.
pub const LOCAL_MEMBER_ID: &str = "localhost";

/// Identity of one cluster node.
///
/// Two members are the same node if and only if their identifiers are equal.
/// The identifier is opaque to this crate: backends decide what it encodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Member(pub String);

impl Member {
    /// Creates a member with a random UUID v4 identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn named(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The synthetic member representing this process.
    pub fn local() -> Self {
        Self::named(LOCAL_MEMBER_ID)
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl Default for Member {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Predicate deciding which live members may run a piece of work.
pub trait MemberSelector: Send + Sync {
    fn select(&self, candidate: &Member) -> bool;
}

/// Selects exactly one member, by identity.
///
/// Instructions may touch member-local state, so a node that merely looks
/// equivalent is never an acceptable substitute.
#[derive(Debug, Clone)]
pub struct SingleMemberSelector {
    member: Member,
}

impl SingleMemberSelector {
    pub fn new(member: Member) -> Self {
        Self { member }
    }

    pub fn member(&self) -> &Member {
        &self.member
    }
}

impl MemberSelector for SingleMemberSelector {
    fn select(&self, candidate: &Member) -> bool {
        candidate == &self.member
    }
}
