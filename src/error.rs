use crate::membership::Member;
use thiserror::Error;

/// Failures that escape a dispatch call.
///
/// Timeouts are deliberately absent: a member that misses the deadline is
/// reported to the `DispatchObserver` and omitted from the result instead.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The backend refused or could not route an instruction to a member.
    #[error("failed to submit instruction to cluster member {member}: {source}")]
    Submission {
        member: Member,
        #[source]
        source: anyhow::Error,
    },

    /// The instruction returned an error (or panicked) while running on its member.
    #[error("instruction failed on cluster member {member}: {source}")]
    Execution {
        member: Member,
        #[source]
        source: anyhow::Error,
    },

    /// The caller stopped waiting before all results were in.
    #[error("dispatch was interrupted while waiting for instruction results")]
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Submission,
    Execution,
    Interrupted,
}

impl DispatchError {
    pub fn submission(member: &Member, source: impl Into<anyhow::Error>) -> Self {
        Self::Submission {
            member: member.clone(),
            source: source.into(),
        }
    }

    pub fn execution(member: &Member, source: impl Into<anyhow::Error>) -> Self {
        Self::Execution {
            member: member.clone(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Submission { .. } => ErrorKind::Submission,
            Self::Execution { .. } => ErrorKind::Execution,
            Self::Interrupted => ErrorKind::Interrupted,
        }
    }

    /// The member the failure is attributed to, if any.
    pub fn member(&self) -> Option<&Member> {
        match self {
            Self::Submission { member, .. } | Self::Execution { member, .. } => Some(member),
            Self::Interrupted => None,
        }
    }
}
