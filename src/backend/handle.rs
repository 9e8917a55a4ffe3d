use crate::error::DispatchError;
use crate::membership::Member;

use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A result in flight for one (member, instruction) submission.
///
/// Resolves once the instruction has finished on its member. Dropping the handle
/// stops observing the instruction; it does not stop the instruction.
#[must_use = "a dispatch handle does nothing unless awaited"]
pub struct DispatchHandle<T> {
    member: Member,
    inner: BoxFuture<'static, Result<T, DispatchError>>,
}

impl<T: Send + 'static> DispatchHandle<T> {
    /// Wraps a locally spawned task.
    pub fn from_task(member: Member, task: JoinHandle<anyhow::Result<T>>) -> Self {
        let owner = member.clone();
        let inner = async move {
            match task.await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(DispatchError::execution(&owner, e)),
                Err(join_error) if join_error.is_panic() => Err(DispatchError::execution(
                    &owner,
                    anyhow::anyhow!("instruction panicked"),
                )),
                Err(_) => Err(DispatchError::execution(
                    &owner,
                    anyhow::anyhow!("instruction was cancelled before completing"),
                )),
            }
        }
        .boxed();

        Self { member, inner }
    }

    /// Wraps the reply channel of work running somewhere else.
    ///
    /// A sender dropped without replying means the member went away mid-instruction.
    pub fn from_reply(member: Member, reply: oneshot::Receiver<anyhow::Result<T>>) -> Self {
        let owner = member.clone();
        let inner = async move {
            match reply.await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(DispatchError::execution(&owner, e)),
                Err(_) => Err(DispatchError::execution(
                    &owner,
                    anyhow::anyhow!("cluster member left before completing the instruction"),
                )),
            }
        }
        .boxed();

        Self { member, inner }
    }
}

impl<T> DispatchHandle<T> {
    pub fn member(&self) -> &Member {
        &self.member
    }
}

impl<T> Future for DispatchHandle<T> {
    type Output = Result<T, DispatchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}
