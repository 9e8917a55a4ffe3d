use crate::membership::Member;

use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// A unit of work that produces an `Output` when executed on a cluster member.
///
/// Instructions arrive fully configured: anything they depend on is captured when
/// they are built, so a backend only ever has to call `execute`.
#[async_trait]
pub trait Instruction: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Runs the instruction on `member`, the node the backend selected.
    async fn execute(&self, member: &Member) -> Result<Self::Output>;
}

/// Shared, type-erased instruction. A broadcast hands the same value to every member.
pub type SharedInstruction<T> = Arc<dyn Instruction<Output = T>>;

/// An instruction backed by an async closure.
pub struct FnInstruction<F, T> {
    f: F,
    _output: PhantomData<fn() -> T>,
}

impl<F, T> FnInstruction<F, T> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _output: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut, T> Instruction for FnInstruction<F, T>
where
    F: Fn(Member) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    async fn execute(&self, member: &Member) -> Result<T> {
        (self.f)(member.clone()).await
    }
}

/// Builds a shared instruction from an async closure receiving the executing member.
pub fn from_fn<F, Fut, T>(f: F) -> SharedInstruction<T>
where
    F: Fn(Member) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    Arc::new(FnInstruction::new(f))
}
