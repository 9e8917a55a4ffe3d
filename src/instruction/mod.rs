//! Instruction Module
//!
//! Instructions are the units of work the dispatcher fans out to cluster members.
//!
//! - **`types`**: The `Instruction` trait, its shared form and closure-backed instructions.
//! - **`registry`**: Named factories that build fully-configured instructions from JSON payloads.

pub mod registry;
pub mod types;

pub use registry::{InstructionRegistry, JsonInstruction};
pub use types::{FnInstruction, Instruction, SharedInstruction, from_fn};

#[cfg(test)]
mod tests;
