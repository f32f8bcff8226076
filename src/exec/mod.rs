// src/exec/mod.rs

//! Task execution.
//!
//! This module ties together:
//! - the shared per-run state ([`ExecutionContext`], [`CancelSignal`])
//! - the command execution boundary ([`CommandRunner`], [`SystemRunner`])
//! - the sequential task runner ([`run_tasks`], [`Runner`])

pub mod context;
pub mod process;
pub mod runner;

pub use context::{CancelSignal, ExecutionContext};
pub use process::{CommandRunner, CommandSpec, ProcessResult, SystemRunner, run_command};
pub use runner::{RunOutcome, Runner, Task, TaskFn, TaskFuture, run_tasks};
