//! Workflow engine seam
//!
//! This module provides:
//! - [`WorkflowEngine`] trait for the four engine operations actions use
//! - [`InMemoryWorkflowEngine`] for tests and local runs

mod client;
mod memory;

pub use client::{EngineError, WorkflowEngine};
pub use memory::{EngineSnapshot, InMemoryWorkflowEngine};
