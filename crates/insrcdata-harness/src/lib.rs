//! Regression and benchmark harness for the insrcdata code generator.
//!
//! The generator itself is an external tool invoked as a black box; this
//! crate owns everything around it: discovering sample projects, driving
//! the per-language regenerate/build/run cycle, maintaining golden
//! baselines, and timing the generation/build/run pipeline over a
//! deterministic synthetic dataset.
//!
//! Execution is deliberately single-threaded and sequential. Every tool
//! invocation is a blocking wait, and the first failure stops the batch.

pub mod benchmark;
pub mod discovery;
pub mod error;
pub mod exec;
pub mod regression;
pub mod sample;

pub use error::{HarnessError, Result};
