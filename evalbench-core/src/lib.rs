//! EvalBench core
//!
//! Domain model and client-side state for an LLM-as-judge evaluation
//! workbench. This crate is pure and synchronous: it defines the test-case
//! data model (criteria, instances, results), the snake_case wire codecs the
//! evaluation backend speaks, versioned test-case persistence, the
//! evaluation-run state machine, and the pagination and import helpers the
//! surrounding tools are built on. Network I/O lives in `evalbench-sdk`.

pub mod domain;
pub mod error;
pub mod import;
pub mod pagination;
pub mod session;
pub mod text;
pub mod wire;

pub use domain::*;
pub use error::*;
