//! lockscope - restore graph inspector
//!
//! Caches the parsed restore graph of a project's assets file, classifies
//! its packages into direct and transitive references per target framework,
//! and resolves endpoints from a saved service index.

pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod project;
pub mod service_index;
pub mod ui;

pub use error::{LockscopeError, LockscopeResult};
