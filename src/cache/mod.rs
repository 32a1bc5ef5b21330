//! Parsed restore graph caching
//!
//! The assets file written by restore is the single source of truth; the
//! cache only decides whether the last parse of it may be reused.
//!
//! # Cache States
//!
//! | State | Next lookup | Description |
//! |-------|-------------|-------------|
//! | Empty | parse | Nothing parsed yet, or the file disappeared |
//! | Live | reuse | Graph still reachable, file not modified since |
//! | Reclaimed | parse | Every holder dropped the graph |
//! | Broken | no graph | Last parse failed, file not modified since |
//! | Stale | parse | File modified after the watermark |

pub mod graph;

pub use graph::{GraphLookup, RestoreGraphCache, Retention};
