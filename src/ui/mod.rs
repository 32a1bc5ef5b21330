//! Terminal output helpers
//!
//! Uses `cliclack` for styled logging when attached to a terminal and falls
//! back to plain prefixed lines when piped or running under CI.

mod context;
mod output;

pub use context::UiContext;
pub use output::{intro, key_value, section, step_info, step_ok, step_ok_detail, step_warn_hint};
