//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `local.rs`: form draft and calculation history (no network).
//! - `runtime.rs`: calc/compare/aggregate/health against the calculation API.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate business logic to `services/*`.
//! - Keep behavior and output schema stable.

pub mod local;
pub mod runtime;

pub use local::{handle_form_commands, handle_history_commands};
pub use runtime::handle_runtime_commands;
