pub mod dataset;
pub mod notify;
pub mod triage;

mod sourced;

pub use sourced::{FallbackReason, Sourced};
