//! Persisted run state
//!
//! The state document carries everything one run hands to the next: the
//! schema cache of every table written so far and the per-layout
//! watermark values of incremental fetching.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::RunState;

#[cfg(test)]
mod tests;
