// Gameweek report application: configuration, the per-cycle pipeline, and
// rendering. The binary in main.rs wires these together.

pub mod config;
pub mod pipeline;
pub mod report;
