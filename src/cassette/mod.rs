//! Record/replay infrastructure for deterministic runs without the network.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
