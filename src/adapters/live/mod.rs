//! Live adapters that talk to the real API.

pub mod banana;
