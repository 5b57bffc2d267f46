//! Campus API server library
//!
//! Startup configuration shared by the binary and its tests.

pub mod settings;

pub use settings::Settings;
