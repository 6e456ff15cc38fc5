//! Shared utilities for the DAO governance core.

pub mod logging;

pub use logging::{init_logging, init_test_tracing, LogFormat};
