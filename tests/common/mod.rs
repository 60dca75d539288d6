//! Common test utilities for integration tests.
//!
//! # Modules
//!
//! - `log_capture`: Captures events sent to the thread's default subscriber
//! - `records`: `Dummy` record types shared across tests

pub mod log_capture;
pub mod records;
