//! Shared test utilities for labelvault integration tests.
//!
//! This module provides:
//! - `TestHarness` wiring in-memory collaborators and a fake PDF backend
//! - `MessageBuilder` for creating test messages programmatically

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{FakePdfBackend, FlakyMailbox, TestHarness};
