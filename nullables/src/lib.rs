//! Nullable infrastructure for deterministic testing.
//!
//! Everything outside the workflow (clock, signal providers, record stores)
//! sits behind a trait. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, including injected faults and hangs
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod records;
pub mod signals;

pub use clock::NullClock;
pub use records::NullRecordSink;
pub use signals::{Fault, NullSignalProvider, SignalCall};
