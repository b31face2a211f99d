//! Visitor kiosk service.
//!
//! Wires the verification workflow to its collaborators: configuration,
//! signal providers, record sinks and the operator alert channel.

pub mod alerts;
pub mod config;
pub mod error;
pub mod kiosk;
pub mod logging;

pub use alerts::{AlertChannel, OperatorAlert};
pub use config::{KioskConfig, MockConfig, RecordsConfig, SessionsConfig, TimeoutConfig};
pub use error::KioskError;
pub use kiosk::{Finalized, Kiosk, PersistenceTicket};
pub use logging::{init_logging, LogFormat};
