//! Fundamental types for the visitor verification kiosk.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: timestamps, visit purposes, admission decisions and the
//! identifiers attached to a visitor.

pub mod decision;
pub mod error;
pub mod identity;
pub mod purpose;
pub mod time;

pub use decision::AdmissionDecision;
pub use error::TypesError;
pub use identity::{IdentityNumber, VisitorId};
pub use purpose::VisitPurpose;
pub use time::{utc, utc_offset, FixedOffset, Timestamp};
