//! Core types for the padron person registry.
//!
//! The canonical person record, its field-level validation rules, the form
//! state machine that gates writes, and the audit-log model. This crate is
//! free of HTTP and wire concerns; `padron-wire` maps these types to what the
//! backend services exchange.

pub mod audit;
pub mod error;
pub mod form;
pub mod person;
pub mod validation;

pub use error::{Error, Result};
