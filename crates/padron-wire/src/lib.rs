//! Wire codec for the padron person services.
//!
//! Maps [`padron_core::person::PersonRecord`] to and from the record the
//! backend exchanges, translating field names and enum labels. Pure
//! synchronous; no HTTP.
//!
//! # Quick start
//!
//! ```
//! use padron_core::person::{DocumentType, PersonRecord};
//! use padron_wire::{from_wire, to_wire};
//!
//! let record = PersonRecord {
//!   document_type: Some(DocumentType::CitizenId),
//!   ..Default::default()
//! };
//! let wire = to_wire(&record);
//! assert_eq!(wire.document_type, "Citizen ID");
//! assert_eq!(from_wire(wire), record);
//! ```

pub mod dictionary;
pub mod envelope;
pub mod error;
mod person;

pub use dictionary::{DOCUMENT_TYPES, Dictionary, Direction, GENDERS};
pub use envelope::{Envelope, ErrorItem};
pub use error::{Error, Result};
pub use person::{WirePerson, from_wire, to_wire, wire_key};
