//! Error types for `padron-core`.

use thiserror::Error;

use crate::{person::Field, validation::FieldErrors};

/// Misuse of a [`PersonForm`](crate::form::PersonForm).
///
/// Field-level validation failures are not errors of this kind; they are
/// recorded on the form as data. The one exception is [`Error::Invalid`],
/// returned by `submit` so the caller cannot send an inadmissible record.
#[derive(Debug, Error)]
pub enum Error {
  #[error("the form is read-only; start editing first")]
  ReadOnly,

  #[error("{0} cannot be changed after creation")]
  ImmutableField(Field),

  #[error("{0} is not a text field")]
  NotText(Field),

  #[error("invalid fields: {0}")]
  Invalid(FieldErrors),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
