//! Field validation rules.
//!
//! Every rule is a pure function of one raw value. Failures are returned as
//! [`FieldError`] values carrying the user-facing message; they are never
//! fatal. [`validate_record`] aggregates the rules over a whole record.

use std::{collections::BTreeMap, fmt, sync::LazyLock};

use regex::Regex;

use crate::person::{Field, PersonRecord, PhotoUpload};

pub const FIRST_NAME_MAX: usize = 30;
pub const SECOND_NAME_MAX: usize = 30;
pub const LAST_NAMES_MAX: usize = 60;
pub const PHONE_LEN: usize = 10;
pub const DOCUMENT_NUMBER_MAX: usize = 10;
pub const PHOTO_MAX_BYTES: u64 = 2 * 1024 * 1024;

static TEXT_ONLY: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑ\s]*$").expect("static pattern"));
static EMAIL_SHAPE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static pattern"));

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Why a value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
  Empty,
  InvalidCharacters,
  TooLong { max: usize },
  WrongLength { expected: usize },
  NonNumeric,
  InvalidFormat,
  FileTooLarge { limit: u64 },
}

/// A rejected field together with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
  pub field:     Field,
  pub violation: Violation,
}

impl FieldError {
  pub fn new(field: Field, violation: Violation) -> Self { Self { field, violation } }

  /// The message shown next to the field.
  pub fn message(&self) -> String { message(self.field, self.violation) }
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.message()) }
}

impl std::error::Error for FieldError {}

/// The outcome of a single rule.
pub type Check = Result<(), FieldError>;

fn message(field: Field, violation: Violation) -> String {
  use Field as F;
  use Violation as V;

  match (field, violation) {
    (F::FirstName, V::Empty) => "El primer nombre es obligatorio".into(),
    (F::FirstName, V::InvalidCharacters) => {
      "El primer nombre solo puede contener letras y espacios".into()
    }
    (F::FirstName, V::TooLong { max }) => {
      format!("El primer nombre no puede superar {max} caracteres")
    }
    (F::SecondName, V::InvalidCharacters) => {
      "El segundo nombre solo puede contener letras y espacios".into()
    }
    (F::SecondName, V::TooLong { max }) => {
      format!("El segundo nombre no puede superar {max} caracteres")
    }
    (F::LastNames, V::Empty) => "Los apellidos son obligatorios".into(),
    (F::LastNames, V::InvalidCharacters) => {
      "Los apellidos solo pueden contener letras y espacios".into()
    }
    (F::LastNames, V::TooLong { max }) => {
      format!("Los apellidos no pueden superar {max} caracteres")
    }
    (F::Phone, V::Empty) => "El celular es obligatorio".into(),
    (F::Phone, V::NonNumeric) => "El celular solo puede contener números".into(),
    (F::Phone, V::WrongLength { expected }) => {
      format!("El celular debe tener exactamente {expected} dígitos")
    }
    (F::DocumentNumber, V::Empty) => "El documento es obligatorio".into(),
    (F::DocumentNumber, V::NonNumeric) => "El documento solo puede contener números".into(),
    (F::DocumentNumber, V::TooLong { max }) => {
      format!("El documento no puede superar {max} dígitos")
    }
    (F::Email, V::Empty) => "El correo electrónico es obligatorio".into(),
    (F::Email, V::InvalidFormat) => "El formato del correo electrónico no es válido".into(),
    (F::Photo, V::FileTooLarge { limit }) => {
      format!("La foto no puede superar los {} MB", limit / (1024 * 1024))
    }
    (F::DocumentType, V::Empty) => "Debe seleccionar un tipo de documento".into(),
    (F::BirthDate, V::Empty) => "La fecha de nacimiento es obligatoria".into(),
    (F::BirthDate, V::InvalidFormat) => "La fecha de nacimiento no es válida".into(),
    (F::Gender, V::Empty) => "Debe seleccionar un género".into(),
    (field, _) => format!("El campo {} no es válido", field.key()),
  }
}

// ─── Character classes ───────────────────────────────────────────────────────

/// Letters (including the Spanish accented vowels and ñ) and whitespace only.
pub fn is_text_only(value: &str) -> bool { TEXT_ONLY.is_match(value) }

/// ASCII digits only. The empty string qualifies.
pub fn is_digits_only(value: &str) -> bool { value.bytes().all(|b| b.is_ascii_digit()) }

/// `local@domain.tld`, with no whitespace or extra `@` in any part.
pub fn is_email_shaped(value: &str) -> bool { EMAIL_SHAPE.is_match(value) }

fn char_len(value: &str) -> usize { value.chars().count() }

// ─── Per-field rules ─────────────────────────────────────────────────────────

fn name_rule(field: Field, value: &str, required: bool, max: usize) -> Check {
  if value.is_empty() {
    return if required { Err(FieldError::new(field, Violation::Empty)) } else { Ok(()) };
  }
  if !is_text_only(value) {
    return Err(FieldError::new(field, Violation::InvalidCharacters));
  }
  if char_len(value) > max {
    return Err(FieldError::new(field, Violation::TooLong { max }));
  }
  Ok(())
}

pub fn validate_first_name(value: &str) -> Check {
  name_rule(Field::FirstName, value, true, FIRST_NAME_MAX)
}

/// Optional: the empty string is valid.
pub fn validate_second_name(value: &str) -> Check {
  name_rule(Field::SecondName, value, false, SECOND_NAME_MAX)
}

pub fn validate_last_names(value: &str) -> Check {
  name_rule(Field::LastNames, value, true, LAST_NAMES_MAX)
}

pub fn validate_phone(value: &str) -> Check {
  let field = Field::Phone;
  if value.is_empty() {
    return Err(FieldError::new(field, Violation::Empty));
  }
  if !is_digits_only(value) {
    return Err(FieldError::new(field, Violation::NonNumeric));
  }
  if value.len() != PHONE_LEN {
    return Err(FieldError::new(field, Violation::WrongLength { expected: PHONE_LEN }));
  }
  Ok(())
}

pub fn validate_document_number(value: &str) -> Check {
  let field = Field::DocumentNumber;
  if value.is_empty() {
    return Err(FieldError::new(field, Violation::Empty));
  }
  if !is_digits_only(value) {
    return Err(FieldError::new(field, Violation::NonNumeric));
  }
  if value.len() > DOCUMENT_NUMBER_MAX {
    return Err(FieldError::new(field, Violation::TooLong { max: DOCUMENT_NUMBER_MAX }));
  }
  Ok(())
}

pub fn validate_email(value: &str) -> Check {
  if value.is_empty() {
    return Err(FieldError::new(Field::Email, Violation::Empty));
  }
  if !is_email_shaped(value) {
    return Err(FieldError::new(Field::Email, Violation::InvalidFormat));
  }
  Ok(())
}

/// Size limit for a newly selected photo. No photo is vacuously valid.
pub fn validate_photo(photo: Option<&PhotoUpload>) -> Check {
  match photo {
    Some(p) => validate_photo_size(p.size()),
    None => Ok(()),
  }
}

pub fn validate_photo_size(size: u64) -> Check {
  if size > PHOTO_MAX_BYTES {
    return Err(FieldError::new(Field::Photo, Violation::FileTooLarge { limit: PHOTO_MAX_BYTES }));
  }
  Ok(())
}

impl Field {
  /// Run this field's per-field rule against a raw value.
  ///
  /// Document type, birth date and gender are selections checked at the
  /// record level, and the photo is not text; all four pass here.
  pub fn check(self, value: &str) -> Check {
    match self {
      Field::FirstName => validate_first_name(value),
      Field::SecondName => validate_second_name(value),
      Field::LastNames => validate_last_names(value),
      Field::Phone => validate_phone(value),
      Field::DocumentNumber => validate_document_number(value),
      Field::Email => validate_email(value),
      Field::DocumentType | Field::BirthDate | Field::Gender | Field::Photo => Ok(()),
    }
  }
}

// ─── Whole-record validation ─────────────────────────────────────────────────

/// Per-field errors collected over a record, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, FieldError>);

impl FieldErrors {
  pub fn new() -> Self { Self::default() }

  /// Record `error`, replacing any earlier error for the same field.
  pub fn insert(&mut self, error: FieldError) { self.0.insert(error.field, error); }

  pub fn remove(&mut self, field: Field) -> Option<FieldError> { self.0.remove(&field) }

  pub fn get(&self, field: Field) -> Option<&FieldError> { self.0.get(&field) }

  pub fn contains(&self, field: Field) -> bool { self.0.contains_key(&field) }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn clear(&mut self) { self.0.clear(); }

  pub fn fields(&self) -> impl Iterator<Item = Field> + '_ { self.0.keys().copied() }

  pub fn iter(&self) -> impl Iterator<Item = &FieldError> { self.0.values() }

  /// Apply one rule outcome: store the error, or clear the field on success.
  pub fn record(&mut self, field: Field, check: Check) {
    match check {
      Ok(()) => {
        self.0.remove(&field);
      }
      Err(e) => self.insert(e),
    }
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, e) in self.0.values().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{}: {}", e.field, e)?;
    }
    Ok(())
  }
}

/// Fields checked by the per-field dispatcher during whole-record validation,
/// in order.
const RECORD_FIELDS: [Field; 9] = [
  Field::DocumentType,
  Field::DocumentNumber,
  Field::FirstName,
  Field::SecondName,
  Field::LastNames,
  Field::BirthDate,
  Field::Gender,
  Field::Email,
  Field::Phone,
];

/// Validate every field of `record`. The record is admissible iff the result
/// is empty.
pub fn validate_record(record: &PersonRecord) -> FieldErrors {
  let mut errors = FieldErrors::new();

  for field in RECORD_FIELDS {
    let raw = record.text(field).unwrap_or_default();
    if let Err(e) = field.check(&raw) {
      errors.insert(e);
    }
  }

  if record.document_type.is_none() {
    errors.insert(FieldError::new(Field::DocumentType, Violation::Empty));
  }
  if record.birth_date.is_none() {
    errors.insert(FieldError::new(Field::BirthDate, Violation::Empty));
  }
  if record.gender.is_none() {
    errors.insert(FieldError::new(Field::Gender, Violation::Empty));
  }

  if let Some(upload) = record.photo.as_ref().and_then(|p| p.as_pending()) {
    if let Err(e) = validate_photo(Some(upload)) {
      errors.insert(e);
    }
  }

  errors
}

#[cfg(test)]
mod tests {
  use bytes::Bytes;
  use chrono::NaiveDate;

  use super::*;
  use crate::person::{DocumentType, Gender, Photo};

  fn violation(check: Check) -> Violation { check.unwrap_err().violation }

  fn valid_record() -> PersonRecord {
    PersonRecord {
      id:              None,
      document_type:   Some(DocumentType::CitizenId),
      document_number: "1020304050".into(),
      first_name:      "María José".into(),
      second_name:     String::new(),
      last_names:      "Pérez Núñez".into(),
      birth_date:      NaiveDate::from_ymd_opt(1994, 3, 12),
      gender:          Some(Gender::Female),
      email:           "maria@example.co".into(),
      phone:           "3001234567".into(),
      photo:           None,
    }
  }

  fn upload(size: usize) -> PhotoUpload {
    PhotoUpload {
      file_name:  "foto.png".into(),
      media_type: Some("image/png".into()),
      bytes:      Bytes::from(vec![0u8; size]),
    }
  }

  // ─── Names ─────────────────────────────────────────────────────────────────

  #[test]
  fn first_name_rules() {
    assert_eq!(violation(validate_first_name("")), Violation::Empty);
    assert!(validate_first_name("María José").is_ok());
    assert!(validate_first_name("Ñandú").is_ok());
    assert_eq!(violation(validate_first_name("A1")), Violation::InvalidCharacters);
    assert_eq!(violation(validate_first_name("Ana-Luisa")), Violation::InvalidCharacters);

    let exactly_max = "a".repeat(FIRST_NAME_MAX);
    assert!(validate_first_name(&exactly_max).is_ok());
    let too_long = "a".repeat(FIRST_NAME_MAX + 1);
    assert_eq!(violation(validate_first_name(&too_long)), Violation::TooLong { max: 30 });
  }

  #[test]
  fn name_length_counts_characters_not_bytes() {
    // 30 accented characters are 60 bytes of UTF-8.
    let accented = "á".repeat(30);
    assert!(validate_first_name(&accented).is_ok());
  }

  #[test]
  fn second_name_is_optional() {
    assert!(validate_second_name("").is_ok());
    assert!(validate_second_name("Lucía").is_ok());
    assert_eq!(violation(validate_second_name("L3")), Violation::InvalidCharacters);
    assert_eq!(
      violation(validate_second_name(&"b".repeat(31))),
      Violation::TooLong { max: 30 }
    );
  }

  #[test]
  fn last_names_allow_sixty_characters() {
    assert_eq!(violation(validate_last_names("")), Violation::Empty);
    assert!(validate_last_names(&"c".repeat(60)).is_ok());
    assert_eq!(
      violation(validate_last_names(&"c".repeat(61))),
      Violation::TooLong { max: 60 }
    );
  }

  // ─── Numbers ───────────────────────────────────────────────────────────────

  #[test]
  fn phone_rules() {
    assert_eq!(violation(validate_phone("")), Violation::Empty);
    assert_eq!(violation(validate_phone("123")), Violation::WrongLength { expected: 10 });
    assert!(validate_phone("3001234567").is_ok());
    assert_eq!(violation(validate_phone("300123456a")), Violation::NonNumeric);
    assert_eq!(violation(validate_phone("300 1234567")), Violation::NonNumeric);
  }

  #[test]
  fn document_number_rules() {
    assert_eq!(violation(validate_document_number("")), Violation::Empty);
    assert_eq!(violation(validate_document_number("12.345")), Violation::NonNumeric);
    assert!(validate_document_number("1").is_ok());
    assert!(validate_document_number("1234567890").is_ok());
    assert_eq!(
      violation(validate_document_number("12345678901")),
      Violation::TooLong { max: 10 }
    );
  }

  #[test]
  fn non_ascii_digits_are_not_numeric() {
    assert_eq!(violation(validate_phone("٣٠٠١٢٣٤٥٦٧")), Violation::NonNumeric);
  }

  // ─── Email & photo ─────────────────────────────────────────────────────────

  #[test]
  fn email_rules() {
    assert!(validate_email("a@b.c").is_ok());
    assert_eq!(violation(validate_email("")), Violation::Empty);
    assert_eq!(violation(validate_email("a@b")), Violation::InvalidFormat);
    assert_eq!(violation(validate_email("a b@c.d")), Violation::InvalidFormat);
    assert_eq!(violation(validate_email("a@@b.c")), Violation::InvalidFormat);
  }

  #[test]
  fn photo_size_limit() {
    assert!(validate_photo(None).is_ok());
    assert!(validate_photo(Some(&upload(2 * 1024 * 1024))).is_ok());
    assert_eq!(
      violation(validate_photo(Some(&upload(2 * 1024 * 1024 + 1)))),
      Violation::FileTooLarge { limit: PHOTO_MAX_BYTES }
    );
  }

  // ─── Messages ──────────────────────────────────────────────────────────────

  #[test]
  fn messages_are_user_facing() {
    assert_eq!(
      validate_first_name("").unwrap_err().to_string(),
      "El primer nombre es obligatorio"
    );
    assert_eq!(
      validate_phone("123").unwrap_err().to_string(),
      "El celular debe tener exactamente 10 dígitos"
    );
    assert_eq!(
      validate_photo_size(PHOTO_MAX_BYTES + 1).unwrap_err().to_string(),
      "La foto no puede superar los 2 MB"
    );
  }

  #[test]
  fn dispatcher_skips_selection_fields() {
    assert!(Field::DocumentType.check("").is_ok());
    assert!(Field::BirthDate.check("").is_ok());
    assert!(Field::Gender.check("").is_ok());
    assert!(Field::Email.check("").is_err());
  }

  // ─── Whole record ──────────────────────────────────────────────────────────

  #[test]
  fn valid_record_has_no_errors() {
    assert!(validate_record(&valid_record()).is_empty());
  }

  #[test]
  fn missing_document_type_and_bad_email() {
    let record = PersonRecord {
      document_type: None,
      email: "no-es-correo".into(),
      ..valid_record()
    };
    let errors = validate_record(&record);
    let fields: Vec<Field> = errors.fields().collect();
    assert_eq!(fields, vec![Field::DocumentType, Field::Email]);
    assert_eq!(
      errors.get(Field::DocumentType).unwrap().to_string(),
      "Debe seleccionar un tipo de documento"
    );
    assert_eq!(errors.get(Field::Email).unwrap().violation, Violation::InvalidFormat);
  }

  #[test]
  fn empty_record_reports_every_required_field() {
    let errors = validate_record(&PersonRecord::default());
    let fields: Vec<Field> = errors.fields().collect();
    assert_eq!(
      fields,
      vec![
        Field::DocumentType,
        Field::DocumentNumber,
        Field::FirstName,
        Field::LastNames,
        Field::BirthDate,
        Field::Gender,
        Field::Email,
        Field::Phone,
      ]
    );
  }

  #[test]
  fn only_pending_photos_are_size_checked() {
    let mut record = valid_record();
    record.photo = Some(Photo::Remote("http://x/y.png".into()));
    assert!(validate_record(&record).is_empty());

    record.photo = Some(Photo::Pending(upload(3 * 1024 * 1024)));
    let errors = validate_record(&record);
    assert_eq!(errors.len(), 1);
    assert!(errors.contains(Field::Photo));
  }

  #[test]
  fn record_applies_or_clears() {
    let mut errors = FieldErrors::new();
    errors.record(Field::Phone, validate_phone("1"));
    assert!(errors.contains(Field::Phone));
    errors.record(Field::Phone, validate_phone("3001234567"));
    assert!(errors.is_empty());
  }
}
