//! The person record as the backend services exchange it, and the mapping
//! to and from [`PersonRecord`].

use chrono::NaiveDate;
use padron_core::person::{DocumentType, Field, Gender, PersonRecord, Photo};
use serde::{Deserialize, Deserializer, Serialize};

use crate::dictionary::{DOCUMENT_TYPES, Direction, GENDERS};

// ─── Wire record ─────────────────────────────────────────────────────────────

/// A person in the backend's vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePerson {
  #[serde(default, deserialize_with = "opaque_id", skip_serializing_if = "Option::is_none")]
  pub id:              Option<String>,
  #[serde(default, deserialize_with = "text")]
  pub first_name:      String,
  #[serde(default, deserialize_with = "text")]
  pub second_name:     String,
  #[serde(default, deserialize_with = "text")]
  pub last_names:      String,
  /// `YYYY-MM-DD`; some services return a full timestamp instead.
  #[serde(default, deserialize_with = "text")]
  pub birth_date:      String,
  #[serde(default, deserialize_with = "text")]
  pub gender:          String,
  #[serde(default, deserialize_with = "text")]
  pub email:           String,
  #[serde(default, deserialize_with = "text")]
  pub phone:           String,
  #[serde(default, deserialize_with = "text")]
  pub document_number: String,
  #[serde(default, deserialize_with = "text")]
  pub document_type:   String,
  #[serde(default)]
  pub photo:           Option<String>,
  /// Where the upload service reports the stored photo. Read-only.
  #[serde(rename = "photoURL", default, skip_serializing)]
  pub photo_url:       Option<String>,
}

/// A scalar the services may send as a string or a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
  Text(String),
  Number(serde_json::Number),
}

impl From<Scalar> for String {
  fn from(s: Scalar) -> Self {
    match s {
      Scalar::Text(t) => t,
      Scalar::Number(n) => n.to_string(),
    }
  }
}

/// Text field: `null` reads as `""`.
fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
  Ok(Option::<Scalar>::deserialize(d)?.map(String::from).unwrap_or_default())
}

fn opaque_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
  Ok(Option::<Scalar>::deserialize(d)?.map(String::from))
}

/// The wire key for a canonical field.
pub fn wire_key(field: Field) -> &'static str {
  match field {
    Field::DocumentType => "documentType",
    Field::DocumentNumber => "documentNumber",
    Field::FirstName => "firstName",
    Field::SecondName => "secondName",
    Field::LastNames => "lastNames",
    Field::BirthDate => "birthDate",
    Field::Gender => "gender",
    Field::Email => "email",
    Field::Phone => "phone",
    Field::Photo => "photoURL",
  }
}

impl WirePerson {
  /// Text parts of a create/update multipart body, in submission order.
  /// The photo, when there is a new one, travels as a separate file part
  /// named [`wire_key`]`(Field::Photo)`.
  pub fn form_fields(&self) -> Vec<(&'static str, String)> {
    vec![
      (wire_key(Field::FirstName), self.first_name.clone()),
      (wire_key(Field::SecondName), self.second_name.clone()),
      (wire_key(Field::LastNames), self.last_names.clone()),
      (wire_key(Field::BirthDate), self.birth_date.clone()),
      (wire_key(Field::Gender), self.gender.clone()),
      (wire_key(Field::Email), self.email.clone()),
      (wire_key(Field::Phone), self.phone.clone()),
      (wire_key(Field::DocumentNumber), self.document_number.clone()),
      (wire_key(Field::DocumentType), self.document_type.clone()),
    ]
  }
}

// ─── Canonical → wire ────────────────────────────────────────────────────────

/// Translate a canonical record into the backend's shape.
///
/// A pending photo upload yields `photo: None`; only remote references are
/// representable in the record itself.
pub fn to_wire(record: &PersonRecord) -> WirePerson {
  let document_type = record
    .document_type
    .as_ref()
    .map(|d| DOCUMENT_TYPES.translate(d.label(), Direction::ToWire).to_owned())
    .unwrap_or_default();
  let gender = record
    .gender
    .as_ref()
    .map(|g| GENDERS.translate(g.label(), Direction::ToWire).to_owned())
    .unwrap_or_default();

  WirePerson {
    id: record.id.clone(),
    first_name: record.first_name.clone(),
    second_name: record.second_name.clone(),
    last_names: record.last_names.clone(),
    birth_date: record.birth_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
    gender,
    email: record.email.clone(),
    phone: record.phone.clone(),
    document_number: record.document_number.clone(),
    document_type,
    photo: record.photo.as_ref().and_then(Photo::as_remote).map(str::to_owned),
    photo_url: None,
  }
}

// ─── Wire → canonical ────────────────────────────────────────────────────────

/// Parse a backend date. Accepts `YYYY-MM-DD` alone or as the prefix of a
/// longer timestamp.
fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  let head = raw.get(..10).unwrap_or(raw);
  match NaiveDate::parse_from_str(head, "%Y-%m-%d") {
    Ok(date) => Some(date),
    Err(e) => {
      tracing::warn!(value = raw, error = %e, "discarding unparseable birth date");
      None
    }
  }
}

/// Translate a backend record into the canonical shape.
pub fn from_wire(wire: WirePerson) -> PersonRecord {
  let document_type = (!wire.document_type.is_empty()).then(|| {
    DocumentType::from_label(DOCUMENT_TYPES.translate(&wire.document_type, Direction::FromWire))
  });
  let gender = (!wire.gender.is_empty())
    .then(|| Gender::from_label(GENDERS.translate(&wire.gender, Direction::FromWire)));

  let photo = wire
    .photo
    .filter(|p| !p.is_empty())
    .or(wire.photo_url.filter(|p| !p.is_empty()))
    .map(Photo::Remote);

  PersonRecord {
    id: wire.id,
    document_type,
    document_number: wire.document_number,
    first_name: wire.first_name,
    second_name: wire.second_name,
    last_names: wire.last_names,
    birth_date: parse_birth_date(&wire.birth_date),
    gender,
    email: wire.email,
    phone: wire.phone,
    photo,
  }
}

impl From<&PersonRecord> for WirePerson {
  fn from(record: &PersonRecord) -> Self { to_wire(record) }
}

impl From<WirePerson> for PersonRecord {
  fn from(wire: WirePerson) -> Self { from_wire(wire) }
}
