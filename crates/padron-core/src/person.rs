//! The canonical person record — what the dashboard works with.
//!
//! Field keys and enum labels use the dashboard's Spanish vocabulary. The
//! English wire vocabulary lives in `padron-wire`.

use std::fmt;

use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeStruct};

// ─── Field identifiers ───────────────────────────────────────────────────────

/// One editable field of a [`PersonRecord`]. Used as the key of every
/// validation error mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
  DocumentType,
  DocumentNumber,
  FirstName,
  SecondName,
  LastNames,
  BirthDate,
  Gender,
  Email,
  Phone,
  Photo,
}

impl Field {
  pub const ALL: [Field; 10] = [
    Field::DocumentType,
    Field::DocumentNumber,
    Field::FirstName,
    Field::SecondName,
    Field::LastNames,
    Field::BirthDate,
    Field::Gender,
    Field::Email,
    Field::Phone,
    Field::Photo,
  ];

  /// The canonical key, as used by the dashboard forms.
  pub fn key(self) -> &'static str {
    match self {
      Self::DocumentType => "tipo_documento",
      Self::DocumentNumber => "nro_documento",
      Self::FirstName => "primer_nombre",
      Self::SecondName => "segundo_nombre",
      Self::LastNames => "apellidos",
      Self::BirthDate => "fecha_nacimiento",
      Self::Gender => "genero",
      Self::Email => "correo",
      Self::Phone => "celular",
      Self::Photo => "foto",
    }
  }

  pub fn from_key(key: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|f| f.key() == key)
  }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.key())
  }
}

// ─── Enumerated labels ───────────────────────────────────────────────────────

/// Identity document kind.
///
/// `Unrecognized` carries any label outside the known set verbatim, so values
/// the backend adds later survive a read/write cycle unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentType {
  CitizenId,
  IdCard,
  Unrecognized(String),
}

impl DocumentType {
  pub const KNOWN: [DocumentType; 2] = [DocumentType::CitizenId, DocumentType::IdCard];

  pub fn label(&self) -> &str {
    match self {
      Self::CitizenId => "Cédula",
      Self::IdCard => "Tarjeta de identidad",
      Self::Unrecognized(s) => s,
    }
  }

  pub fn from_label(label: &str) -> Self {
    match label {
      "Cédula" => Self::CitizenId,
      "Tarjeta de identidad" => Self::IdCard,
      other => Self::Unrecognized(other.to_owned()),
    }
  }

  pub fn is_recognized(&self) -> bool { !matches!(self, Self::Unrecognized(_)) }
}

impl From<String> for DocumentType {
  fn from(s: String) -> Self { Self::from_label(&s) }
}

impl From<DocumentType> for String {
  fn from(d: DocumentType) -> Self { d.label().to_owned() }
}

impl fmt::Display for DocumentType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// Self-reported gender.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
  Male,
  Female,
  NonBinary,
  PreferNotToSay,
  Unrecognized(String),
}

impl Gender {
  pub const KNOWN: [Gender; 4] =
    [Gender::Male, Gender::Female, Gender::NonBinary, Gender::PreferNotToSay];

  pub fn label(&self) -> &str {
    match self {
      Self::Male => "Masculino",
      Self::Female => "Femenino",
      Self::NonBinary => "No binario",
      Self::PreferNotToSay => "Prefiero no reportar",
      Self::Unrecognized(s) => s,
    }
  }

  pub fn from_label(label: &str) -> Self {
    match label {
      "Masculino" => Self::Male,
      "Femenino" => Self::Female,
      "No binario" => Self::NonBinary,
      "Prefiero no reportar" => Self::PreferNotToSay,
      other => Self::Unrecognized(other.to_owned()),
    }
  }

  pub fn is_recognized(&self) -> bool { !matches!(self, Self::Unrecognized(_)) }
}

impl From<String> for Gender {
  fn from(s: String) -> Self { Self::from_label(&s) }
}

impl From<Gender> for String {
  fn from(g: Gender) -> Self { g.label().to_owned() }
}

impl fmt::Display for Gender {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

// ─── Photo ───────────────────────────────────────────────────────────────────

/// A local image selected for upload but not yet sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
  pub file_name:  String,
  /// MIME type, when known (e.g. `image/png`).
  pub media_type: Option<String>,
  pub bytes:      Bytes,
}

impl PhotoUpload {
  pub fn size(&self) -> u64 { self.bytes.len() as u64 }
}

/// A person's photo: either already stored by the backend, or awaiting
/// upload. Never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Photo {
  Remote(String),
  Pending(PhotoUpload),
}

impl Photo {
  pub fn as_remote(&self) -> Option<&str> {
    match self {
      Self::Remote(url) => Some(url),
      Self::Pending(_) => None,
    }
  }

  pub fn as_pending(&self) -> Option<&PhotoUpload> {
    match self {
      Self::Remote(_) => None,
      Self::Pending(upload) => Some(upload),
    }
  }
}

/// Remote photos serialize as their URL; pending uploads as a short summary
/// (the bytes themselves are never written out).
impl Serialize for Photo {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Self::Remote(url) => serializer.serialize_str(url),
      Self::Pending(upload) => {
        let mut s = serializer.serialize_struct("PhotoUpload", 3)?;
        s.serialize_field("file_name", &upload.file_name)?;
        s.serialize_field("media_type", &upload.media_type)?;
        s.serialize_field("size", &upload.size())?;
        s.end()
      }
    }
  }
}

impl<'de> Deserialize<'de> for Photo {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    String::deserialize(deserializer).map(Self::Remote)
  }
}

// ─── PersonRecord ────────────────────────────────────────────────────────────

/// The canonical person record.
///
/// Text fields use the empty string for "not provided", matching how the
/// dashboard forms hold raw input. `document_number` is the stable key used
/// by the update and delete services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
  /// Backend-assigned identifier, opaque to the dashboard.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:              Option<String>,
  #[serde(rename = "tipo_documento", default)]
  pub document_type:   Option<DocumentType>,
  #[serde(rename = "nro_documento", default)]
  pub document_number: String,
  #[serde(rename = "primer_nombre", default)]
  pub first_name:      String,
  #[serde(rename = "segundo_nombre", default)]
  pub second_name:     String,
  #[serde(rename = "apellidos", default)]
  pub last_names:      String,
  #[serde(rename = "fecha_nacimiento", default)]
  pub birth_date:      Option<NaiveDate>,
  #[serde(rename = "genero", default)]
  pub gender:          Option<Gender>,
  #[serde(rename = "correo", default)]
  pub email:           String,
  #[serde(rename = "celular", default)]
  pub phone:           String,
  #[serde(rename = "foto", default)]
  pub photo:           Option<Photo>,
}

impl PersonRecord {
  /// The raw text of `field` as a form would display it.
  ///
  /// Returns `None` for [`Field::Photo`], which has no text representation.
  pub fn text(&self, field: Field) -> Option<String> {
    let value = match field {
      Field::DocumentType => {
        self.document_type.as_ref().map(|d| d.label().to_owned()).unwrap_or_default()
      }
      Field::DocumentNumber => self.document_number.clone(),
      Field::FirstName => self.first_name.clone(),
      Field::SecondName => self.second_name.clone(),
      Field::LastNames => self.last_names.clone(),
      Field::BirthDate => {
        self.birth_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
      }
      Field::Gender => self.gender.as_ref().map(|g| g.label().to_owned()).unwrap_or_default(),
      Field::Email => self.email.clone(),
      Field::Phone => self.phone.clone(),
      Field::Photo => return None,
    };
    Some(value)
  }

  /// First name, second name and last names joined by single spaces.
  pub fn full_name(&self) -> String {
    [&self.first_name, &self.second_name, &self.last_names]
      .into_iter()
      .map(|s| s.trim())
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(" ")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn labels_round_trip_through_from_label() {
    for d in DocumentType::KNOWN {
      assert_eq!(DocumentType::from_label(d.label()), d);
    }
    for g in Gender::KNOWN {
      assert_eq!(Gender::from_label(g.label()), g);
    }
  }

  #[test]
  fn unknown_label_is_kept_verbatim() {
    let d = DocumentType::from_label("Pasaporte");
    assert_eq!(d, DocumentType::Unrecognized("Pasaporte".into()));
    assert_eq!(d.label(), "Pasaporte");
    assert!(!d.is_recognized());
  }

  #[test]
  fn field_keys_are_unique_and_reversible() {
    for f in Field::ALL {
      assert_eq!(Field::from_key(f.key()), Some(f));
    }
    assert_eq!(Field::from_key("email"), None);
  }

  #[test]
  fn canonical_json_uses_dashboard_keys() {
    let record = PersonRecord {
      document_type: Some(DocumentType::CitizenId),
      document_number: "1020304050".into(),
      first_name: "María".into(),
      gender: Some(Gender::Female),
      birth_date: NaiveDate::from_ymd_opt(1990, 5, 1),
      photo: Some(Photo::Remote("http://img/1.png".into())),
      ..Default::default()
    };
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["tipo_documento"], "Cédula");
    assert_eq!(json["genero"], "Femenino");
    assert_eq!(json["fecha_nacimiento"], "1990-05-01");
    assert_eq!(json["foto"], "http://img/1.png");
    assert!(json.get("id").is_none());

    let back: PersonRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, record);
  }

  #[test]
  fn pending_photo_serializes_as_summary() {
    let photo = Photo::Pending(PhotoUpload {
      file_name:  "me.jpg".into(),
      media_type: Some("image/jpeg".into()),
      bytes:      Bytes::from_static(&[1, 2, 3]),
    });
    let json = serde_json::to_value(&photo).unwrap();
    assert_eq!(json["file_name"], "me.jpg");
    assert_eq!(json["size"], 3);
  }

  #[test]
  fn full_name_skips_empty_parts() {
    let record = PersonRecord {
      first_name: "Ana".into(),
      last_names: "Gómez Ruiz".into(),
      ..Default::default()
    };
    assert_eq!(record.full_name(), "Ana Gómez Ruiz");
  }
}
