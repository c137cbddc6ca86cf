//! Edit state for one person record.
//!
//! A [`PersonForm`] holds the record being edited, the last saved snapshot,
//! the current per-field errors and the mode. Callers own the form and pass
//! it to whatever drives input; nothing here is global.

use chrono::NaiveDate;

use crate::{
  error::{Error, Result},
  person::{DocumentType, Field, Gender, PersonRecord, Photo, PhotoUpload},
  validation::{FieldError, FieldErrors, Violation, validate_photo, validate_record},
};

/// What the form currently allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
  /// A new record that has never been saved.
  Create,
  /// A saved record shown read-only.
  View,
  /// A saved record being edited.
  Edit,
}

#[derive(Debug, Clone)]
pub struct PersonForm {
  mode:     FormMode,
  record:   PersonRecord,
  saved:    Option<PersonRecord>,
  errors:   FieldErrors,
  /// Birth-date text that did not parse. The record keeps its last good
  /// date, so this is what `submit` checks.
  bad_date: Option<String>,
}

impl PersonForm {
  /// An empty form for a new record.
  pub fn create() -> Self {
    Self {
      mode:     FormMode::Create,
      record:   PersonRecord::default(),
      saved:    None,
      errors:   FieldErrors::new(),
      bad_date: None,
    }
  }

  /// A read-only form over a record fetched from the backend.
  pub fn hydrate(record: PersonRecord) -> Self {
    Self {
      mode:     FormMode::View,
      saved:    Some(record.clone()),
      record,
      errors:   FieldErrors::new(),
      bad_date: None,
    }
  }

  pub fn mode(&self) -> FormMode { self.mode }

  pub fn record(&self) -> &PersonRecord { &self.record }

  pub fn errors(&self) -> &FieldErrors { &self.errors }

  /// The last saved state, if the record has ever been saved.
  pub fn saved(&self) -> Option<&PersonRecord> { self.saved.as_ref() }

  /// The rejected birth-date text, if the last one entered did not parse.
  pub fn unparsed_birth_date(&self) -> Option<&str> { self.bad_date.as_deref() }

  /// Whether the working record differs from the saved snapshot. Rejected
  /// input counts as a change.
  pub fn is_dirty(&self) -> bool {
    if self.bad_date.is_some() {
      return true;
    }
    match &self.saved {
      Some(saved) => saved != &self.record,
      None => self.record != PersonRecord::default(),
    }
  }

  /// Switch a viewed record into edit mode. No-op in other modes.
  pub fn begin_edit(&mut self) {
    if self.mode == FormMode::View {
      self.mode = FormMode::Edit;
    }
  }

  fn ensure_editable(&self) -> Result<()> {
    match self.mode {
      FormMode::View => Err(Error::ReadOnly),
      FormMode::Create | FormMode::Edit => Ok(()),
    }
  }

  /// Apply a raw text value to `field`, validating it on the way in.
  ///
  /// The value is stored even when it fails its rule, so the caller can keep
  /// showing what was typed alongside the error.
  pub fn set_field(&mut self, field: Field, raw: &str) -> Result<()> {
    self.ensure_editable()?;
    if field == Field::DocumentNumber && self.saved.is_some() {
      return Err(Error::ImmutableField(field));
    }

    let check = field.check(raw);
    let record = &mut self.record;
    match field {
      Field::DocumentType => {
        record.document_type = (!raw.is_empty()).then(|| DocumentType::from_label(raw));
      }
      Field::DocumentNumber => record.document_number = raw.to_owned(),
      Field::FirstName => record.first_name = raw.to_owned(),
      Field::SecondName => record.second_name = raw.to_owned(),
      Field::LastNames => record.last_names = raw.to_owned(),
      Field::BirthDate => {
        self.bad_date = None;
        if raw.is_empty() {
          record.birth_date = None;
        } else {
          match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => record.birth_date = Some(date),
            Err(_) => {
              self.bad_date = Some(raw.to_owned());
              self.errors.insert(FieldError::new(field, Violation::InvalidFormat));
              return Ok(());
            }
          }
        }
      }
      Field::Gender => {
        record.gender = (!raw.is_empty()).then(|| Gender::from_label(raw));
      }
      Field::Email => record.email = raw.to_owned(),
      Field::Phone => record.phone = raw.to_owned(),
      Field::Photo => return Err(Error::NotText(field)),
    }

    self.errors.record(field, check);
    Ok(())
  }

  /// Select a new photo. An oversize photo is rejected: the error is
  /// recorded and the previous photo stays in place.
  pub fn set_photo(&mut self, upload: PhotoUpload) -> Result<()> {
    self.ensure_editable()?;
    match validate_photo(Some(&upload)) {
      Ok(()) => {
        self.errors.remove(Field::Photo);
        self.record.photo = Some(Photo::Pending(upload));
      }
      Err(e) => self.errors.insert(e),
    }
    Ok(())
  }

  pub fn clear_photo(&mut self) -> Result<()> {
    self.ensure_editable()?;
    self.errors.remove(Field::Photo);
    self.record.photo = None;
    Ok(())
  }

  /// Validate the whole record. On success the record is ready to send.
  pub fn submit(&mut self) -> Result<&PersonRecord> {
    self.ensure_editable()?;
    self.errors = validate_record(&self.record);
    if self.bad_date.is_some() {
      self.errors.insert(FieldError::new(Field::BirthDate, Violation::InvalidFormat));
    }
    if self.errors.is_empty() {
      Ok(&self.record)
    } else {
      Err(Error::Invalid(self.errors.clone()))
    }
  }

  /// Drop unsaved changes.
  pub fn cancel(&mut self) {
    self.errors.clear();
    self.bad_date = None;
    match &self.saved {
      Some(saved) => {
        self.record = saved.clone();
        self.mode = FormMode::View;
      }
      None => self.record = PersonRecord::default(),
    }
  }

  /// Replace the form's contents with the record the backend returned after
  /// a successful save.
  ///
  /// When the response carries no photo, the form's current remote photo is
  /// kept, then `uploaded_url` (where the service stored an upload) is used.
  /// A pending upload is only kept when the service reports no location
  /// for it.
  pub fn accept_saved(&mut self, mut record: PersonRecord, uploaded_url: Option<String>) {
    if record.photo.is_none() {
      let current = self.record.photo.take();
      let uploaded = uploaded_url.filter(|u| !u.is_empty()).map(Photo::Remote);
      record.photo = match current {
        Some(Photo::Remote(url)) => Some(Photo::Remote(url)),
        pending => uploaded.or(pending),
      };
    }
    self.saved = Some(record.clone());
    self.record = record;
    self.errors.clear();
    self.bad_date = None;
    self.mode = FormMode::View;
  }
}

impl Default for PersonForm {
  fn default() -> Self { Self::create() }
}
