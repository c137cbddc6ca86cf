//! One-shot subcommands.
//!
//! Create and update drive a [`PersonForm`] exactly as the dashboard form
//! does: every provided value is validated on entry, the whole record is
//! validated on submit, and only an admissible record is sent.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use chrono::NaiveDate;
use clap::Args;
use padron_core::{
  Error as FormError,
  audit::{LogAction, LogEntry, LogFilter},
  form::PersonForm,
  person::{Field, PersonRecord, Photo, PhotoUpload},
  validation::FieldErrors,
};

use crate::client::{ApiClient, SearchDisabled};

// ─── Arguments ────────────────────────────────────────────────────────────────

/// Editable person fields. Enum fields take the dashboard labels, e.g.
/// `--document-type "Tarjeta de identidad"` or `--gender "No binario"`.
#[derive(Args, Debug, Default)]
pub struct PersonFields {
  /// `Cédula` or `Tarjeta de identidad`.
  #[arg(long)]
  pub document_type: Option<String>,
  #[arg(long)]
  pub first_name:    Option<String>,
  #[arg(long)]
  pub second_name:   Option<String>,
  #[arg(long)]
  pub last_names:    Option<String>,
  /// `YYYY-MM-DD`.
  #[arg(long)]
  pub birth_date:    Option<String>,
  /// `Masculino`, `Femenino`, `No binario` or `Prefiero no reportar`.
  #[arg(long)]
  pub gender:        Option<String>,
  #[arg(long)]
  pub email:         Option<String>,
  #[arg(long)]
  pub phone:         Option<String>,
  /// Image file to upload (at most 2 MB).
  #[arg(long, value_name = "FILE")]
  pub photo:         Option<PathBuf>,
  /// Remove the current photo.
  #[arg(long, conflicts_with = "photo")]
  pub remove_photo:  bool,
}

impl PersonFields {
  fn values(&self) -> Vec<(Field, &str)> {
    [
      (Field::DocumentType, &self.document_type),
      (Field::FirstName, &self.first_name),
      (Field::SecondName, &self.second_name),
      (Field::LastNames, &self.last_names),
      (Field::BirthDate, &self.birth_date),
      (Field::Gender, &self.gender),
      (Field::Email, &self.email),
      (Field::Phone, &self.phone),
    ]
    .into_iter()
    .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
    .collect()
  }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
  #[arg(long)]
  pub document_number: Option<String>,
  #[command(flatten)]
  pub fields:          PersonFields,
}

#[derive(Args, Debug, Default)]
pub struct LogsArgs {
  /// Action code, e.g. `PERSON_CREATED`.
  #[arg(long)]
  pub action:   Option<String>,
  /// Substring of the document number.
  #[arg(long)]
  pub document: Option<String>,
  /// First day to include (`YYYY-MM-DD`).
  #[arg(long)]
  pub from:     Option<NaiveDate>,
  /// Last day to include (`YYYY-MM-DD`).
  #[arg(long)]
  pub until:    Option<NaiveDate>,
  #[arg(long)]
  pub json:     bool,
}

impl LogsArgs {
  pub fn filter(&self) -> LogFilter {
    LogFilter {
      action:   self.action.as_deref().map(LogAction::from_code),
      document: self.document.clone(),
      from:     self.from,
      until:    self.until,
    }
  }
}

// ─── Form helpers ─────────────────────────────────────────────────────────────

fn media_type_for(path: &Path) -> Option<String> {
  let ext = path.extension()?.to_str()?.to_ascii_lowercase();
  let media = match ext.as_str() {
    "jpg" | "jpeg" => "image/jpeg",
    "png" => "image/png",
    "gif" => "image/gif",
    "webp" => "image/webp",
    _ => return None,
  };
  Some(media.to_owned())
}

pub fn read_photo(path: &Path) -> Result<PhotoUpload> {
  let bytes = std::fs::read(path).with_context(|| format!("reading photo {}", path.display()))?;
  let file_name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "foto".into());
  Ok(PhotoUpload { file_name, media_type: media_type_for(path), bytes: Bytes::from(bytes) })
}

/// Feed every provided value into `form`.
pub fn apply_fields(form: &mut PersonForm, fields: &PersonFields) -> Result<()> {
  for (field, value) in fields.values() {
    form.set_field(field, value)?;
  }
  if let Some(path) = &fields.photo {
    form.set_photo(read_photo(path)?)?;
  }
  if fields.remove_photo {
    form.clear_photo()?;
  }
  Ok(())
}

fn report_errors(errors: &FieldErrors) {
  for e in errors.iter() {
    eprintln!("  {}: {}", e.field, e);
  }
}

/// Submit `form`, printing field errors when it is not admissible.
pub fn submit(form: &mut PersonForm) -> Result<PersonRecord> {
  match form.submit() {
    Ok(record) => Ok(record.clone()),
    Err(FormError::Invalid(errors)) => {
      report_errors(&errors);
      bail!("Por favor corrija los errores en el formulario");
    }
    Err(e) => Err(e.into()),
  }
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_person_line(p: &PersonRecord) {
  let doc_type = p.document_type.as_ref().map(|d| d.label()).unwrap_or("-");
  println!("{:<12} {:<22} {:<40} {}", p.document_number, doc_type, p.full_name(), p.email);
}

fn print_person(p: &PersonRecord) {
  for field in Field::ALL {
    let value = match field {
      Field::Photo => match &p.photo {
        Some(Photo::Remote(url)) => url.clone(),
        Some(Photo::Pending(upload)) => format!("(pendiente) {}", upload.file_name),
        None => String::new(),
      },
      other => p.text(other).unwrap_or_default(),
    };
    println!("{:<18} {}", field.key(), value);
  }
}

fn print_log(entry: &LogEntry) {
  println!(
    "{}  {:<24} {:<12} {}",
    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
    entry.action.code(),
    entry.document_number.as_deref().unwrap_or("-"),
    entry.details
  );
}

// ─── Commands ─────────────────────────────────────────────────────────────────

pub async fn list(client: &ApiClient, json: bool) -> Result<()> {
  let people = client.list_persons().await?;
  if json {
    println!("{}", serde_json::to_string_pretty(&people)?);
    return Ok(());
  }
  if people.is_empty() {
    println!("No hay personas registradas");
  }
  for p in &people {
    print_person_line(p);
  }
  Ok(())
}

pub async fn show(client: &ApiClient, document: &str, json: bool) -> Result<()> {
  let Some(person) = client.get_person(document).await? else {
    bail!("Persona no encontrada");
  };
  if json {
    println!("{}", serde_json::to_string_pretty(&person)?);
  } else {
    print_person(&person);
  }
  Ok(())
}

pub async fn create(client: &ApiClient, args: CreateArgs) -> Result<()> {
  let mut form = PersonForm::create();
  if let Some(doc) = &args.document_number {
    form.set_field(Field::DocumentNumber, doc)?;
  }
  apply_fields(&mut form, &args.fields)?;
  let record = submit(&mut form)?;

  let message = client.create_person(&record).await?;
  println!("{message}");
  Ok(())
}

/// Apply `fields` to the stored person and save it. `None` when nothing
/// changed.
pub async fn update_record(
  client: &ApiClient,
  document: &str,
  fields: &PersonFields,
) -> Result<Option<(String, PersonRecord)>> {
  let Some(current) = client.get_person(document).await? else {
    bail!("Persona no encontrada");
  };
  let mut form = PersonForm::hydrate(current);
  form.begin_edit();
  apply_fields(&mut form, fields)?;
  if !form.is_dirty() {
    return Ok(None);
  }
  let record = submit(&mut form)?;

  let saved = client.update_person(&record).await?;
  form.accept_saved(saved.record.unwrap_or(record), saved.photo_url);
  Ok(Some((saved.message, form.record().clone())))
}

pub async fn update(client: &ApiClient, document: &str, fields: PersonFields) -> Result<()> {
  match update_record(client, document, &fields).await? {
    Some((message, record)) => {
      println!("{message}");
      print_person(&record);
    }
    None => println!("Sin cambios"),
  }
  Ok(())
}

pub async fn delete(client: &ApiClient, document: &str, yes: bool) -> Result<()> {
  if !yes {
    bail!("¿Está seguro de eliminar esta persona? Repita con --yes para confirmar");
  }
  let message = client.delete_person(document).await?;
  println!("{message}");
  Ok(())
}

pub async fn logs(client: &ApiClient, args: LogsArgs) -> Result<()> {
  let entries = client.list_logs().await?;
  let filter = args.filter();
  let hits = filter.apply(&entries);
  if args.json {
    println!("{}", serde_json::to_string_pretty(&hits)?);
    return Ok(());
  }
  for entry in &hits {
    print_log(entry);
  }
  println!("{} de {} registros", hits.len(), entries.len());
  Ok(())
}

pub async fn clear_logs(client: &ApiClient, yes: bool) -> Result<()> {
  if !yes {
    bail!("¿Está seguro de eliminar todos los logs? Repita con --yes para confirmar");
  }
  client.clear_logs().await?;
  println!("Logs eliminados exitosamente");
  Ok(())
}

pub async fn ask(client: &ApiClient, query: &str) -> Result<()> {
  if !client.features().await.rag_enabled {
    bail!(SearchDisabled);
  }
  let people = client.natural_search(query).await?;
  if people.is_empty() {
    println!("No se encontraron personas que coincidan con la búsqueda");
  }
  for p in &people {
    print_person_line(p);
  }
  Ok(())
}

pub async fn features(client: &ApiClient) -> Result<()> {
  let features = client.features().await;
  let state = if features.rag_enabled { "habilitada" } else { "deshabilitada" };
  println!("búsqueda natural: {state}");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn values_skip_missing_fields() {
    let fields = PersonFields {
      first_name: Some("Ana".into()),
      gender: Some("Femenino".into()),
      ..Default::default()
    };
    assert_eq!(fields.values(), vec![(Field::FirstName, "Ana"), (Field::Gender, "Femenino")]);
  }

  #[test]
  fn media_type_from_extension() {
    assert_eq!(media_type_for(Path::new("a/b.JPG")).as_deref(), Some("image/jpeg"));
    assert_eq!(media_type_for(Path::new("x.png")).as_deref(), Some("image/png"));
    assert_eq!(media_type_for(Path::new("x.bmp")), None);
    assert_eq!(media_type_for(Path::new("noext")), None);
  }

  #[test]
  fn logs_args_build_filter() {
    let args = LogsArgs {
      action: Some("PERSON_DELETED".into()),
      from: NaiveDate::from_ymd_opt(2024, 1, 1),
      ..Default::default()
    };
    let filter = args.filter();
    assert_eq!(filter.action, Some(LogAction::PersonDeleted));
    assert_eq!(filter.from, NaiveDate::from_ymd_opt(2024, 1, 1));
    assert!(filter.until.is_none());
  }

  #[test]
  fn submit_rejects_incomplete_form() {
    let mut form = PersonForm::create();
    let fields = PersonFields { email: Some("mal".into()), ..Default::default() };
    apply_fields(&mut form, &fields).unwrap();
    let err = submit(&mut form).unwrap_err();
    assert_eq!(err.to_string(), "Por favor corrija los errores en el formulario");
    assert!(form.errors().contains(Field::Email));
  }

  #[test]
  fn read_photo_loads_bytes() {
    let dir = std::env::temp_dir().join(format!("padron-photo-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("cara.png");
    std::fs::write(&path, [1u8, 2, 3, 4]).unwrap();

    let upload = read_photo(&path).unwrap();
    assert_eq!(upload.file_name, "cara.png");
    assert_eq!(upload.media_type.as_deref(), Some("image/png"));
    assert_eq!(upload.size(), 4);

    std::fs::remove_dir_all(&dir).ok();
  }
}
