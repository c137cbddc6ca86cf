//! Async HTTP client for the person, log and search services.

use std::{fmt, time::Duration};

use anyhow::{Context, Result, anyhow, bail};
use padron_core::{
  audit::LogEntry,
  person::{Field, PersonRecord, Photo},
};
use padron_wire::{Envelope, WirePerson, from_wire, to_wire, wire_key};
use reqwest::{
  Client, Response, StatusCode,
  multipart::{Form, Part},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Base URL of every backend service. Each service is a separate process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
  pub create:   String,
  pub read:     String,
  pub update:   String,
  pub delete:   String,
  pub logs:     String,
  pub rag:      String,
  pub features: String,
}

impl Default for Endpoints {
  fn default() -> Self {
    Self {
      create:   "http://localhost:3001/persons".into(),
      read:     "http://localhost:3002/persons".into(),
      update:   "http://localhost:3003/persons".into(),
      delete:   "http://localhost:3004/persons".into(),
      logs:     "http://localhost:3005/logs".into(),
      rag:      "http://localhost:3006/rag".into(),
      features: "http://localhost:3006/config/features".into(),
    }
  }
}

/// Connection settings for the backend services.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub endpoints: Endpoints,
  pub timeout:   Duration,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self { endpoints: Endpoints::default(), timeout: Duration::from_secs(30) }
  }
}

// ─── Response types ───────────────────────────────────────────────────────────

/// Optional capabilities advertised by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Features {
  #[serde(default)]
  pub rag_enabled: bool,
}

/// The outcome of a successful update.
#[derive(Debug, Clone)]
pub struct Saved {
  pub message:   String,
  /// The stored record, when the service echoes it back. Its photo comes
  /// from the `photo` field only.
  pub record:    Option<PersonRecord>,
  /// Where the service stored an uploaded photo (`photoURL`).
  pub photo_url: Option<String>,
}

/// The natural-language search has been switched off on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchDisabled;

impl fmt::Display for SearchDisabled {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("La función de búsqueda natural ha sido deshabilitada")
  }
}

impl std::error::Error for SearchDisabled {}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
  Bare(Vec<WirePerson>),
  Wrapped(Envelope<Vec<WirePerson>>),
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async HTTP client for the person services.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

fn member_url(base: &str, document_number: &str) -> String {
  format!("{}/{}", base.trim_end_matches('/'), document_number)
}

/// Read a response body as an [`Envelope`], turning an error status into an
/// error carrying the service's own message.
async fn envelope<T: DeserializeOwned>(resp: Response, what: &str) -> Result<Envelope<T>> {
  let status = resp.status();
  let body = resp
    .bytes()
    .await
    .with_context(|| format!("reading {what} response"))?;
  Ok(Envelope::decode(&body, status.is_success(), &format!("{what} → {status}"))?)
}

/// Build the multipart body the create and update services expect.
fn person_form(record: &PersonRecord) -> Result<Form> {
  let mut form = Form::new();
  for (key, value) in to_wire(record).form_fields() {
    form = form.text(key, value);
  }
  if let Some(upload) = record.photo.as_ref().and_then(Photo::as_pending) {
    let mut part = Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name.clone());
    if let Some(media_type) = &upload.media_type {
      part = part
        .mime_str(media_type)
        .with_context(|| format!("invalid photo media type {media_type:?}"))?;
    }
    form = form.part(wire_key(Field::Photo), part);
  }
  Ok(form)
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  // ── Persons ───────────────────────────────────────────────────────────────

  /// `GET {read}`
  pub async fn list_persons(&self) -> Result<Vec<PersonRecord>> {
    let url = &self.config.endpoints.read;
    tracing::debug!(%url, "listing persons");
    let resp = self.client.get(url).send().await.context("GET persons failed")?;
    let env: Envelope<Vec<WirePerson>> = envelope(resp, "GET persons").await?;
    Ok(env.data.unwrap_or_default().into_iter().map(from_wire).collect())
  }

  /// `GET {read}/{document_number}`. `None` when no such person exists.
  pub async fn get_person(&self, document_number: &str) -> Result<Option<PersonRecord>> {
    let url = member_url(&self.config.endpoints.read, document_number);
    tracing::debug!(%url, "fetching person");
    let resp = self.client.get(&url).send().await.context("GET person failed")?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let env: Envelope<WirePerson> = envelope(resp, "GET person").await?;
    Ok(env.data.map(from_wire))
  }

  /// `POST {create}` as multipart. Returns the service's message.
  pub async fn create_person(&self, record: &PersonRecord) -> Result<String> {
    let url = &self.config.endpoints.create;
    tracing::info!(document = %record.document_number, "creating person");
    let resp = self
      .client
      .post(url)
      .multipart(person_form(record)?)
      .send()
      .await
      .context("POST persons failed")?;
    let env: Envelope<serde_json::Value> = envelope(resp, "POST persons").await?;
    Ok(env.message.unwrap_or_else(|| "Persona creada exitosamente".into()))
  }

  /// `PUT {update}/{document_number}` as multipart.
  pub async fn update_person(&self, record: &PersonRecord) -> Result<Saved> {
    let url = member_url(&self.config.endpoints.update, &record.document_number);
    tracing::info!(document = %record.document_number, "updating person");
    let resp = self
      .client
      .put(&url)
      .multipart(person_form(record)?)
      .send()
      .await
      .context("PUT person failed")?;
    let env: Envelope<WirePerson> = envelope(resp, "PUT person").await?;
    let (record, photo_url) = match env.data {
      Some(mut wire) => {
        let photo_url = wire.photo_url.take();
        (Some(from_wire(wire)), photo_url)
      }
      None => (None, None),
    };
    Ok(Saved {
      message: env.message.unwrap_or_else(|| "Persona actualizada exitosamente".into()),
      record,
      photo_url,
    })
  }

  /// `DELETE {delete}/{document_number}`.
  pub async fn delete_person(&self, document_number: &str) -> Result<String> {
    let url = member_url(&self.config.endpoints.delete, document_number);
    tracing::info!(document = %document_number, "deleting person");
    let resp = self.client.delete(&url).send().await.context("DELETE person failed")?;
    let env: Envelope<serde_json::Value> = envelope(resp, "DELETE person").await?;
    Ok(env.message.unwrap_or_else(|| "Persona eliminada exitosamente".into()))
  }

  // ── Logs ──────────────────────────────────────────────────────────────────

  /// `GET {logs}`
  pub async fn list_logs(&self) -> Result<Vec<LogEntry>> {
    let url = &self.config.endpoints.logs;
    let resp = self.client.get(url).send().await.context("GET logs failed")?;
    let env: Envelope<Vec<LogEntry>> = envelope(resp, "GET logs").await?;
    Ok(env.data.unwrap_or_default())
  }

  /// `DELETE {logs}`
  pub async fn clear_logs(&self) -> Result<()> {
    let url = &self.config.endpoints.logs;
    tracing::info!("clearing logs");
    let resp = self.client.delete(url).send().await.context("DELETE logs failed")?;
    let status = resp.status();
    if !status.is_success() {
      return Err(anyhow!("DELETE logs → {status}"));
    }
    Ok(())
  }

  // ── Features & search ─────────────────────────────────────────────────────

  /// `GET {features}`. Never fails: anything but a well-formed success means
  /// every optional feature is off.
  pub async fn features(&self) -> Features {
    let url = &self.config.endpoints.features;
    let resp = match self.client.get(url).send().await {
      Ok(resp) => resp,
      Err(e) => {
        tracing::warn!(%url, error = %e, "feature check failed; assuming disabled");
        return Features::default();
      }
    };
    if !resp.status().is_success() {
      tracing::warn!(%url, status = %resp.status(), "feature check rejected; assuming disabled");
      return Features::default();
    }
    match resp.json::<Features>().await {
      Ok(features) => features,
      Err(e) => {
        tracing::warn!(%url, error = %e, "malformed feature payload; assuming disabled");
        Features::default()
      }
    }
  }

  /// `POST {rag}` with a free-text query.
  ///
  /// A `403` is reported as [`SearchDisabled`] so callers can tell it apart
  /// from a failure.
  pub async fn natural_search(&self, query: &str) -> Result<Vec<PersonRecord>> {
    let query = query.trim();
    if query.is_empty() {
      bail!("Debe ingresar una consulta");
    }
    let url = &self.config.endpoints.rag;
    tracing::debug!(%url, query, "natural search");
    let resp = self
      .client
      .post(url)
      .json(&serde_json::json!({ "consulta": query }))
      .send()
      .await
      .context("POST rag failed")?;

    let status = resp.status();
    if status == StatusCode::FORBIDDEN {
      return Err(SearchDisabled.into());
    }
    if !status.is_success() {
      bail!("Error al realizar la búsqueda ({status})");
    }
    let people = match resp.json::<SearchResponse>().await.context("deserialising search results")? {
      SearchResponse::Bare(people) => people,
      SearchResponse::Wrapped(env) => env.data.unwrap_or_default(),
    };
    Ok(people.into_iter().map(from_wire).collect())
  }
}
