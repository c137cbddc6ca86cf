//! Audit log entries written by the person services, and the filter the
//! dashboard applies over them.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// The operation a log entry records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogAction {
  PersonCreated,
  PersonsListRequested,
  PersonRetrieved,
  PersonUpdated,
  PersonDeleted,
  Unrecognized(String),
}

impl LogAction {
  pub const KNOWN: [LogAction; 5] = [
    LogAction::PersonCreated,
    LogAction::PersonsListRequested,
    LogAction::PersonRetrieved,
    LogAction::PersonUpdated,
    LogAction::PersonDeleted,
  ];

  /// The code the log service uses, e.g. `PERSON_CREATED`.
  pub fn code(&self) -> &str {
    match self {
      Self::PersonCreated => "PERSON_CREATED",
      Self::PersonsListRequested => "PERSONS_LIST_REQUESTED",
      Self::PersonRetrieved => "PERSON_RETRIEVED",
      Self::PersonUpdated => "PERSON_UPDATED",
      Self::PersonDeleted => "PERSON_DELETED",
      Self::Unrecognized(s) => s,
    }
  }

  pub fn from_code(code: &str) -> Self {
    Self::KNOWN
      .into_iter()
      .find(|a| a.code() == code)
      .unwrap_or_else(|| Self::Unrecognized(code.to_owned()))
  }

  /// Human-readable label for display.
  pub fn label(&self) -> &str {
    match self {
      Self::PersonCreated => "Persona creada",
      Self::PersonsListRequested => "Listado consultado",
      Self::PersonRetrieved => "Persona consultada",
      Self::PersonUpdated => "Persona actualizada",
      Self::PersonDeleted => "Persona eliminada",
      Self::Unrecognized(s) => s,
    }
  }
}

impl From<String> for LogAction {
  fn from(s: String) -> Self { Self::from_code(&s) }
}

impl From<LogAction> for String {
  fn from(a: LogAction) -> Self { a.code().to_owned() }
}

impl fmt::Display for LogAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.code()) }
}

/// One audit-log record, as served by the log service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:              Option<String>,
  pub action:          LogAction,
  #[serde(default)]
  pub document_number: Option<String>,
  pub timestamp:       DateTime<Utc>,
  /// Free-form payload attached by the emitting service.
  #[serde(default)]
  pub details:         serde_json::Value,
}

/// Criteria for narrowing a list of log entries. Every unset criterion
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
  pub action:   Option<LogAction>,
  /// Substring of the document number.
  pub document: Option<String>,
  /// First day included, from 00:00 UTC.
  pub from:     Option<NaiveDate>,
  /// Last day included, through 23:59:59.999 UTC.
  pub until:    Option<NaiveDate>,
}

impl LogFilter {
  pub fn is_empty(&self) -> bool { self == &Self::default() }

  pub fn matches(&self, entry: &LogEntry) -> bool {
    if let Some(action) = &self.action {
      if &entry.action != action {
        return false;
      }
    }

    if let Some(needle) = self.document.as_deref().filter(|d| !d.is_empty()) {
      match &entry.document_number {
        Some(doc) if doc.contains(needle) => {}
        _ => return false,
      }
    }

    if let Some(from) = self.from {
      if entry.timestamp < from.and_time(NaiveTime::MIN).and_utc() {
        return false;
      }
    }

    if let Some(until) = self.until {
      let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
      if entry.timestamp > until.and_time(end).and_utc() {
        return false;
      }
    }

    true
  }

  /// The entries that match, in their original order.
  pub fn apply<'a>(&self, entries: &'a [LogEntry]) -> Vec<&'a LogEntry> {
    entries.iter().filter(|e| self.matches(e)).collect()
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use serde_json::json;

  use super::*;

  fn entry(action: LogAction, doc: Option<&str>, ts: DateTime<Utc>) -> LogEntry {
    LogEntry {
      id: None,
      action,
      document_number: doc.map(str::to_owned),
      timestamp: ts,
      details: serde_json::Value::Null,
    }
  }

  fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
  }

  fn sample() -> Vec<LogEntry> {
    vec![
      entry(LogAction::PersonCreated, Some("1020304050"), at(2024, 3, 1, 8, 0, 0)),
      entry(LogAction::PersonsListRequested, None, at(2024, 3, 1, 9, 0, 0)),
      entry(LogAction::PersonUpdated, Some("1020304050"), at(2024, 3, 2, 23, 59, 59)),
      entry(LogAction::PersonDeleted, Some("99887766"), at(2024, 3, 3, 0, 0, 0)),
    ]
  }

  #[test]
  fn decodes_service_payload() {
    let raw = json!({
      "id": "abc",
      "action": "PERSON_CREATED",
      "documentNumber": "123",
      "timestamp": "2024-03-01T08:00:00Z",
      "details": { "firstName": "Ana" }
    });
    let e: LogEntry = serde_json::from_value(raw).unwrap();
    assert_eq!(e.action, LogAction::PersonCreated);
    assert_eq!(e.document_number.as_deref(), Some("123"));
    assert_eq!(e.details["firstName"], "Ana");
  }

  #[test]
  fn unknown_action_is_kept() {
    let a = LogAction::from_code("PERSON_ARCHIVED");
    assert_eq!(a, LogAction::Unrecognized("PERSON_ARCHIVED".into()));
    assert_eq!(String::from(a), "PERSON_ARCHIVED");
  }

  #[test]
  fn empty_filter_keeps_everything() {
    let logs = sample();
    assert!(LogFilter::default().is_empty());
    assert_eq!(LogFilter::default().apply(&logs).len(), 4);
  }

  #[test]
  fn filters_by_action() {
    let logs = sample();
    let filter = LogFilter { action: Some(LogAction::PersonUpdated), ..Default::default() };
    let hits = filter.apply(&logs);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].action, LogAction::PersonUpdated);
  }

  #[test]
  fn document_filter_is_substring_and_excludes_missing() {
    let logs = sample();
    let filter = LogFilter { document: Some("3040".into()), ..Default::default() };
    let hits = filter.apply(&logs);
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|e| e.document_number.as_deref() == Some("1020304050")));
  }

  #[test]
  fn date_bounds_are_inclusive_whole_days() {
    let logs = sample();
    let filter = LogFilter {
      from: NaiveDate::from_ymd_opt(2024, 3, 2),
      until: NaiveDate::from_ymd_opt(2024, 3, 2),
      ..Default::default()
    };
    let hits = filter.apply(&logs);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].timestamp, at(2024, 3, 2, 23, 59, 59));

    let from_third = LogFilter { from: NaiveDate::from_ymd_opt(2024, 3, 3), ..Default::default() };
    assert_eq!(from_third.apply(&logs).len(), 1);
  }
}
