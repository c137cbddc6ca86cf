//! Dashboard state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use padron_core::{
  audit::{LogAction, LogEntry, LogFilter},
  form::PersonForm,
  person::PersonRecord,
};

use crate::client::{ApiClient, Features};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the person list; right pane shows the selection, if any.
  PersonList,
  /// Focus on the person detail pane.
  PersonDetail,
  /// The audit log.
  Logs,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level dashboard state.
pub struct App {
  pub screen: Screen,

  /// Every person returned by the read service.
  pub persons: Vec<PersonRecord>,

  /// Current fuzzy-filter string (only edited while `filter_active`).
  pub filter: String,

  pub filter_active: bool,

  /// Cursor position within the *filtered* person list.
  pub list_cursor: usize,

  pub detail_scroll: usize,

  /// The person shown in the detail pane, held read-only.
  pub selected: Option<PersonForm>,

  /// Set after `x` in the detail pane; the next `y` deletes.
  pub confirm_delete: bool,

  pub logs: Vec<LogEntry>,

  pub log_filter: LogFilter,

  pub log_scroll: usize,

  pub features: Features,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::PersonList,
      persons: Vec::new(),
      filter: String::new(),
      filter_active: false,
      list_cursor: 0,
      detail_scroll: 0,
      selected: None,
      confirm_delete: false,
      logs: Vec::new(),
      log_filter: LogFilter::default(),
      log_scroll: 0,
      features: Features::default(),
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch every person. Failures land in the status bar.
  pub async fn load_persons(&mut self) {
    self.status_msg = "Cargando personas…".into();
    match self.client.list_persons().await {
      Ok(persons) => {
        self.persons = persons;
        self.list_cursor = 0;
        self.status_msg = String::new();
      }
      Err(e) => self.status_msg = format!("Error: {e:#}"),
    }
  }

  pub async fn load_logs(&mut self) {
    self.status_msg = "Cargando logs…".into();
    match self.client.list_logs().await {
      Ok(logs) => {
        self.logs = logs;
        self.log_scroll = 0;
        self.status_msg = String::new();
      }
      Err(e) => self.status_msg = format!("Error: {e:#}"),
    }
  }

  pub async fn load_features(&mut self) { self.features = self.client.features().await; }

  // ── Derived views ─────────────────────────────────────────────────────────

  /// Persons whose name or document number fuzzy-match the filter.
  pub fn filtered_persons(&self) -> Vec<&PersonRecord> {
    if self.filter.is_empty() {
      return self.persons.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .persons
      .iter()
      .filter(|p| {
        matcher.fuzzy_match(&p.full_name(), &self.filter).is_some()
          || matcher.fuzzy_match(&p.document_number, &self.filter).is_some()
      })
      .collect()
  }

  pub fn cursor_person(&self) -> Option<&PersonRecord> {
    self.filtered_persons().get(self.list_cursor).copied()
  }

  pub fn visible_logs(&self) -> Vec<&LogEntry> { self.log_filter.apply(&self.logs) }

  /// Step the log action filter: all → each known action → all.
  pub fn cycle_action_filter(&mut self) {
    let known = LogAction::KNOWN;
    self.log_filter.action = match &self.log_filter.action {
      None => Some(known[0].clone()),
      Some(current) => known
        .iter()
        .position(|a| a == current)
        .and_then(|i| known.get(i + 1))
        .cloned(),
    };
    self.log_scroll = 0;
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if self.filter_active {
      self.handle_filter_key(key).await;
      return true;
    }

    match self.screen {
      Screen::PersonList => self.handle_list_key(key).await,
      Screen::PersonDetail => self.handle_detail_key(key).await,
      Screen::Logs => self.handle_logs_key(key).await,
    }
  }

  async fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.list_cursor = 0;
        // Open straight away when exactly one person matches.
        let only = match self.filtered_persons().as_slice() {
          [one] => Some(one.document_number.clone()),
          _ => None,
        };
        if let Some(doc) = only {
          self.open_detail(&doc).await;
        }
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_persons().len();
        if self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(doc) = self.cursor_person().map(|p| p.document_number.clone()) {
          self.open_detail(&doc).await;
        }
      }

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.list_cursor = 0;
      }

      KeyCode::Char('r') => self.load_persons().await,

      KeyCode::Tab => {
        self.screen = Screen::Logs;
        if self.logs.is_empty() {
          self.load_logs().await;
        }
      }

      _ => {}
    }
    true
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    if self.confirm_delete {
      self.confirm_delete = false;
      if key.code == KeyCode::Char('y') {
        self.delete_selected().await;
      } else {
        self.status_msg = "Eliminación cancelada".into();
      }
      return true;
    }

    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.close_detail(),

      KeyCode::Down | KeyCode::Char('j') => self.detail_scroll += 1,
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }

      KeyCode::Char('x') => {
        self.confirm_delete = true;
        self.status_msg = "¿Está seguro de eliminar esta persona? [y/N]".into();
      }

      _ => {}
    }
    true
  }

  async fn handle_logs_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Tab | KeyCode::Esc => self.screen = Screen::PersonList,
      KeyCode::Down | KeyCode::Char('j') => {
        if self.log_scroll + 1 < self.visible_logs().len() {
          self.log_scroll += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.log_scroll = self.log_scroll.saturating_sub(1),
      KeyCode::Char('a') => self.cycle_action_filter(),
      KeyCode::Char('c') => {
        self.log_filter = LogFilter::default();
        self.log_scroll = 0;
      }
      KeyCode::Char('r') => self.load_logs().await,
      _ => {}
    }
    true
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  /// Show `document_number` in the detail pane, refreshing it from the read
  /// service and falling back to the listed copy.
  async fn open_detail(&mut self, document_number: &str) {
    let fresh = match self.client.get_person(document_number).await {
      Ok(found) => found,
      Err(e) => {
        self.status_msg = format!("Error: {e:#}");
        None
      }
    };
    let record = fresh.or_else(|| {
      self.persons.iter().find(|p| p.document_number == document_number).cloned()
    });
    match record {
      Some(record) => {
        self.selected = Some(PersonForm::hydrate(record));
        self.detail_scroll = 0;
        self.screen = Screen::PersonDetail;
      }
      None => self.status_msg = "Persona no encontrada".into(),
    }
  }

  fn close_detail(&mut self) {
    self.screen = Screen::PersonList;
    self.selected = None;
    self.confirm_delete = false;
  }

  async fn delete_selected(&mut self) {
    let Some(doc) = self.selected.as_ref().map(|f| f.record().document_number.clone()) else {
      return;
    };
    match self.client.delete_person(&doc).await {
      Ok(message) => {
        self.close_detail();
        self.load_persons().await;
        self.status_msg = message;
      }
      Err(e) => self.status_msg = format!("Error: {e:#}"),
    }
  }
}

#[cfg(test)]
mod tests {
  use crossterm::event::{KeyEventKind, KeyEventState};

  use super::*;
  use crate::client::ApiConfig;

  fn app_with(names: &[(&str, &str)]) -> App {
    let mut app = App::new(ApiClient::new(ApiConfig::default()).unwrap());
    app.persons = names
      .iter()
      .map(|(doc, first)| PersonRecord {
        document_number: doc.to_string(),
        first_name: first.to_string(),
        last_names: "Prueba".into(),
        ..Default::default()
      })
      .collect();
    app
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent {
      code,
      modifiers: KeyModifiers::NONE,
      kind: KeyEventKind::Press,
      state: KeyEventState::NONE,
    }
  }

  #[test]
  fn filter_matches_name_or_document() {
    let mut app = app_with(&[("111", "Andrea"), ("222", "Bruno"), ("333", "Camila")]);
    app.filter = "bru".into();
    let hits: Vec<_> = app.filtered_persons().iter().map(|p| p.first_name.clone()).collect();
    assert_eq!(hits, vec!["Bruno"]);

    app.filter = "333".into();
    assert_eq!(app.cursor_person().unwrap().first_name, "Camila");
  }

  #[test]
  fn action_filter_cycles_back_to_all() {
    let mut app = app_with(&[]);
    let mut seen = Vec::new();
    for _ in 0..=LogAction::KNOWN.len() {
      app.cycle_action_filter();
      seen.push(app.log_filter.action.clone());
    }
    assert_eq!(seen.first().unwrap(), &Some(LogAction::PersonCreated));
    assert_eq!(seen.last().unwrap(), &None);
  }

  #[tokio::test]
  async fn list_navigation_and_filter_typing() {
    let mut app = app_with(&[("1", "Ana"), ("2", "Beto")]);
    assert!(app.handle_key(key(KeyCode::Down)).await);
    assert_eq!(app.list_cursor, 1);
    assert!(app.handle_key(key(KeyCode::Down)).await);
    assert_eq!(app.list_cursor, 1);

    app.handle_key(key(KeyCode::Char('/'))).await;
    assert!(app.filter_active);
    app.handle_key(key(KeyCode::Char('b'))).await;
    assert_eq!(app.filter, "b");
    assert_eq!(app.list_cursor, 0);
    app.handle_key(key(KeyCode::Esc)).await;
    assert!(!app.filter_active);
    assert!(app.filter.is_empty());

    assert!(!app.handle_key(key(KeyCode::Char('q'))).await);
  }
}
