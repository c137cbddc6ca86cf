//! Audit log pane, full width.

use padron_core::audit::LogEntry;
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, Cell, Row, Table, TableState},
};

use crate::app::App;

fn row(entry: &LogEntry) -> Row<'static> {
  Row::new(vec![
    Cell::from(entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
    Cell::from(entry.action.label().to_string()),
    Cell::from(entry.document_number.clone().unwrap_or_else(|| "—".into())),
    Cell::from(entry.details.to_string()),
  ])
}

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let visible = app.visible_logs();
  let action = app.log_filter.action.as_ref().map(|a| a.label()).unwrap_or("todas");

  let block = Block::default()
    .title(format!(" Logs ({}/{})  acción: {action} ", visible.len(), app.logs.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Gray));

  let header = Row::new(vec!["Fecha", "Acción", "Documento", "Detalles"])
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let table = Table::new(visible.iter().map(|e| row(e)), [
    Constraint::Length(20),
    Constraint::Length(26),
    Constraint::Length(12),
    Constraint::Min(10),
  ])
  .header(header)
  .block(block)
  .row_highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

  let mut state = TableState::default();
  state.select((!visible.is_empty()).then_some(app.log_scroll));
  f.render_stateful_widget(table, area, &mut state);
}
