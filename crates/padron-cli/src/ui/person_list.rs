//! Person list pane, left panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Screen};

/// Render the person list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_persons();
  let total = app.persons.len();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Personas ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Personas ({total}) ")
  };

  // Dim the border while the detail pane has focus.
  let border = if app.screen == Screen::PersonDetail { Color::DarkGray } else { Color::Gray };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|p| {
      ListItem::new(Line::from(vec![
        Span::styled(format!("{:<11} ", p.document_number), Style::default().fg(Color::DarkGray)),
        Span::raw(p.full_name()),
      ]))
    })
    .collect();

  let mut inner = block.inner(area);
  f.render_widget(block, area);

  if (app.filter_active || !app.filter.is_empty()) && inner.height > 2 {
    let filter_area = Rect { y: inner.y + inner.height - 1, height: 1, ..inner };
    inner.height -= 1;

    let text = if app.filter_active { format!("/{}_", app.filter) } else { format!("/{}", app.filter) };
    f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Yellow)), filter_area);
  }

  if items.is_empty() {
    f.render_widget(
      Paragraph::new("No hay personas registradas").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let mut state = ListState::default();
  state.select(Some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}
