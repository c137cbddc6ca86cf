//! Person detail pane, right panel.

use padron_core::{
  form::PersonForm,
  person::{Field, Photo},
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

/// Dashboard caption for each field.
fn caption(field: Field) -> &'static str {
  match field {
    Field::DocumentType => "Tipo de documento",
    Field::DocumentNumber => "Nro. documento",
    Field::FirstName => "Primer nombre",
    Field::SecondName => "Segundo nombre",
    Field::LastNames => "Apellidos",
    Field::BirthDate => "Fecha nacimiento",
    Field::Gender => "Género",
    Field::Email => "Correo",
    Field::Phone => "Celular",
    Field::Photo => "Foto",
  }
}

/// Render `form`'s record into `area`, skipping the first `scroll` lines.
pub fn draw(f: &mut Frame, area: Rect, form: &PersonForm, scroll: usize) {
  let record = form.record();
  let block = Block::default()
    .title(format!(" {} ", record.full_name()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));

  let lines: Vec<Line> = Field::ALL
    .into_iter()
    .map(|field| {
      let value = match field {
        Field::Photo => match &record.photo {
          Some(Photo::Remote(url)) => url.clone(),
          Some(Photo::Pending(upload)) => format!("(pendiente) {}", upload.file_name),
          None => "—".into(),
        },
        other => record.text(other).filter(|v| !v.is_empty()).unwrap_or_else(|| "—".into()),
      };
      Line::from(vec![
        Span::styled(
          format!("{:<18}", caption(field)),
          Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
      ])
    })
    .collect();

  let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);
  f.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}
