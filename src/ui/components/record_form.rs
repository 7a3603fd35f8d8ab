use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::forms::FieldSpec;
use crate::ui::renderfns::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by the form that the parent view needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// Enter pressed; one value per field, in field order
  Submitted(Vec<String>),
  Cancelled,
}

/// Modal create/edit form over a fixed list of fields
#[derive(Debug, Clone)]
pub struct RecordForm {
  title: String,
  fields: &'static [FieldSpec],
  inputs: Vec<TextInput>,
  focus: usize,
  error: Option<String>,
  pending: bool,
}

impl RecordForm {
  pub fn new(title: impl Into<String>, fields: &'static [FieldSpec], values: Vec<String>) -> Self {
    let mut values = values.into_iter();
    let inputs = fields
      .iter()
      .map(|_| TextInput::with_value(values.next().unwrap_or_default()))
      .collect();
    Self {
      title: title.into(),
      fields,
      inputs,
      focus: 0,
      error: None,
      pending: false,
    }
  }

  pub fn values(&self) -> Vec<String> {
    self.inputs.iter().map(|i| i.value().to_string()).collect()
  }

  #[cfg(test)]
  pub fn focus(&self) -> usize {
    self.focus
  }

  #[cfg(test)]
  pub fn is_pending(&self) -> bool {
    self.pending
  }

  /// While pending, Enter and Esc are ignored so only one write is in flight
  /// and the form outlives it
  pub fn set_pending(&mut self, pending: bool) {
    self.pending = pending;
  }

  /// Show a validation message, focusing the named field if present
  pub fn set_error(&mut self, field: Option<&str>, message: impl Into<String>) {
    if let Some(index) = field.and_then(|name| self.fields.iter().position(|f| f.name == name)) {
      self.focus = index;
    }
    self.error = Some(message.into());
  }

  #[cfg(test)]
  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  fn move_focus(&mut self, forward: bool) {
    let count = self.inputs.len();
    if count == 0 {
      return;
    }
    self.focus = if forward {
      (self.focus + 1) % count
    } else {
      (self.focus + count - 1) % count
    };
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    if self.pending {
      return KeyResult::Handled;
    }
    match key.code {
      KeyCode::Esc => return KeyResult::Event(FormEvent::Cancelled),
      KeyCode::Enter => return KeyResult::Event(FormEvent::Submitted(self.values())),
      KeyCode::Tab | KeyCode::Down => {
        self.move_focus(true);
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.move_focus(false);
        return KeyResult::Handled;
      }
      _ => {}
    }

    if let Some(input) = self.inputs.get_mut(self.focus) {
      if input.handle_key(key) == InputResult::Consumed {
        self.error = None;
      }
    }
    // The form is modal: nothing leaks to the page underneath
    KeyResult::Handled
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let height = (self.fields.len() as u16) * 2 + 5;
    let overlay_area = centered_rect(56, height, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines = Vec::new();
    for (index, (spec, input)) in self.fields.iter().zip(&self.inputs).enumerate() {
      let focused = index == self.focus;
      let label_style = if focused {
        Style::default().fg(Color::Cyan).bold()
      } else {
        Style::default().fg(Color::DarkGray)
      };
      let mut label = vec![Span::styled(spec.label, label_style)];
      if spec.required {
        label.push(Span::styled(" *", Style::default().fg(Color::Red)));
      }
      lines.push(Line::from(label));

      let (before, after) = input.split_at_cursor();
      let mut value = vec![Span::raw("  "), Span::raw(before)];
      if focused {
        value.push(Span::styled("_", Style::default().fg(Color::Yellow)));
      }
      value.push(Span::raw(after));
      if input.is_empty() && !spec.kind.hint().is_empty() {
        value.push(Span::styled(spec.kind.hint(), Style::default().fg(Color::DarkGray)));
      }
      lines.push(Line::from(value));
    }

    lines.push(Line::raw(""));
    if let Some(error) = &self.error {
      lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red)));
    } else if self.pending {
      lines.push(Line::styled("Saving...", Style::default().fg(Color::Yellow)));
    } else {
      lines.push(Line::styled(
        "Enter save  Tab next field  Esc cancel",
        Style::default().fg(Color::DarkGray),
      ));
    }

    frame.render_widget(Paragraph::new(lines), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::JobTitle;
  use crate::forms::Editable;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn form() -> RecordForm {
    RecordForm::new(
      "New job title",
      JobTitle::fields(),
      vec!["Engineer".to_string()],
    )
  }

  #[test]
  fn test_missing_values_start_empty() {
    let form = form();
    assert_eq!(form.values(), vec!["Engineer", "", "", ""]);
  }

  #[test]
  fn test_typing_goes_to_focused_field() {
    let mut form = form();
    form.handle_key(key(KeyCode::Tab));
    for c in "Engineering".chars() {
      form.handle_key(key(KeyCode::Char(c)));
    }
    assert_eq!(form.values()[1], "Engineering");
  }

  #[test]
  fn test_focus_wraps() {
    let mut form = form();
    form.handle_key(key(KeyCode::BackTab));
    assert_eq!(form.focus(), 3);
    form.handle_key(key(KeyCode::Tab));
    assert_eq!(form.focus(), 0);
  }

  #[test]
  fn test_submit_ignored_while_pending() {
    let mut form = form();
    assert!(matches!(
      form.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(FormEvent::Submitted(_))
    ));

    form.set_pending(true);
    assert_eq!(form.handle_key(key(KeyCode::Enter)), KeyResult::Handled);
    assert_eq!(form.handle_key(key(KeyCode::Esc)), KeyResult::Handled);
    form.handle_key(key(KeyCode::Char('x')));
    assert_eq!(form.values()[0], "Engineer");

    form.set_pending(false);
    assert_eq!(
      form.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(FormEvent::Cancelled)
    );
  }

  #[test]
  fn test_error_focuses_field_and_clears_on_edit() {
    let mut form = form();
    form.set_error(Some("max_salary"), "max_salary: must be a non-negative number");
    assert_eq!(form.focus(), 3);
    assert!(form.error().is_some());

    form.handle_key(key(KeyCode::Char('1')));
    assert!(form.error().is_none());
  }
}
