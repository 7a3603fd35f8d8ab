use super::KeyResult;
use crate::ui::renderfns::centered_rect;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmEvent {
  Confirmed,
  Cancelled,
}

/// Yes/no dialog guarding a destructive action
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
  message: String,
  pending: bool,
}

impl ConfirmDialog {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      pending: false,
    }
  }

  #[cfg(test)]
  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn set_pending(&mut self, pending: bool) {
    self.pending = pending;
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ConfirmEvent> {
    match key.code {
      KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter if !self.pending => {
        KeyResult::Event(ConfirmEvent::Confirmed)
      }
      KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc if !self.pending => {
        KeyResult::Event(ConfirmEvent::Cancelled)
      }
      _ => KeyResult::Handled,
    }
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let overlay_area = centered_rect(50, 7, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red))
      .title(" Confirm Delete ");

    let footer = if self.pending {
      Line::styled("Deleting...", Style::default().fg(Color::Yellow))
    } else {
      Line::from(vec![
        Span::styled("<y>", Style::default().fg(Color::Red).bold()),
        Span::styled(" delete   ", Style::default().fg(Color::DarkGray)),
        Span::styled("<n>", Style::default().fg(Color::Cyan)),
        Span::styled(" cancel", Style::default().fg(Color::DarkGray)),
      ])
    };

    let text = vec![Line::raw(self.message.clone()), Line::raw(""), footer];
    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, overlay_area);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_confirm_and_cancel_keys() {
    let mut dialog = ConfirmDialog::new("Delete?");
    assert_eq!(
      dialog.handle_key(key(KeyCode::Char('y'))),
      KeyResult::Event(ConfirmEvent::Confirmed)
    );
    assert_eq!(
      dialog.handle_key(key(KeyCode::Enter)),
      KeyResult::Event(ConfirmEvent::Confirmed)
    );
    assert_eq!(
      dialog.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(ConfirmEvent::Cancelled)
    );
    assert_eq!(dialog.handle_key(key(KeyCode::Char('x'))), KeyResult::Handled);
  }

  #[test]
  fn test_pending_blocks_second_delete() {
    let mut dialog = ConfirmDialog::new("Delete?");
    dialog.set_pending(true);
    assert_eq!(dialog.handle_key(key(KeyCode::Char('y'))), KeyResult::Handled);
  }

  #[test]
  fn test_cancel_ignored_while_deleting() {
    let mut dialog = ConfirmDialog::new("Delete?");
    dialog.set_pending(true);
    assert_eq!(dialog.handle_key(key(KeyCode::Esc)), KeyResult::Handled);
    assert_eq!(dialog.handle_key(key(KeyCode::Char('n'))), KeyResult::Handled);

    dialog.set_pending(false);
    assert_eq!(
      dialog.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(ConfirmEvent::Cancelled)
    );
  }
}
