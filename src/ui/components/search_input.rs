use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Events emitted by search input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Filter text changed (on each keystroke, and cleared on cancel)
  Changed,
  /// Search submitted (input closed, filter persists)
  Submitted,
}

/// `/` filter for list pages: case-insensitive substring match.
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Whether the user is typing a query
  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn query(&self) -> &str {
    self.input.value()
  }

  /// Whether a filter is applied, typed or submitted
  pub fn is_filtering(&self) -> bool {
    !self.input.value().trim().is_empty()
  }

  pub fn matches(&self, text: &str) -> bool {
    let query = self.input.value().trim();
    query.is_empty() || text.to_lowercase().contains(&query.to_lowercase())
  }

  /// Call this regardless of active state - it handles activation too
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.active {
      return match key.code {
        KeyCode::Char('/') => {
          self.active = true;
          self.input.clear();
          KeyResult::Event(SearchEvent::Changed)
        }
        // Esc on an applied filter clears it before it means "back"
        KeyCode::Esc if self.is_filtering() => {
          self.input.clear();
          KeyResult::Event(SearchEvent::Changed)
        }
        _ => KeyResult::NotHandled,
      };
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(_) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted)
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(SearchEvent::Changed)
      }
      InputResult::Consumed => KeyResult::Event(SearchEvent::Changed),
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the search line along the bottom of `area` while typing or
  /// while a filter is applied
  pub fn render(&self, frame: &mut Frame, area: Rect) {
    if (!self.active && !self.is_filtering()) || area.height < 3 {
      return;
    }

    let line_area = Rect::new(
      area.x + 1,
      area.y + area.height - 2,
      area.width.saturating_sub(2),
      1,
    );

    let (before, after) = self.input.split_at_cursor();
    let mut spans = vec![Span::styled("/", Style::default().fg(Color::Yellow)), Span::raw(before)];
    if self.active {
      spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::raw(after));
    if !self.active {
      spans.push(Span::styled(
        "  (Esc clears)",
        Style::default().fg(Color::DarkGray),
      ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, line_area);
  }
}
