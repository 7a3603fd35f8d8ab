use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of handling a key event in an input component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
  /// Key was handled, continue input mode
  Consumed,
  /// Enter pressed, here's the submitted value
  Submitted(String),
  /// Escape pressed, input cancelled
  Cancelled,
  /// Key not handled, pass to next handler
  NotHandled,
}

/// Single-line text input. The cursor counts characters, not bytes, so
/// names like "Zoë" edit correctly.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  buffer: String,
  cursor: usize,
}

impl TextInput {
  /// Input pre-filled with `value`, cursor at the end
  pub fn with_value(value: impl Into<String>) -> Self {
    let buffer = value.into();
    let cursor = buffer.chars().count();
    Self { buffer, cursor }
  }

  pub fn value(&self) -> &str {
    &self.buffer
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
    self.cursor = 0;
  }

  /// Text before and after the cursor, for rendering
  pub fn split_at_cursor(&self) -> (&str, &str) {
    self.buffer.split_at(self.byte_offset(self.cursor))
  }

  fn len_chars(&self) -> usize {
    self.buffer.chars().count()
  }

  fn byte_offset(&self, char_idx: usize) -> usize {
    self
      .buffer
      .char_indices()
      .nth(char_idx)
      .map(|(i, _)| i)
      .unwrap_or(self.buffer.len())
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => InputResult::Cancelled,
      KeyCode::Enter => InputResult::Submitted(self.buffer.clone()),
      KeyCode::Backspace => {
        if self.cursor > 0 {
          self.cursor -= 1;
          let at = self.byte_offset(self.cursor);
          self.buffer.remove(at);
        }
        InputResult::Consumed
      }
      KeyCode::Delete => {
        if self.cursor < self.len_chars() {
          let at = self.byte_offset(self.cursor);
          self.buffer.remove(at);
        }
        InputResult::Consumed
      }
      KeyCode::Left => {
        self.cursor = self.cursor.saturating_sub(1);
        InputResult::Consumed
      }
      KeyCode::Right => {
        self.cursor = (self.cursor + 1).min(self.len_chars());
        InputResult::Consumed
      }
      KeyCode::Home => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::End => {
        self.cursor = self.len_chars();
        InputResult::Consumed
      }
      KeyCode::Char('a') if ctrl => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::Char('e') if ctrl => {
        self.cursor = self.len_chars();
        InputResult::Consumed
      }
      KeyCode::Char('u') if ctrl => {
        // Clear line before cursor
        let at = self.byte_offset(self.cursor);
        self.buffer.replace_range(..at, "");
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::Char('w') if ctrl => {
        // Delete word before cursor
        let at = self.byte_offset(self.cursor);
        let before = self.buffer[..at].trim_end();
        let start = before.rfind(' ').map(|i| i + 1).unwrap_or(0);
        self.buffer.replace_range(start..at, "");
        self.cursor = self.buffer[..start].chars().count();
        InputResult::Consumed
      }
      KeyCode::Char(_) if ctrl => InputResult::NotHandled,
      KeyCode::Char(c) => {
        let at = self.byte_offset(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
        InputResult::Consumed
      }
      _ => InputResult::NotHandled,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn ctrl_key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::CONTROL)
  }

  fn type_str(input: &mut TextInput, s: &str) {
    for c in s.chars() {
      input.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_basic_input() {
    let mut input = TextInput::default();
    assert!(input.is_empty());
    type_str(&mut input, "hi");
    assert_eq!(input.value(), "hi");
  }

  #[test]
  fn test_submit_and_cancel() {
    let mut input = TextInput::with_value("Ada");
    assert_eq!(
      input.handle_key(key(KeyCode::Enter)),
      InputResult::Submitted("Ada".to_string())
    );
    assert_eq!(input.handle_key(key(KeyCode::Esc)), InputResult::Cancelled);
  }

  #[test]
  fn test_with_value_places_cursor_at_end() {
    let mut input = TextInput::with_value("Lovelac");
    type_str(&mut input, "e");
    assert_eq!(input.value(), "Lovelace");
  }

  #[test]
  fn test_multibyte_editing() {
    let mut input = TextInput::with_value("Zoë");
    input.handle_key(key(KeyCode::Backspace));
    assert_eq!(input.value(), "Zo");

    type_str(&mut input, "ë Smith");
    input.handle_key(key(KeyCode::Home));
    input.handle_key(key(KeyCode::Right));
    input.handle_key(key(KeyCode::Delete));
    assert_eq!(input.value(), "Zë Smith");
    assert_eq!(input.split_at_cursor(), ("Z", "ë Smith"));
  }

  #[test]
  fn test_cursor_movement() {
    let mut input = TextInput::default();
    type_str(&mut input, "ac");
    input.handle_key(key(KeyCode::Left));
    type_str(&mut input, "b");
    assert_eq!(input.value(), "abc");
  }

  #[test]
  fn test_ctrl_u_clear_before_cursor() {
    let mut input = TextInput::with_value("hello world");
    for _ in 0..5 {
      input.handle_key(key(KeyCode::Left));
    }
    input.handle_key(ctrl_key(KeyCode::Char('u')));
    assert_eq!(input.value(), "world");
  }

  #[test]
  fn test_ctrl_w_deletes_word() {
    let mut input = TextInput::with_value("Ada Lovelace");
    input.handle_key(ctrl_key(KeyCode::Char('w')));
    assert_eq!(input.value(), "Ada ");
    type_str(&mut input, "King");
    assert_eq!(input.value(), "Ada King");
  }

  #[test]
  fn test_ctrl_chars_not_inserted() {
    let mut input = TextInput::default();
    assert_eq!(
      input.handle_key(ctrl_key(KeyCode::Char('c'))),
      InputResult::NotHandled
    );
    assert!(input.is_empty());
  }
}
