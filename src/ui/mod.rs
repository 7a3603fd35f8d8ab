pub mod components;
pub mod records;
pub mod renderfns;
pub mod view;
pub mod views;

use ratatui::prelude::*;
use ratatui::widgets::TableState;

/// Screen regions: header, content, footer
pub struct PageLayout {
  pub header: Rect,
  pub content: Rect,
  pub footer: Rect,
}

impl PageLayout {
  pub fn split(area: Rect) -> Self {
    let [header, content, footer] = Layout::vertical([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Breadcrumb
    ])
    .areas(area);
    Self {
      header,
      content,
      footer,
    }
  }
}

/// Keep the selection inside `0..len`, clearing it when the list is empty
pub fn ensure_valid_selection(state: &mut TableState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(selected) if selected < len => {}
    Some(_) => state.select(Some(len - 1)),
    None => state.select(Some(0)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ensure_valid_selection() {
    let mut state = TableState::default();
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(0));

    state.select(Some(5));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(2));

    state.select(Some(1));
    ensure_valid_selection(&mut state, 3);
    assert_eq!(state.selected(), Some(1));

    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }

  #[test]
  fn test_page_layout_reserves_bars() {
    let layout = PageLayout::split(Rect::new(0, 0, 80, 24));
    assert_eq!(layout.header.height, 1);
    assert_eq!(layout.footer.y, 23);
    assert_eq!(layout.content.height, 22);
  }
}
