use crate::app::AppContext;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, forms, dialogs) and return
/// actions for the App to execute: App → View → Components.
///
/// Views read server data from the shared cache in `AppContext` and settle
/// their own mutations in `tick`.
pub trait View {
  /// Called when the view becomes visible: start any fetches it needs
  fn on_enter(&mut self, _ctx: &mut AppContext) {}

  /// Called when the view is popped off the stack
  fn on_leave(&mut self, _ctx: &mut AppContext) {}

  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent, ctx: &mut AppContext) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &AppContext);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Called on each tick, visible or not
  fn tick(&mut self, _ctx: &mut AppContext) {}

  /// True while the view is taking text input or showing a modal, so global
  /// keys like `:` must be passed through
  fn captures_input(&self) -> bool {
    false
  }

  /// Get keyboard shortcuts to display in the header
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
