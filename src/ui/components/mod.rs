mod command_input;
mod confirm_dialog;
mod input;
mod record_form;
mod search_input;

pub use command_input::{CommandEvent, CommandInput};
pub use confirm_dialog::{ConfirmDialog, ConfirmEvent};
pub use record_form::{FormEvent, RecordForm};
pub use search_input::{SearchEvent, SearchInput};

/// Result of a component handling a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, no event for parent to handle
  Handled,
  /// Key was consumed, here's an event for parent to process
  Event(T),
  /// Key was not consumed, parent should try next handler
  NotHandled,
}
