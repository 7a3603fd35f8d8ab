//! Per-page UI state for a list page: selection, active modal and display
//! mode.

/// How a list page lays out its records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
  #[default]
  Card,
  Table,
}

impl DisplayMode {
  pub fn toggled(self) -> Self {
    match self {
      Self::Card => Self::Table,
      Self::Table => Self::Card,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Card => "cards",
      Self::Table => "table",
    }
  }
}

/// Which modal, if any, is open. Edit and delete carry the record they act on.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Modal<R> {
  #[default]
  None,
  Create,
  Edit(R),
  ConfirmDelete(R),
}

#[derive(Debug, Clone)]
pub struct ViewState<R> {
  selected: Option<R>,
  modal: Modal<R>,
  display: DisplayMode,
}

impl<R> Default for ViewState<R> {
  fn default() -> Self {
    Self {
      selected: None,
      modal: Modal::None,
      display: DisplayMode::default(),
    }
  }
}

impl<R: Clone> ViewState<R> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn open_create(&mut self) {
    self.selected = None;
    self.modal = Modal::Create;
  }

  pub fn open_edit(&mut self, record: R) {
    self.selected = Some(record.clone());
    self.modal = Modal::Edit(record);
  }

  pub fn open_delete(&mut self, record: R) {
    self.selected = Some(record.clone());
    self.modal = Modal::ConfirmDelete(record);
  }

  /// Close any modal and clear the selection
  pub fn close(&mut self) {
    self.selected = None;
    self.modal = Modal::None;
  }

  pub fn selected(&self) -> Option<&R> {
    self.selected.as_ref()
  }

  pub fn modal(&self) -> &Modal<R> {
    &self.modal
  }

  pub fn has_modal(&self) -> bool {
    !matches!(self.modal, Modal::None)
  }

  pub fn display(&self) -> DisplayMode {
    self.display
  }

  pub fn toggle_display(&mut self) {
    self.display = self.display.toggled();
  }
}
