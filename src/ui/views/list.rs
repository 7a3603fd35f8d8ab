use crate::api::resource::{ResourceData, ResourceKey};
use crate::app::AppContext;
use crate::error::ApiError;
use crate::mutation::{Mutation, MutationSink};
use crate::notify::{Notification, Notifications};
use crate::query::{QueryCache, Subscription};
use crate::ui::components::{
  ConfirmDialog, ConfirmEvent, FormEvent, KeyResult, RecordForm, SearchEvent, SearchInput,
};
use crate::ui::ensure_valid_selection;
use crate::ui::records::RecordView;
use crate::ui::renderfns::truncate;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::RecordDetailView;
use crate::view_state::{DisplayMode, Modal, ViewState};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, TableState};
use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;

const CARD_WIDTH: u16 = 36;

/// List page for one resource: cards or table, search, and the
/// create/edit/delete modals.
// Error text shown in the page title
const TITLE_ERROR_LEN: usize = 48;

pub struct ResourceListView<R: RecordView> {
  state: ViewState<R>,
  /// Cursor into the visible (filtered) records
  cursor: TableState,
  /// Id under the cursor, so the cursor follows its record across refetches
  anchor: Option<i64>,
  /// Cards per row at the last render
  columns: usize,
  search: SearchInput,
  form: Option<RecordForm>,
  confirm: Option<ConfirmDialog>,
  create: Mutation<ResourceKey, R>,
  update: Mutation<ResourceKey, R>,
  remove: Mutation<ResourceKey, ()>,
  data_changed: Rc<Cell<bool>>,
  subscription: Option<Subscription<ResourceKey>>,
}

impl<R: RecordView> ResourceListView<R> {
  pub fn new() -> Self {
    let name = capitalize(R::NAME);
    Self {
      state: ViewState::new(),
      cursor: TableState::default(),
      anchor: None,
      columns: 1,
      search: SearchInput::new(),
      form: None,
      confirm: None,
      create: Mutation::new(
        format!("{} created successfully", name),
        format!("Failed to create {}", R::NAME),
      )
      .invalidates(R::list_key()),
      update: Mutation::new(
        format!("{} updated successfully", name),
        format!("Failed to update {}", R::NAME),
      )
      .invalidates(R::list_key()),
      // The deleted record's own key is forgotten, not refetched
      remove: Mutation::new(
        format!("{} deleted successfully", name),
        format!("Failed to delete {}", R::NAME),
      )
      .invalidates(R::list_key()),
      data_changed: Rc::new(Cell::new(false)),
      subscription: None,
    }
  }

  /// Records in cache order that pass the search filter
  fn visible<'a>(&self, ctx: &'a AppContext) -> Vec<&'a R> {
    ctx
      .cache
      .state(&R::list_key())
      .data()
      .and_then(|data| R::list_of(data))
      .unwrap_or(&[])
      .iter()
      .filter(|r| self.search.matches(&r.search_text()))
      .collect()
  }

  fn current(&self, ctx: &AppContext) -> Option<R> {
    let index = self.cursor.selected()?;
    self.visible(ctx).get(index).map(|r| (*r).clone())
  }

  fn move_by(&mut self, delta: isize, ctx: &AppContext) {
    let visible = self.visible(ctx);
    if visible.is_empty() {
      return;
    }
    let last = visible.len() as isize - 1;
    let current = self.cursor.selected().unwrap_or(0) as isize;
    let next = (current + delta).clamp(0, last) as usize;
    self.cursor.select(Some(next));
    self.anchor = visible.get(next).map(|r| r.id());
  }

  /// Put the cursor back on the anchored record after the list changed
  fn reanchor(&mut self, ctx: &AppContext) {
    let visible = self.visible(ctx);
    match self
      .anchor
      .and_then(|id| visible.iter().position(|r| r.id() == id))
    {
      Some(index) => self.cursor.select(Some(index)),
      None => ensure_valid_selection(&mut self.cursor, visible.len()),
    }
    self.anchor = self
      .cursor
      .selected()
      .and_then(|i| visible.get(i))
      .map(|r| r.id());
  }

  fn open_create(&mut self) {
    let today = chrono::Local::now().date_naive();
    self.state.open_create();
    self.form = Some(RecordForm::new(
      format!("New {}", R::NAME),
      R::fields(),
      R::defaults(today),
    ));
  }

  fn open_edit(&mut self, record: R) {
    self.form = Some(RecordForm::new(
      format!("Edit {}", record.label()),
      R::fields(),
      record.values(),
    ));
    self.state.open_edit(record);
  }

  fn open_delete(&mut self, record: R) {
    self.confirm = Some(ConfirmDialog::new(record.delete_message()));
    self.state.open_delete(record);
  }

  fn close_modal(&mut self) {
    self.state.close();
    self.form = None;
    self.confirm = None;
  }

  fn submit_form(&mut self, values: Vec<String>, ctx: &mut AppContext) {
    if self.create.is_pending() || self.update.is_pending() {
      return;
    }
    let editing = match self.state.modal() {
      Modal::Create => false,
      Modal::Edit(_) => true,
      Modal::None | Modal::ConfirmDelete(_) => return,
    };
    let api = ctx.api.clone();

    if editing {
      let Some(record) = self.state.selected() else {
        return;
      };
      let id = record.id();
      match record.patch(&values) {
        Ok(patch) => {
          debug!(resource = R::NAME, id, "submitting update");
          self.update.execute_invalidating(
            vec![R::record_key(id)],
            move |patch: R::Patch| async move { api.update::<R>(id, &patch).await },
            patch,
          );
        }
        Err(error) => self.reject(error, ctx),
      }
    } else {
      match R::draft(&values) {
        Ok(draft) => {
          debug!(resource = R::NAME, "submitting create");
          self.create.execute(
            move |draft: R::Draft| async move { api.create::<R>(&draft).await },
            draft,
          );
        }
        Err(error) => self.reject(error, ctx),
      }
    }
    if let Some(form) = &mut self.form {
      form.set_pending(self.create.is_pending() || self.update.is_pending());
    }
  }

  /// Invalid input: keep the form open and say what is wrong
  fn reject(&mut self, error: ApiError, ctx: &mut AppContext) {
    let field = match &error {
      ApiError::Validation { field, .. } => Some(*field),
      _ => None,
    };
    let message = error.to_string();
    if let Some(form) = &mut self.form {
      form.set_error(field, message.clone());
    }
    ctx.notifications.push(Notification::error(message));
  }

  fn submit_delete(&mut self, ctx: &mut AppContext) {
    if self.remove.is_pending() {
      return;
    }
    if !matches!(self.state.modal(), Modal::ConfirmDelete(_)) {
      return;
    }
    let Some(id) = self.state.selected().map(|record| record.id()) else {
      return;
    };
    let api = ctx.api.clone();
    debug!(resource = R::NAME, id, "submitting delete");
    self.remove.execute_forgetting(
      vec![R::record_key(id)],
      move |id: i64| async move { api.delete::<R>(id).await },
      id,
    );
    if let Some(confirm) = &mut self.confirm {
      confirm.set_pending(true);
    }
  }

  fn render_cards(&mut self, frame: &mut Frame, area: Rect, records: &[&R]) {
    let columns = (area.width / CARD_WIDTH).max(1) as usize;
    self.columns = columns;
    let card_width = area.width / columns as u16;
    let rows_shown = (area.height / R::CARD_HEIGHT).max(1) as usize;

    let selected = self.cursor.selected().unwrap_or(0);
    let first_row = (selected / columns).saturating_sub(rows_shown - 1);

    for (index, record) in records
      .iter()
      .enumerate()
      .skip(first_row * columns)
      .take(rows_shown * columns)
    {
      let row = (index / columns - first_row) as u16;
      let col = (index % columns) as u16;
      let card = Rect::new(
        area.x + col * card_width,
        area.y + row * R::CARD_HEIGHT,
        card_width,
        R::CARD_HEIGHT,
      )
      .intersection(area);

      let border = if index == selected {
        Style::default().fg(Color::Yellow)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      let paragraph = Paragraph::new(record.card_lines()).block(
        Block::default()
          .borders(Borders::ALL)
          .border_style(border),
      );
      frame.render_widget(paragraph, card);
    }
  }

  fn render_table(&mut self, frame: &mut Frame, area: Rect, records: &[&R]) {
    let header = Row::new(R::table_header().iter().copied())
      .style(Style::default().fg(Color::Yellow).bold());
    let rows: Vec<Row> = records.iter().map(|r| Row::new(r.table_row())).collect();

    let table = Table::new(rows, R::table_widths())
      .header(header)
      .row_highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut self.cursor);
  }
}

impl<R: RecordView> View for ResourceListView<R> {
  fn on_enter(&mut self, ctx: &mut AppContext) {
    if self.subscription.is_none() {
      let changed = self.data_changed.clone();
      self.subscription = Some(ctx.cache.subscribe(R::list_key(), move |_| changed.set(true)));
    }

    let api = ctx.api.clone();
    // The result is applied by the cache on poll; the handle is not needed
    let _ = ctx.cache.ensure(R::list_key(), move || {
      let api = api.clone();
      async move { api.list::<R>().await.map(R::wrap_list) }
    });
  }

  fn handle_key(&mut self, key: KeyEvent, ctx: &mut AppContext) -> ViewAction {
    if let Some(confirm) = &mut self.confirm {
      match confirm.handle_key(key) {
        KeyResult::Event(ConfirmEvent::Confirmed) => self.submit_delete(ctx),
        KeyResult::Event(ConfirmEvent::Cancelled) => self.close_modal(),
        KeyResult::Handled | KeyResult::NotHandled => {}
      }
      return ViewAction::None;
    }

    if let Some(form) = &mut self.form {
      match form.handle_key(key) {
        KeyResult::Event(FormEvent::Submitted(values)) => self.submit_form(values, ctx),
        KeyResult::Event(FormEvent::Cancelled) => self.close_modal(),
        KeyResult::Handled | KeyResult::NotHandled => {}
      }
      return ViewAction::None;
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed) => {
        self.cursor.select(Some(0));
        self.reanchor(ctx);
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    let row_step = match self.state.display() {
      DisplayMode::Card => self.columns as isize,
      DisplayMode::Table => 1,
    };

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.move_by(row_step, ctx),
      KeyCode::Char('k') | KeyCode::Up => self.move_by(-row_step, ctx),
      KeyCode::Char('l') | KeyCode::Right => self.move_by(1, ctx),
      KeyCode::Char('h') | KeyCode::Left => self.move_by(-1, ctx),
      KeyCode::Char('n') => self.open_create(),
      KeyCode::Char('e') => {
        if let Some(record) = self.current(ctx) {
          self.open_edit(record);
        }
      }
      KeyCode::Char('d') => {
        if let Some(record) = self.current(ctx) {
          self.open_delete(record);
        }
      }
      KeyCode::Char('v') => {
        self.state.toggle_display();
        debug!(resource = R::NAME, mode = self.state.display().label(), "display mode");
      }
      KeyCode::Char('r') => {
        ctx.cache.invalidate(&R::list_key());
      }
      KeyCode::Enter => {
        if let Some(record) = self.current(ctx) {
          return ViewAction::Push(Box::new(RecordDetailView::<R>::new(
            record.id(),
            record.label(),
          )));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &AppContext) {
    let state = ctx.cache.state(&R::list_key());
    let records = self.visible(ctx);
    ensure_valid_selection(&mut self.cursor, records.len());

    let mode = self.state.display().label();
    let title = if state.is_loading() {
      format!(" {} (loading...) ", R::TITLE)
    } else if let Some(error) = state.error() {
      let error = truncate(&error.to_string(), TITLE_ERROR_LEN);
      format!(" {} (error: {}) ", R::TITLE, error)
    } else if self.search.is_filtering() {
      format!(" {} ({} matching) [{}] ", R::TITLE, records.len(), mode)
    } else {
      format!(" {} ({}) [{}] ", R::TITLE, records.len(), mode)
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if records.is_empty() {
      let content = if state.is_loading() {
        format!("Loading {}...", R::PLURAL)
      } else if state.is_error() {
        format!("Failed to load {}. Press 'r' to retry.", R::PLURAL)
      } else if self.search.is_filtering() {
        format!("No {} match \"{}\".", R::PLURAL, self.search.query().trim())
      } else {
        format!(
          "No {} found. Press 'n' to create your first {}.",
          R::PLURAL,
          R::NAME
        )
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
    } else {
      let inner = block.inner(area);
      frame.render_widget(block, area);
      match self.state.display() {
        DisplayMode::Card => self.render_cards(frame, inner, &records),
        DisplayMode::Table => self.render_table(frame, inner, &records),
      }
    }

    self.search.render(frame, area);
    if let Some(form) = &self.form {
      form.render_overlay(frame, area);
    }
    if let Some(confirm) = &self.confirm {
      confirm.render_overlay(frame, area);
    }
  }

  fn breadcrumb_label(&self) -> String {
    R::TITLE.to_string()
  }

  fn tick(&mut self, ctx: &mut AppContext) {
    let mut effects = PageEffects {
      cache: &mut ctx.cache,
      notifications: &mut ctx.notifications,
      state: &mut self.state,
      form: &mut self.form,
      confirm: &mut self.confirm,
      cursor: &mut self.cursor,
      anchor: &mut self.anchor,
    };
    self.create.poll(&mut effects);
    self.update.poll(&mut effects);
    self.remove.poll(&mut effects);

    let saving = self.create.is_pending() || self.update.is_pending();
    if let Some(form) = &mut self.form {
      form.set_pending(saving);
    }
    let deleting = self.remove.is_pending();
    if let Some(confirm) = &mut self.confirm {
      confirm.set_pending(deleting);
    }

    if self.data_changed.replace(false) {
      self.reanchor(ctx);
    }
  }

  fn captures_input(&self) -> bool {
    self.state.has_modal() || self.search.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.captures_input() {
      return vec![ShortcutInfo::new("Esc", "cancel").with_priority(10)];
    }
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("n", "new").with_priority(30),
      ShortcutInfo::new("e", "edit").with_priority(31),
      ShortcutInfo::new("d", "delete").with_priority(32),
      ShortcutInfo::new("v", "cards/table").with_priority(40),
      ShortcutInfo::new("r", "refresh").with_priority(50),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}

/// What a settled write may touch on this page
struct PageEffects<'a, R> {
  cache: &'a mut QueryCache<ResourceKey, ResourceData>,
  notifications: &'a mut Notifications,
  state: &'a mut ViewState<R>,
  form: &'a mut Option<RecordForm>,
  confirm: &'a mut Option<ConfirmDialog>,
  cursor: &'a mut TableState,
  anchor: &'a mut Option<i64>,
}

impl<R: Clone> MutationSink<ResourceKey> for PageEffects<'_, R> {
  fn invalidate(&mut self, key: &ResourceKey) {
    self.cache.invalidate(key);
  }

  fn forget(&mut self, key: &ResourceKey) {
    self.cache.remove(key);
  }

  fn reset_view(&mut self) {
    self.state.close();
    *self.form = None;
    *self.confirm = None;
    self.cursor.select(None);
    *self.anchor = None;
  }

  fn notify(&mut self, notification: Notification) {
    self.notifications.push(notification);
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
