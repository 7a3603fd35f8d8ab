use crate::api::resource::ResourceKey;
use crate::app::AppContext;
use crate::query::{QueryState, Subscription};
use crate::ui::records::RecordView;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use std::cell::Cell;
use std::marker::PhantomData;
use std::rc::Rc;

/// Full record fetched by id
pub struct RecordDetailView<R: RecordView> {
  id: i64,
  label: String,
  refreshed: Rc<Cell<bool>>,
  subscription: Option<Subscription<ResourceKey>>,
  _record: PhantomData<R>,
}

impl<R: RecordView> RecordDetailView<R> {
  pub fn new(id: i64, label: String) -> Self {
    Self {
      id,
      label,
      refreshed: Rc::new(Cell::new(false)),
      subscription: None,
      _record: PhantomData,
    }
  }

  fn record<'a>(&self, ctx: &'a AppContext) -> Option<&'a R> {
    ctx
      .cache
      .data(&R::record_key(self.id))
      .and_then(|data| R::one_of(data))
  }
}

impl<R: RecordView> View for RecordDetailView<R> {
  fn on_enter(&mut self, ctx: &mut AppContext) {
    let key = R::record_key(self.id);
    if self.subscription.is_none() {
      let refreshed = self.refreshed.clone();
      self.subscription = Some(ctx.cache.subscribe(key, move |entry| {
        if entry.data().is_some() {
          refreshed.set(true);
        }
      }));
    }

    let api = ctx.api.clone();
    let id = self.id;
    let _ = ctx.cache.ensure(key, move || {
      let api = api.clone();
      async move { api.get::<R>(id).await.map(R::wrap_one) }
    });
  }

  fn on_leave(&mut self, ctx: &mut AppContext) {
    if let Some(subscription) = self.subscription.take() {
      ctx.cache.unsubscribe(subscription);
    }
  }

  fn handle_key(&mut self, key: KeyEvent, ctx: &mut AppContext) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        ctx.cache.invalidate(&R::record_key(self.id));
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, ctx: &AppContext) {
    let state = ctx.cache.state(&R::record_key(self.id));
    let title = match &state {
      QueryState::Loading { .. } => format!(" {} (loading...) ", self.label),
      QueryState::Error { error, .. } => format!(" {} (error: {}) ", self.label, error),
      _ => format!(" {} ", self.label),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let paragraph = match (self.record(ctx), &state) {
      (Some(record), _) => Paragraph::new(record.detail_lines()),
      (None, QueryState::Error { error, .. }) => {
        Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error))
          .style(Style::default().fg(Color::Red))
      }
      (None, _) => Paragraph::new(format!("Loading {}...", R::NAME))
        .style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(paragraph.block(block), area);
  }

  fn breadcrumb_label(&self) -> String {
    self.label.clone()
  }

  fn tick(&mut self, ctx: &mut AppContext) {
    // Pick up a new label after an edit
    if self.refreshed.replace(false) {
      if let Some(record) = self.record(ctx) {
        self.label = record.label();
      }
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("r", "refresh").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
