use crate::api::{ApiClient, Employee, JobTitle, ResourceData, ResourceKey};
use crate::commands::Command;
use crate::config::{Config, StartView};
use crate::event::{Event, EventHandler};
use crate::notify::{Notification, Notifications};
use crate::query::QueryCache;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::renderfns::{draw_footer, draw_header, draw_toasts, PAGES};
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{DashboardView, ResourceListView};
use crate::ui::PageLayout;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Shared state every view reads and writes through
pub struct AppContext {
  pub api: ApiClient,
  pub cache: QueryCache<ResourceKey, ResourceData>,
  pub notifications: Notifications,
}

impl AppContext {
  pub fn new(api: ApiClient, stale_time: Duration, toast_ttl: Duration) -> Self {
    Self {
      api,
      cache: QueryCache::new(stale_time),
      notifications: Notifications::new(toast_ttl),
    }
  }
}

fn page_index(view: StartView) -> usize {
  match view {
    StartView::Dashboard => 0,
    StartView::Employees => 1,
    StartView::Jobtitles => 2,
  }
}

/// Main application state
pub struct App {
  title: String,
  ctx: AppContext,

  /// One live view per page, indexed like `PAGES`
  roots: Vec<Box<dyn View>>,
  active: usize,

  /// Detail views pushed on top of the active page
  stack: Vec<Box<dyn View>>,

  command: CommandInput,
  should_quit: bool,
}

impl App {
  pub fn new(config: &Config, start: StartView) -> Result<Self> {
    let api = ApiClient::new(&config.api.base_url)?;
    info!(base_url = %api.base_url(), "api client ready");
    let ctx = AppContext::new(api, config.cache.stale_time(), config.ui.toast_ttl());

    let roots: Vec<Box<dyn View>> = vec![
      Box::new(DashboardView::new()),
      Box::new(ResourceListView::<Employee>::new()),
      Box::new(ResourceListView::<JobTitle>::new()),
    ];

    Ok(Self {
      title: config.display_title(),
      ctx,
      roots,
      active: page_index(start),
      stack: Vec::new(),
      command: CommandInput::new(),
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(TICK_RATE);
    self.roots[self.active].on_enter(&mut self.ctx);

    let result = self.main_loop(&mut terminal, &mut events).await;

    // Cleanup terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    self.ctx.cache.shutdown();
    info!("staffdesk exiting");

    result
  }

  async fn main_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }
    Ok(())
  }

  /// Apply finished fetches, settle mutations and expire toasts
  fn tick(&mut self) {
    self.ctx.cache.poll();
    for view in self.roots.iter_mut().chain(self.stack.iter_mut()) {
      view.tick(&mut self.ctx);
    }
    self.ctx.notifications.prune(Instant::now());
  }

  fn current_view(&self) -> &dyn View {
    match self.stack.last() {
      Some(view) => view.as_ref(),
      None => self.roots[self.active].as_ref(),
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if self.command.is_active() {
      match self.command.handle_key(key) {
        KeyResult::Event(CommandEvent::Run(cmd)) => self.run_command(cmd),
        KeyResult::Event(CommandEvent::Unknown(input)) => {
          debug!(%input, "unknown command");
          self
            .ctx
            .notifications
            .push(Notification::error(format!("Unknown command: {}", input)));
        }
        _ => {}
      }
      return;
    }

    if key.code == KeyCode::Char(':') && !self.current_view().captures_input() {
      self.command.activate();
      return;
    }

    let view = match self.stack.last_mut() {
      Some(view) => view,
      None => &mut self.roots[self.active],
    };
    let action = view.handle_key(key, &mut self.ctx);
    self.apply_action(action);
  }

  fn apply_action(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(mut view) => {
        view.on_enter(&mut self.ctx);
        self.stack.push(view);
      }
      ViewAction::Pop => match self.stack.pop() {
        Some(mut view) => view.on_leave(&mut self.ctx),
        // Back out of a page quits
        None => self.should_quit = true,
      },
    }
  }

  fn run_command(&mut self, cmd: &Command) {
    match cmd.name {
      "dashboard" => self.switch_page(0),
      "employees" => self.switch_page(1),
      "jobtitles" => self.switch_page(2),
      "quit" => self.should_quit = true,
      _ => {}
    }
  }

  fn switch_page(&mut self, index: usize) {
    while let Some(mut view) = self.stack.pop() {
      view.on_leave(&mut self.ctx);
    }
    self.active = index;
    self.roots[index].on_enter(&mut self.ctx);
    debug!(page = PAGES[index], "view changed");
  }

  fn breadcrumb(&self) -> Vec<String> {
    std::iter::once(&self.roots[self.active])
      .chain(self.stack.iter())
      .map(|view| view.breadcrumb_label())
      .collect()
  }

  fn draw(&mut self, frame: &mut Frame) {
    let layout = PageLayout::split(frame.area());

    let shortcuts = self.current_view().shortcuts();
    draw_header(frame, layout.header, &self.title, self.active, &shortcuts);

    let view = match self.stack.last_mut() {
      Some(view) => view,
      None => &mut self.roots[self.active],
    };
    view.render(frame, layout.content, &self.ctx);

    draw_footer(frame, layout.footer, &self.breadcrumb());
    self.command.render_overlay(frame, layout.content);
    draw_toasts(frame, layout.content, &self.ctx.notifications);
  }
}
