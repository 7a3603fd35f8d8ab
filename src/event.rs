use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Terminal resized, redraw
  Resize,
  /// Periodic tick for UI refresh and query polling
  Tick,
}

/// Event handler that produces events from terminal input and a tick timer
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    spawn_reader(tx.clone(), tick_rate);
    spawn_ticks(tx, tick_rate);
    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}

/// crossterm's poll/read block, so the reader gets its own thread. The
/// timeout only bounds how long it takes to notice the handler is gone.
fn spawn_reader(tx: mpsc::UnboundedSender<Event>, timeout: Duration) {
  tokio::task::spawn_blocking(move || {
    while !tx.is_closed() {
      match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => continue,
        Err(error) => {
          debug!(%error, "terminal reader stopped");
          break;
        }
      }
      let event = match event::read() {
        // Windows reports releases too
        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
        Ok(CrosstermEvent::Resize(_, _)) => Event::Resize,
        _ => continue,
      };
      if tx.send(event).is_err() {
        break;
      }
    }
  });
}

/// Ticks on a fixed interval, independent of how much input arrives
fn spawn_ticks(tx: mpsc::UnboundedSender<Event>, tick_rate: Duration) {
  tokio::spawn(async move {
    let mut interval = tokio::time::interval(tick_rate);
    loop {
      interval.tick().await;
      if tx.send(Event::Tick).is_err() {
        break;
      }
    }
  });
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_ticks_keep_coming_between_keys() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_ticks(tx.clone(), Duration::from_millis(5));

    let key = KeyEvent::from(crossterm::event::KeyCode::Char('j'));
    let (mut keys, mut ticks) = (0, 0);
    for _ in 0..20 {
      // Steady key input must not starve the timer
      tx.send(Event::Key(key)).unwrap();
      tokio::time::sleep(Duration::from_millis(2)).await;
      while let Ok(event) = rx.try_recv() {
        match event {
          Event::Tick => ticks += 1,
          Event::Key(_) => keys += 1,
          Event::Resize => {}
        }
      }
    }
    assert_eq!(keys, 20);
    assert!(ticks >= 3, "only {} ticks", ticks);
  }
}
