//! Transient user-visible notifications (toasts).

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub level: Level,
  pub message: String,
  pub created_at: Instant,
}

impl Notification {
  pub fn success(message: impl Into<String>) -> Self {
    Self {
      level: Level::Success,
      message: message.into(),
      created_at: Instant::now(),
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      level: Level::Error,
      message: message.into(),
      created_at: Instant::now(),
    }
  }
}

/// Bounded queue of notifications that expire after `ttl`.
#[derive(Debug)]
pub struct Notifications {
  queue: VecDeque<Notification>,
  ttl: Duration,
  capacity: usize,
}

impl Notifications {
  pub fn new(ttl: Duration) -> Self {
    Self {
      queue: VecDeque::new(),
      ttl,
      capacity: 4,
    }
  }

  pub fn push(&mut self, notification: Notification) {
    if self.queue.len() == self.capacity {
      self.queue.pop_front();
    }
    self.queue.push_back(notification);
  }

  /// Drop expired notifications. Returns `true` if any were removed.
  pub fn prune(&mut self, now: Instant) -> bool {
    let before = self.queue.len();
    let ttl = self.ttl;
    self
      .queue
      .retain(|n| now.saturating_duration_since(n.created_at) < ttl);
    self.queue.len() != before
  }

  /// Visible notifications, oldest first
  pub fn iter(&self) -> impl Iterator<Item = &Notification> {
    self.queue.iter()
  }

  #[cfg(test)]
  pub fn latest(&self) -> Option<&Notification> {
    self.queue.back()
  }

  pub fn is_empty(&self) -> bool {
    self.queue.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_push_and_latest() {
    let mut notes = Notifications::new(Duration::from_secs(4));
    notes.push(Notification::success("Employee created successfully"));
    notes.push(Notification::error("Failed to delete employee"));

    assert_eq!(notes.iter().count(), 2);
    let latest = notes.latest().unwrap();
    assert_eq!(latest.level, Level::Error);
    assert_eq!(latest.message, "Failed to delete employee");
  }

  #[test]
  fn test_capacity_drops_oldest() {
    let mut notes = Notifications::new(Duration::from_secs(4));
    for i in 0..6 {
      notes.push(Notification::success(format!("note {}", i)));
    }
    assert_eq!(notes.iter().count(), 4);
    assert_eq!(notes.iter().next().unwrap().message, "note 2");
  }

  #[test]
  fn test_prune_expired() {
    let mut notes = Notifications::new(Duration::from_secs(4));
    notes.push(Notification::success("saved"));
    let created = notes.latest().unwrap().created_at;

    assert!(!notes.prune(created + Duration::from_secs(1)));
    assert!(notes.prune(created + Duration::from_secs(5)));
    assert!(notes.is_empty());
  }
}
