//! Mutation executor: runs one write and applies its side effects.
//!
//! A `Mutation` is owned by the view that triggers it. `execute` spawns the
//! write; `poll` (called from the view's tick) settles it exactly once:
//!
//! - success: drop keys of records the write removed, invalidate the
//!   declared keys, reset the view, notify
//! - failure: notify only, leaving cache and view untouched so the user can
//!   retry or cancel
//!
//! One write is expected in flight per executor. Preventing a second
//! `execute` while pending is up to the caller; the executor does not queue.

use crate::error::ApiError;
use crate::notify::Notification;
use std::future::Future;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Side effects a settled mutation may apply.
pub trait MutationSink<K> {
  /// Mark a cache key stale and refetch it
  fn invalidate(&mut self, key: &K);
  /// Drop a cache key whose record no longer exists
  fn forget(&mut self, key: &K);
  /// Clear the selection and close the active modal
  fn reset_view(&mut self);
  /// Show a transient notification
  fn notify(&mut self, notification: Notification);
}

#[derive(Debug, Clone, PartialEq)]
pub enum MutationState<T> {
  Idle,
  Pending,
  Success(T),
  Error(ApiError),
}

pub struct Mutation<K, T> {
  invalidates: Vec<K>,
  success_message: String,
  error_message: String,
  state: MutationState<T>,
  /// Keys for the write currently in flight (declared keys + per-call extras)
  pending_keys: Vec<K>,
  pending_forget: Vec<K>,
  receiver: Option<oneshot::Receiver<Result<T, ApiError>>>,
}

impl<K: Clone, T: Clone + Send + 'static> Mutation<K, T> {
  pub fn new(success_message: impl Into<String>, error_message: impl Into<String>) -> Self {
    Self {
      invalidates: Vec::new(),
      success_message: success_message.into(),
      error_message: error_message.into(),
      state: MutationState::Idle,
      pending_keys: Vec::new(),
      pending_forget: Vec::new(),
      receiver: None,
    }
  }

  /// Declare a cache key to invalidate after every successful write.
  pub fn invalidates(mut self, key: K) -> Self {
    self.invalidates.push(key);
    self
  }

  #[cfg(test)]
  pub fn state(&self) -> &MutationState<T> {
    &self.state
  }

  pub fn is_pending(&self) -> bool {
    matches!(self.state, MutationState::Pending)
  }

  /// Run `write(args)` in the background.
  pub fn execute<F, A, Fut>(&mut self, write: F, args: A)
  where
    F: FnOnce(A) -> Fut,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    self.spawn(Vec::new(), Vec::new(), write, args);
  }

  /// Like `execute`, additionally invalidating `extra` keys on success
  /// (e.g. the detail entry of the record being updated).
  pub fn execute_invalidating<F, A, Fut>(&mut self, extra: Vec<K>, write: F, args: A)
  where
    F: FnOnce(A) -> Fut,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    self.spawn(extra, Vec::new(), write, args);
  }

  /// Like `execute`, dropping `forget` keys from the cache on success
  /// instead of refetching them (e.g. the detail entry of a deleted record).
  pub fn execute_forgetting<F, A, Fut>(&mut self, forget: Vec<K>, write: F, args: A)
  where
    F: FnOnce(A) -> Fut,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    self.spawn(Vec::new(), forget, write, args);
  }

  fn spawn<F, A, Fut>(&mut self, extra: Vec<K>, forget: Vec<K>, write: F, args: A)
  where
    F: FnOnce(A) -> Fut,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
  {
    let (tx, rx) = oneshot::channel();
    let future = write(args);
    tokio::spawn(async move {
      // Ignore send errors - the view owning the mutation may be gone
      let _ = tx.send(future.await);
    });

    self.pending_keys = self.invalidates.iter().cloned().chain(extra).collect();
    self.pending_forget = forget;
    self.receiver = Some(rx);
    self.state = MutationState::Pending;
  }

  /// Settle a finished write, applying its side effects to `sink`.
  ///
  /// Returns `true` when the mutation settled on this call.
  pub fn poll<S: MutationSink<K>>(&mut self, sink: &mut S) -> bool {
    let Some(receiver) = self.receiver.as_mut() else {
      return false;
    };

    let result = match receiver.try_recv() {
      Ok(result) => result,
      Err(oneshot::error::TryRecvError::Empty) => return false,
      Err(oneshot::error::TryRecvError::Closed) => Err(ApiError::Network {
        message: "write task ended without a result".to_string(),
      }),
    };
    self.receiver = None;

    match result {
      Ok(value) => {
        info!(message = %self.success_message, "mutation succeeded");
        for key in self.pending_forget.drain(..) {
          sink.forget(&key);
        }
        for key in self.pending_keys.drain(..) {
          sink.invalidate(&key);
        }
        sink.reset_view();
        sink.notify(Notification::success(self.success_message.clone()));
        self.state = MutationState::Success(value);
      }
      Err(error) => {
        warn!(
          message = %self.error_message,
          status = ?error.status(),
          %error,
          "mutation failed"
        );
        self.pending_keys.clear();
        self.pending_forget.clear();
        sink.notify(Notification::error(self.error_message.clone()));
        self.state = MutationState::Error(error);
      }
    }
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::notify::Level;
  use std::time::Duration;

  #[derive(Default)]
  struct RecordingSink {
    invalidated: Vec<&'static str>,
    forgotten: Vec<&'static str>,
    resets: usize,
    notes: Vec<(Level, String)>,
  }

  impl MutationSink<&'static str> for RecordingSink {
    fn invalidate(&mut self, key: &&'static str) {
      self.invalidated.push(key);
    }

    fn forget(&mut self, key: &&'static str) {
      self.forgotten.push(key);
    }

    fn reset_view(&mut self) {
      self.resets += 1;
    }

    fn notify(&mut self, notification: Notification) {
      self.notes.push((notification.level, notification.message));
    }
  }

  async fn settle(mutation: &mut Mutation<&'static str, i64>, sink: &mut RecordingSink) -> bool {
    for _ in 0..50 {
      if mutation.poll(sink) {
        return true;
      }
      tokio::time::sleep(Duration::from_millis(2)).await;
    }
    false
  }

  fn create_mutation() -> Mutation<&'static str, i64> {
    Mutation::new("Employee created successfully", "Failed to create employee")
      .invalidates("employees")
  }

  #[tokio::test]
  async fn test_success_runs_all_hooks() {
    let mut mutation = create_mutation();
    let mut sink = RecordingSink::default();

    mutation.execute(|n: i64| async move { Ok(n) }, 7);
    assert!(mutation.is_pending());

    assert!(settle(&mut mutation, &mut sink).await);
    assert_eq!(mutation.state(), &MutationState::Success(7));
    assert_eq!(sink.invalidated, vec!["employees"]);
    assert_eq!(sink.resets, 1);
    assert_eq!(
      sink.notes,
      vec![(Level::Success, "Employee created successfully".to_string())]
    );
  }

  #[tokio::test]
  async fn test_failure_only_notifies() {
    let mut mutation = create_mutation();
    let mut sink = RecordingSink::default();

    mutation.execute(
      |_: ()| async {
        Err(ApiError::Network {
          message: "connection refused".into(),
        })
      },
      (),
    );

    assert!(settle(&mut mutation, &mut sink).await);
    assert!(matches!(mutation.state(), MutationState::Error(ApiError::Network { .. })));
    assert!(sink.invalidated.is_empty());
    assert_eq!(sink.resets, 0);
    assert_eq!(
      sink.notes,
      vec![(Level::Error, "Failed to create employee".to_string())]
    );
  }

  #[tokio::test]
  async fn test_extra_keys_are_invalidated_once() {
    let mut mutation = create_mutation();
    let mut sink = RecordingSink::default();

    mutation.execute_invalidating(vec!["employees/7"], |n: i64| async move { Ok(n) }, 7);
    settle(&mut mutation, &mut sink).await;
    assert_eq!(sink.invalidated, vec!["employees", "employees/7"]);

    // A later write only carries the declared keys
    mutation.execute(|n: i64| async move { Ok(n) }, 8);
    settle(&mut mutation, &mut sink).await;
    assert_eq!(sink.invalidated, vec!["employees", "employees/7", "employees"]);
  }

  #[tokio::test]
  async fn test_forgotten_keys_are_not_refetched() {
    let mut mutation = create_mutation();
    let mut sink = RecordingSink::default();

    mutation.execute_forgetting(vec!["employees/7"], |n: i64| async move { Ok(n) }, 7);
    settle(&mut mutation, &mut sink).await;
    assert_eq!(sink.forgotten, vec!["employees/7"]);
    assert_eq!(sink.invalidated, vec!["employees"]);
  }

  #[tokio::test]
  async fn test_failure_forgets_nothing() {
    let mut mutation = create_mutation();
    let mut sink = RecordingSink::default();

    mutation.execute_forgetting(
      vec!["employees/7"],
      |_: i64| async {
        Err(ApiError::Network {
          message: "connection refused".into(),
        })
      },
      7,
    );
    settle(&mut mutation, &mut sink).await;
    assert!(sink.forgotten.is_empty());
    assert!(sink.invalidated.is_empty());

    // The next write does not inherit the failed one's keys
    mutation.execute(|n: i64| async move { Ok(n) }, 8);
    settle(&mut mutation, &mut sink).await;
    assert!(sink.forgotten.is_empty());
  }

  #[tokio::test]
  async fn test_poll_settles_once() {
    let mut mutation = create_mutation();
    let mut sink = RecordingSink::default();

    assert!(!mutation.poll(&mut sink));

    mutation.execute(|n: i64| async move { Ok(n) }, 1);
    assert!(settle(&mut mutation, &mut sink).await);
    assert!(!mutation.poll(&mut sink));
    assert_eq!(sink.resets, 1);
  }

  #[tokio::test]
  async fn test_pending_until_write_finishes() {
    let mut mutation = create_mutation();
    let mut sink = RecordingSink::default();

    mutation.execute(
      |n: i64| async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        Ok(n)
      },
      3,
    );

    assert!(!mutation.poll(&mut sink));
    assert!(mutation.is_pending());
    assert!(settle(&mut mutation, &mut sink).await);
    assert!(!mutation.is_pending());
  }
}
