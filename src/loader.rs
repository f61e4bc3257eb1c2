//! Incremental windowing over a filtered, sorted listing.
//!
//! [`IncrementalLoader`] is the state machine: it exposes a growing prefix of
//! the current source list and only ever moves through
//!
//! ```text
//!   reset ──► Idle(w) ──request_more──► Loading(w, w+P) ──complete_load──► Idle(min(w+P, len))
//! ```
//!
//! Each `reset` starts a new generation. A [`LoadTicket`] handed out by
//! `request_more` is only honoured by `complete_load` while its generation is
//! current, so a completion that races a reset is dropped.
//!
//! [`LoadTimer`] is the artificial delay between the two halves of a load.

use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

/// Identifies one pending load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
  generation: u64,
  target: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
  Idle { shown: usize },
  Loading { shown: usize, target: usize },
}

#[derive(Debug, Clone)]
pub struct IncrementalLoader {
  page_size: usize,
  source_len: usize,
  generation: u64,
  state: LoadState,
}

impl IncrementalLoader {
  /// A zero page size is treated as 1.
  pub fn new(page_size: usize, source_len: usize) -> Self {
    let page_size = page_size.max(1);
    Self { page_size, source_len, generation: 0, state: LoadState::Idle { shown: page_size.min(source_len) } }
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  /// Start over on a new source list. Any outstanding ticket becomes stale.
  pub fn reset(&mut self, source_len: usize) {
    self.generation += 1;
    self.source_len = source_len;
    self.state = LoadState::Idle { shown: self.page_size.min(source_len) };
    debug!(generation = self.generation, source_len, shown = self.shown(), "loader: reset");
  }

  /// Begin loading the next page.
  ///
  /// Returns `None` (and changes nothing) while a load is already pending or
  /// when the whole source is shown.
  pub fn request_more(&mut self) -> Option<LoadTicket> {
    let LoadState::Idle { shown } = self.state else { return None };
    if shown >= self.source_len {
      return None;
    }
    let target = shown + self.page_size;
    self.state = LoadState::Loading { shown, target };
    debug!(generation = self.generation, shown, target, "loader: loading more");
    Some(LoadTicket { generation: self.generation, target })
  }

  /// Finish the load identified by `ticket`. Returns false for a stale ticket
  /// or when nothing is loading.
  pub fn complete_load(&mut self, ticket: LoadTicket) -> bool {
    match self.state {
      LoadState::Loading { target, .. } if ticket.generation == self.generation && ticket.target == target => {
        self.state = LoadState::Idle { shown: target.min(self.source_len) };
        debug!(generation = self.generation, shown = self.shown(), "loader: load complete");
        true
      }
      _ => {
        debug!(ticket_generation = ticket.generation, generation = self.generation, "loader: dropped stale completion");
        false
      }
    }
  }

  /// Length of the exposed prefix.
  pub fn shown(&self) -> usize {
    match self.state {
      LoadState::Idle { shown } | LoadState::Loading { shown, .. } => shown,
    }
  }

  pub fn has_more(&self) -> bool {
    self.shown() < self.source_len
  }

  pub fn is_loading(&self) -> bool {
    matches!(self.state, LoadState::Loading { .. })
  }

  /// The exposed prefix of `source`.
  pub fn window<'a, T>(&self, source: &'a [T]) -> &'a [T] {
    &source[..self.shown().min(source.len())]
  }
}

/// A cancelable one-shot delay that hands its ticket back when it fires.
#[derive(Default)]
pub struct LoadTimer {
  handle: Option<JoinHandle<()>>,
  rx: Option<oneshot::Receiver<LoadTicket>>,
}

impl LoadTimer {
  /// Arm the timer, replacing any pending one. Must be called inside a tokio runtime.
  pub fn arm(&mut self, delay: Duration, ticket: LoadTicket) {
    self.cancel();
    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      let _ = tx.send(ticket);
    });
    self.handle = Some(handle);
    self.rx = Some(rx);
  }

  /// Abort the pending delay, if any. Its ticket is never delivered.
  pub fn cancel(&mut self) {
    if let Some(handle) = self.handle.take() {
      handle.abort();
    }
    self.rx = None;
  }

  pub fn is_armed(&self) -> bool {
    self.rx.is_some()
  }

  /// Non-blocking: the ticket if the delay has elapsed.
  pub fn poll(&mut self) -> Option<LoadTicket> {
    let mut rx = self.rx.take()?;
    match rx.try_recv() {
      Ok(ticket) => {
        self.handle = None;
        Some(ticket)
      }
      Err(oneshot::error::TryRecvError::Empty) => {
        self.rx = Some(rx);
        None
      }
      Err(oneshot::error::TryRecvError::Closed) => {
        self.handle = None;
        None
      }
    }
  }
}
