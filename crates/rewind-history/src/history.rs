/// Snapshot history engine: recording policy, navigation and scoped modifiers.
///
/// A `History` never holds the current state. Navigation reads it from the
/// bound container, repartitions the timeline and writes the target back.
use std::fmt;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::HistoryConfig;
use crate::container::StateContainer;
use crate::modifiers::{self, Modifiers};
use crate::stack::SnapshotStack;

/// Undo/redo history for one state container.
///
/// Each bound container gets its own `History`; instances share nothing.
pub struct History<T> {
    stack: SnapshotStack<T>,
    modifiers: Modifiers<T>,
    config: HistoryConfig,
    clock: Arc<dyn Clock>,
}

impl<T> fmt::Debug for History<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("past_len", &self.stack.past().len())
            .field("future_len", &self.stack.future().len())
            .field("grouping", &self.modifiers.is_grouping())
            .field("pending", &self.modifiers.has_pending())
            .field("filtering", &self.modifiers.is_filtering())
            .field("config", &self.config)
            .finish()
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<T> History<T> {
    /// Creates an empty history timed by the system clock.
    pub fn new(config: HistoryConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an empty history timed by `clock`.
    pub fn with_clock(config: HistoryConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            stack: SnapshotStack::new(),
            modifiers: Modifiers::default(),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Replaces the configuration.
    ///
    /// Takes effect on the next push. An open throttle window keeps its
    /// original deadline, and `past` is not trimmed until the next append.
    pub fn set_config(&mut self, config: HistoryConfig) {
        self.config = config;
    }

    /// Snapshots older than the current state, oldest first.
    pub fn past(&self) -> &[T] {
        self.stack.past()
    }

    /// Undone snapshots, the one right after the current state first.
    pub fn future(&self) -> &[T] {
        self.stack.future()
    }

    pub fn can_undo(&self) -> bool {
        !self.stack.past().is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.stack.future().is_empty()
    }

    pub fn is_grouping(&self) -> bool {
        self.modifiers.is_grouping()
    }

    pub fn is_filtering(&self) -> bool {
        self.modifiers.is_filtering()
    }

    /// Whether pushes are currently being dropped by the throttle window.
    pub fn is_throttling(&self) -> bool {
        self.modifiers.throttled_at(self.clock.now())
    }

    /// Closes an open throttle window so the next push is recorded.
    pub fn release_throttle(&mut self) {
        self.modifiers.release_throttle();
    }

    /// Records `snapshot`, the state from before the latest mutation.
    ///
    /// Policy, in order:
    /// 1. While grouping, only the first snapshot of the group is kept.
    /// 2. While a throttle window is open, the push is dropped.
    /// 3. With a non-zero throttle, a new window opens (this push still counts).
    /// 4. While filtering, the snapshot replaces the newest past entry.
    /// 5. Otherwise it is appended and `past` is trimmed to `max_length`.
    ///
    /// Any recorded push discards the redo branch. The container is never
    /// touched.
    pub fn push(&mut self, snapshot: T) {
        if self.modifiers.is_grouping() {
            tracing::trace!(pending = self.modifiers.has_pending(), "push held by group");
            self.modifiers.hold(snapshot);
            return;
        }

        let now = self.clock.now();
        if self.modifiers.is_throttled(now) {
            tracing::trace!("push dropped by throttle");
            return;
        }
        if let Some(window) = self.config.throttle() {
            self.modifiers.open_throttle(now, window);
        }

        if self.modifiers.is_filtering() {
            self.stack.merge_latest(snapshot);
            tracing::trace!(past_len = self.stack.past().len(), "push merged into latest entry");
            return;
        }

        self.stack.append(snapshot, self.config.max_length);
        tracing::trace!(past_len = self.stack.past().len(), "push recorded");
    }

    /// Steps back one state. See [`History::undo_by`].
    pub fn undo<C>(&mut self, container: &mut C)
    where
        C: StateContainer<T> + ?Sized,
    {
        self.undo_by(container, 1);
    }

    /// Steps back `step` states, stopping at the oldest one.
    ///
    /// No-op when `step` is 0 or there is nothing to undo.
    pub fn undo_by<C>(&mut self, container: &mut C, step: usize)
    where
        C: StateContainer<T> + ?Sized,
    {
        if step < 1 || !self.can_undo() {
            return;
        }
        self.goto(container, -signed(step));
    }

    /// Steps forward one state. See [`History::redo_by`].
    pub fn redo<C>(&mut self, container: &mut C)
    where
        C: StateContainer<T> + ?Sized,
    {
        self.redo_by(container, 1);
    }

    /// Steps forward `step` states, stopping at the newest one.
    ///
    /// No-op when `step` is 0 or there is nothing to redo.
    pub fn redo_by<C>(&mut self, container: &mut C, step: usize)
    where
        C: StateContainer<T> + ?Sized,
    {
        if step < 1 || !self.can_redo() {
            return;
        }
        self.goto(container, signed(step));
    }

    /// Discards `past` and `future`. The container keeps its state.
    pub fn clear(&mut self) {
        self.stack.clear();
        tracing::debug!("history cleared");
    }

    /// Runs `f` with grouping active.
    ///
    /// Every push made inside collapses into at most one entry: the first
    /// snapshot pushed, recorded through the normal policy when the
    /// outermost group exits. Cleanup also runs if `f` panics.
    pub fn group<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        modifiers::scoped(self, Self::begin_group, Self::end_group, f)
    }

    /// Runs `f` with filtering active.
    ///
    /// Pushes made inside replace the newest past entry instead of adding
    /// new ones. Cleanup also runs if `f` panics.
    pub fn filter<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        modifiers::scoped(self, Self::begin_filter, Self::end_filter, f)
    }

    pub(crate) fn begin_group(&mut self) {
        self.modifiers.enter_group();
    }

    pub(crate) fn end_group(&mut self) {
        if let Some(snapshot) = self.modifiers.exit_group() {
            tracing::trace!("flushing grouped snapshot");
            self.push(snapshot);
        }
    }

    pub(crate) fn begin_filter(&mut self) {
        self.modifiers.enter_filter();
    }

    pub(crate) fn end_filter(&mut self) {
        self.modifiers.exit_filter();
    }

    fn goto<C>(&mut self, container: &mut C, step: isize)
    where
        C: StateContainer<T> + ?Sized,
    {
        let current = container.get_state();
        let target = self.stack.goto(current, step);
        container.set_state(target);
        tracing::debug!(
            step = step as i64,
            past_len = self.stack.past().len(),
            future_len = self.stack.future().len(),
            "history navigated"
        );
    }
}

fn signed(step: usize) -> isize {
    isize::try_from(step).unwrap_or(isize::MAX)
}
