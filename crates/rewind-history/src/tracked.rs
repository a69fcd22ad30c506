/// Binds a `History` to a state container.
///
/// Every replacement made through `Tracked` is recorded: the state from
/// before the change is read first, the change is applied, and only then
/// is the old state pushed. `past` therefore always holds where the state
/// came from, never where it ended up.
use std::sync::Arc;

use crate::clock::Clock;
use crate::config::HistoryConfig;
use crate::container::StateContainer;
use crate::history::History;
use crate::modifiers;

/// A state container with undo/redo history attached.
#[derive(Debug)]
pub struct Tracked<T, C> {
    container: C,
    history: History<T>,
}

impl<T, C: StateContainer<T>> Tracked<T, C> {
    pub fn new(container: C, config: HistoryConfig) -> Self {
        Self {
            container,
            history: History::new(config),
        }
    }

    pub fn with_clock(container: C, config: HistoryConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            container,
            history: History::with_clock(config, clock),
        }
    }

    /// Attaches an existing history.
    pub fn from_parts(container: C, history: History<T>) -> Self {
        Self { container, history }
    }

    pub fn into_parts(self) -> (C, History<T>) {
        (self.container, self.history)
    }

    pub fn get_state(&self) -> T {
        self.container.get_state()
    }

    /// Replaces the state and records the previous one.
    pub fn set_state(&mut self, next: T) {
        let previous = self.container.get_state();
        self.container.set_state(next);
        self.history.push(previous);
    }

    /// Computes the next state from the current one, then records like
    /// [`Tracked::set_state`].
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) {
        let previous = self.container.get_state();
        let next = f(&previous);
        self.container.set_state(next);
        self.history.push(previous);
    }

    pub fn history(&self) -> &History<T> {
        &self.history
    }

    /// Direct access to the history, e.g. to push or reconfigure.
    pub fn history_mut(&mut self) -> &mut History<T> {
        &mut self.history
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn undo(&mut self) {
        self.history.undo(&mut self.container);
    }

    pub fn undo_by(&mut self, step: usize) {
        self.history.undo_by(&mut self.container, step);
    }

    pub fn redo(&mut self) {
        self.history.redo(&mut self.container);
    }

    pub fn redo_by(&mut self, step: usize) {
        self.history.redo_by(&mut self.container, step);
    }

    /// Drops all recorded history; the current state stays.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Runs `f` so that all changes it makes form a single undo step.
    pub fn group<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        modifiers::scoped(
            self,
            |t| t.history.begin_group(),
            |t| t.history.end_group(),
            f,
        )
    }

    /// Runs `f` so that its changes overwrite the newest undo step instead
    /// of adding new ones.
    pub fn filter<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        modifiers::scoped(
            self,
            |t| t.history.begin_filter(),
            |t| t.history.end_filter(),
            f,
        )
    }
}
