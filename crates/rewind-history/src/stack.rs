// Past/future snapshot sequences and step-based navigation.
// The current state is not stored here; it lives in the bound container and
// sits logically between the tail of `past` and the head of `future`.

/// Ordered snapshot sequences around the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStack<T> {
    /// Older states, oldest first.
    past: Vec<T>,
    /// Undone states, the one right after current first.
    future: Vec<T>,
}

impl<T> Default for SnapshotStack<T> {
    fn default() -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
        }
    }
}

impl<T> SnapshotStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn past(&self) -> &[T] {
        &self.past
    }

    pub fn future(&self) -> &[T] {
        &self.future
    }

    /// Appends a new entry, discards the redo branch and evicts the oldest
    /// entries beyond `max_length`.
    pub fn append(&mut self, snapshot: T, max_length: usize) {
        self.past.push(snapshot);
        self.future.clear();
        if self.past.len() > max_length {
            let excess = self.past.len() - max_length;
            self.past.drain(..excess);
        }
    }

    /// Replaces the newest past entry (or appends to an empty `past`) and
    /// discards the redo branch.
    pub fn merge_latest(&mut self, snapshot: T) {
        self.past.pop();
        self.past.push(snapshot);
        self.future.clear();
    }

    /// Drops both sequences.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Moves `step` positions through the timeline `past ++ [current] ++ future`
    /// and returns the state that becomes current.
    ///
    /// Negative steps go back, positive steps go forward. The target is
    /// clamped to the timeline bounds. No snapshot is created or lost: the
    /// old current takes its place in `past` or `future`.
    pub fn goto(&mut self, current: T, step: isize) -> T {
        let past_len = self.past.len();
        let mut all = std::mem::take(&mut self.past);
        all.reserve(self.future.len() + 1);
        all.push(current);
        all.append(&mut self.future);

        let last = all.len() - 1;
        let target = if step < 0 {
            past_len.saturating_sub(step.unsigned_abs())
        } else {
            past_len.saturating_add(step.unsigned_abs()).min(last)
        };

        self.future = all.split_off(target + 1);
        // `all` is now past ++ [target], so this removes the tail.
        let state = all.remove(target);
        self.past = all;
        state
    }
}
