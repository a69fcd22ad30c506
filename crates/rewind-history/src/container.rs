// The state container contract the history engine is bound to.

/// An externally owned holder of the current state.
///
/// `get_state` must be free of side effects, and a value passed to
/// `set_state` must be what the next `get_state` returns.
pub trait StateContainer<T> {
    fn get_state(&self) -> T;
    fn set_state(&mut self, next: T);
}

/// Plain in-memory container holding a single value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store<T> {
    state: T,
}

impl<T> Store<T> {
    pub fn new(initial: T) -> Self {
        Self { state: initial }
    }

    /// Borrows the current state without cloning it.
    pub fn state(&self) -> &T {
        &self.state
    }

    pub fn into_inner(self) -> T {
        self.state
    }
}

impl<T: Clone> StateContainer<T> for Store<T> {
    fn get_state(&self) -> T {
        self.state.clone()
    }

    fn set_state(&mut self, next: T) {
        self.state = next;
    }
}

impl<T, C: StateContainer<T> + ?Sized> StateContainer<T> for &mut C {
    fn get_state(&self) -> T {
        (**self).get_state()
    }

    fn set_state(&mut self, next: T) {
        (**self).set_state(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_get_set() {
        let mut store = Store::new(String::from("a"));
        assert_eq!(store.get_state(), "a");
        store.set_state(String::from("b"));
        assert_eq!(store.get_state(), "b");
        assert_eq!(store.state(), "b");
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn bump(mut container: impl StateContainer<u32>) {
            let next = container.get_state() + 1;
            container.set_state(next);
        }

        let mut store = Store::new(1);
        bump(&mut store);
        assert_eq!(store.into_inner(), 2);
    }
}
