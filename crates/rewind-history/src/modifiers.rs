/// Recording modifiers: grouping, filtering and the throttle window.
///
/// Grouping and filtering are scoped: a scope is entered before the caller's
/// closure runs and is always left afterwards, even if the closure panics.
/// Scopes nest by depth; the modifier stays active until the outermost scope
/// exits.
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Per-history modifier state.
#[derive(Debug, Clone)]
pub struct Modifiers<T> {
    group_depth: u32,
    /// First snapshot pushed while grouping; flushed when the outermost
    /// group exits.
    pending: Option<T>,
    filter_depth: u32,
    /// End of the current throttle window, if one is open.
    throttled_until: Option<Instant>,
}

impl<T> Default for Modifiers<T> {
    fn default() -> Self {
        Self {
            group_depth: 0,
            pending: None,
            filter_depth: 0,
            throttled_until: None,
        }
    }
}

impl<T> Modifiers<T> {
    pub fn is_grouping(&self) -> bool {
        self.group_depth > 0
    }

    pub fn is_filtering(&self) -> bool {
        self.filter_depth > 0
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn enter_group(&mut self) {
        self.group_depth += 1;
    }

    /// Leaves one group level. Returns the pending snapshot when this was
    /// the outermost level.
    pub(crate) fn exit_group(&mut self) -> Option<T> {
        self.group_depth = self.group_depth.saturating_sub(1);
        if self.group_depth == 0 {
            self.pending.take()
        } else {
            None
        }
    }

    /// Keeps `snapshot` only if nothing is pending yet.
    pub(crate) fn hold(&mut self, snapshot: T) {
        if self.pending.is_none() {
            self.pending = Some(snapshot);
        }
    }

    pub(crate) fn enter_filter(&mut self) {
        self.filter_depth += 1;
    }

    pub(crate) fn exit_filter(&mut self) {
        self.filter_depth = self.filter_depth.saturating_sub(1);
    }

    /// Whether a throttle window is open at `now`. An expired window is
    /// cleared on the way.
    pub(crate) fn is_throttled(&mut self, now: Instant) -> bool {
        match self.throttled_until {
            Some(until) if now < until => true,
            Some(_) => {
                self.throttled_until = None;
                tracing::trace!("throttle window released");
                false
            }
            None => false,
        }
    }

    /// Read-only variant of [`Modifiers::is_throttled`].
    pub fn throttled_at(&self, now: Instant) -> bool {
        self.throttled_until.is_some_and(|until| now < until)
    }

    pub(crate) fn open_throttle(&mut self, now: Instant, window: Duration) {
        self.throttled_until = Some(now + window);
    }

    pub(crate) fn release_throttle(&mut self) {
        self.throttled_until = None;
    }
}

/// Runs `f` between `enter` and `exit`, calling `exit` on every path out.
///
/// A panic inside `f` is caught, `exit` runs, then the panic resumes with
/// its original payload. Return values (including `Err`) pass through.
pub(crate) fn scoped<S, R>(
    target: &mut S,
    enter: fn(&mut S),
    exit: fn(&mut S),
    f: impl FnOnce(&mut S) -> R,
) -> R {
    enter(target);
    let result = panic::catch_unwind(AssertUnwindSafe(|| f(&mut *target)));
    exit(target);
    match result {
        Ok(value) => value,
        Err(payload) => panic::resume_unwind(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_inactive() {
        let mods = Modifiers::<u8>::default();
        assert!(!mods.is_grouping());
        assert!(!mods.is_filtering());
        assert!(!mods.has_pending());
        assert!(!mods.throttled_at(Instant::now()));
    }

    #[test]
    fn test_hold_is_first_write_wins() {
        let mut mods = Modifiers::default();
        mods.enter_group();
        mods.hold(1);
        mods.hold(2);
        mods.hold(3);
        assert_eq!(mods.exit_group(), Some(1));
        assert!(!mods.has_pending());
    }

    #[test]
    fn test_nested_group_flushes_only_at_outermost() {
        let mut mods = Modifiers::default();
        mods.enter_group();
        mods.enter_group();
        mods.hold("a");
        assert_eq!(mods.exit_group(), None);
        assert!(mods.is_grouping());
        assert_eq!(mods.exit_group(), Some("a"));
        assert!(!mods.is_grouping());
    }

    #[test]
    fn test_nested_filter_depth() {
        let mut mods = Modifiers::<u8>::default();
        mods.enter_filter();
        mods.enter_filter();
        mods.exit_filter();
        assert!(mods.is_filtering());
        mods.exit_filter();
        assert!(!mods.is_filtering());
    }

    #[test]
    fn test_unbalanced_exit_does_not_underflow() {
        let mut mods = Modifiers::<u8>::default();
        mods.exit_filter();
        assert_eq!(mods.exit_group(), None);
        assert!(!mods.is_filtering());
        assert!(!mods.is_grouping());
    }

    #[test]
    fn test_throttle_window_expires() {
        let mut mods = Modifiers::<u8>::default();
        let start = Instant::now();
        mods.open_throttle(start, Duration::from_millis(100));

        assert!(mods.is_throttled(start));
        assert!(mods.is_throttled(start + Duration::from_millis(99)));
        assert!(!mods.is_throttled(start + Duration::from_millis(100)));
        // Cleared once observed as expired.
        assert!(!mods.throttled_at(start));
    }

    #[test]
    fn test_release_throttle() {
        let mut mods = Modifiers::<u8>::default();
        let start = Instant::now();
        mods.open_throttle(start, Duration::from_secs(60));
        mods.release_throttle();
        assert!(!mods.is_throttled(start));
    }

    #[test]
    fn test_scoped_runs_exit_after_value() {
        let mut depth = 0u32;
        let seen = scoped(&mut depth, |d| *d += 1, |d| *d -= 1, |d| *d);
        assert_eq!(seen, 1);
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_scoped_passes_errors_through() {
        let mut depth = 0u32;
        let result: Result<(), &str> =
            scoped(&mut depth, |d| *d += 1, |d| *d -= 1, |_| Err("boom"));
        assert_eq!(result, Err("boom"));
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_scoped_runs_exit_on_panic() {
        let mut depth = 0u32;
        let caught = panic::catch_unwind(AssertUnwindSafe(|| {
            scoped(&mut depth, |d| *d += 1, |d| *d -= 1, |_| -> () {
                panic!("inside scope")
            })
        }));
        assert!(caught.is_err());
        assert_eq!(depth, 0);
    }
}
