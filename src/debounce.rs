
/// Defers a synchronous engine call until a quiet period follows the last
/// dependency or delay change.
///
/// The adapter rides on the host's render clock rather than owning a timer
/// thread: the host passes its `now_ms` timestamp (the same clock it feeds
/// to engine `tick` calls) into [`update`](Self::update) and
/// [`poll`](Self::poll) on each cycle.
///
/// Exactly one fire happens per quiet period of length `delay_ms`; a deadline
/// replaced by a newer `update`, or cleared by [`cancel`](Self::cancel),
/// never fires. The call itself is supplied at poll time, so the fired call
/// always observes the caller's latest captured state, not the state at
/// scheduling time.
pub struct Debounce<D, T> {
    deps: Option<(D, f64)>,
    deadline: Option<f64>,
    value: Option<T>,
}

impl<D: PartialEq, T> Debounce<D, T> {
    /// Starts with no value and no pending deadline.
    pub fn new() -> Self {
        Self {
            deps: None,
            deadline: None,
            value: None,
        }
    }

    /// Re-arms the deadline to `now_ms + delay_ms` whenever `deps` or
    /// `delay_ms` differs from the previous call. The replaced deadline is
    /// cancelled unconditionally.
    pub fn update(&mut self, deps: D, delay_ms: f64, now_ms: f64) {
        let unchanged = matches!(&self.deps, Some((d, delay)) if *d == deps && *delay == delay_ms);
        if !unchanged {
            self.deps = Some((deps, delay_ms));
            self.deadline = Some(now_ms + delay_ms);
        }
    }

    /// Fires `call` if a pending deadline has been reached, storing its
    /// result. Returns the last stored value.
    pub fn poll(&mut self, now_ms: f64, call: impl FnOnce() -> T) -> Option<&T> {
        if let Some(deadline) = self.deadline {
            if now_ms >= deadline {
                self.deadline = None;
                self.value = Some(call());
            }
        }
        self.value.as_ref()
    }

    /// The last stored value, if any fire has happened yet.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Clears any pending deadline. A cancelled deadline never fires.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

impl<D: PartialEq, T> Default for Debounce<D, T> {
    fn default() -> Self {
        Self::new()
    }
}
