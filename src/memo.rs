#[cfg(test)]
mod tests;

/// Recomputes a synchronous engine call only when its dependency list
/// changes.
///
/// No subscription and no loading state: the call is assumed cheap enough to
/// run on any dependency change, and a panicking call propagates to the
/// caller. Dependencies are compared per element, so tuples and arrays of
/// primitives are the usual choice for `D`.
pub struct Memo<D, T> {
    cached: Option<(D, T)>,
}

impl<D: PartialEq, T> Memo<D, T> {
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// Returns the cached value, recomputing via `compute` only if `deps`
    /// differs from the previously seen dependency list.
    pub fn update(&mut self, deps: D, compute: impl FnOnce() -> T) -> &T {
        let stale = !matches!(&self.cached, Some((d, _)) if *d == deps);
        if stale {
            self.cached = Some((deps, compute()));
        }
        match &self.cached {
            Some((_, value)) => value,
            None => unreachable!(),
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.cached.as_ref().map(|(_, value)| value)
    }
}

impl<D: PartialEq, T> Default for Memo<D, T> {
    fn default() -> Self {
        Self::new()
    }
}
