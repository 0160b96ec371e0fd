use std::mem::take;

/// A handle that removes a subscriber when dropped.
///
/// Returned by [`Notifier::subscribe`](crate::Notifier::subscribe). Hold it
/// for as long as the callback should stay registered.
#[derive(Default)]
#[must_use]
pub struct Subscription(RawSubscription);

impl Subscription {
    /// A subscription that does nothing when dropped.
    ///
    /// Used by inert watches and selectors created from a detached
    /// [`Handle`](crate::Handle), which never register anything.
    pub fn empty() -> Self {
        Subscription(RawSubscription::Empty)
    }
    pub fn from_fn(f: impl FnOnce() + 'static) -> Self {
        Subscription(RawSubscription::Fn(Box::new(f)))
    }
}
impl Drop for Subscription {
    fn drop(&mut self) {
        match take(&mut self.0) {
            RawSubscription::Empty => {}
            RawSubscription::Fn(f) => f(),
        }
    }
}

#[derive(Default)]
enum RawSubscription {
    #[default]
    Empty,
    Fn(Box<dyn FnOnce() + 'static>),
}
