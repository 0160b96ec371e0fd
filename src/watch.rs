use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use derive_ex::derive_ex;
use serde::Serialize;

use crate::{Notifier, Subscription};

#[cfg(test)]
mod tests;

/// Subscribes a snapshot function to a [`Notifier`] and exposes a consistent
/// view of its latest value.
///
/// The snapshot function must be side-effect-free. It is re-invoked at most
/// once per notification, lazily, on the next [`get`](Self::get): repeated
/// reads between two notifications observe one consistent value, even if the
/// function would allocate a fresh value on every call.
///
/// [`version`](Self::version) is a monotonic counter bumped on each re-read,
/// the same version-gate pattern engines use to let callers skip work when
/// nothing changed.
#[derive_ex(Clone, bound())]
pub struct Watch<T: 'static>(Rc<WatchNode<T>>);

struct WatchNode<T> {
    state: RefCell<WatchState<T>>,
}

struct WatchState<T> {
    /// `None` for inert watches, which never subscribe and never recompute.
    read: Option<Box<dyn Fn() -> T>>,
    value: Option<T>,
    dirty: bool,
    version: u64,
    subscription: Subscription,
}

impl<T: 'static> Watch<T> {
    pub fn new(notifier: &Notifier, read: impl Fn() -> T + 'static) -> Self {
        let node = Rc::new(WatchNode {
            state: RefCell::new(WatchState {
                read: Some(Box::new(read)),
                value: None,
                dirty: true,
                version: 0,
                subscription: Subscription::empty(),
            }),
        });
        let subscription = subscribe_node(notifier, &node);
        node.state.borrow_mut().subscription = subscription;
        Watch(node)
    }

    /// A watch that never subscribes and permanently returns `empty`.
    ///
    /// This is the null-engine case: a detached [`Handle`](crate::Handle)
    /// hands these out so consumers see the documented empty value without
    /// any registration taking place.
    pub fn inert(empty: T) -> Self {
        Watch(Rc::new(WatchNode {
            state: RefCell::new(WatchState {
                read: None,
                value: Some(empty),
                dirty: false,
                version: 0,
                subscription: Subscription::empty(),
            }),
        }))
    }

    /// Returns the current value, re-reading the snapshot only if the
    /// notifier has fired since the last read.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        let s = &mut *self.0.state.borrow_mut();
        if s.dirty || s.value.is_none() {
            if let Some(read) = &s.read {
                let value = read();
                s.value = Some(value);
                s.version += 1;
            }
            s.dirty = false;
        }
        match &s.value {
            Some(value) => value.clone(),
            None => unreachable!(),
        }
    }

    /// Count of accepted re-reads. Unchanged across reads with no
    /// intervening notification; always zero for inert watches.
    pub fn version(&self) -> u64 {
        self.0.state.borrow().version
    }

    /// Moves the subscription to a different notifier.
    ///
    /// The old hub is unsubscribed, the new one subscribed, and the value is
    /// marked dirty so the next read goes back to the snapshot function.
    /// Inert watches stay inert.
    pub fn retarget(&self, notifier: &Notifier) {
        let subscription = if self.0.state.borrow().read.is_some() {
            subscribe_node(notifier, &self.0)
        } else {
            Subscription::empty()
        };
        let old = {
            let mut s = self.0.state.borrow_mut();
            s.dirty = s.read.is_some();
            std::mem::replace(&mut s.subscription, subscription)
        };
        drop(old);
    }
}

fn subscribe_node<T: 'static>(notifier: &Notifier, node: &Rc<WatchNode<T>>) -> Subscription {
    let weak: Weak<WatchNode<T>> = Rc::downgrade(node);
    notifier.subscribe(move || {
        if let Some(node) = weak.upgrade() {
            node.state.borrow_mut().dirty = true;
        }
    })
}

/// Serializes the last read snapshot, so hosts can persist what was
/// rendered. Fails if no read has happened yet.
impl<T> Serialize for Watch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        match self.0.state.try_borrow() {
            Ok(s) => match &s.value {
                Some(value) => value.serialize(serializer),
                None => Err(serde::ser::Error::custom("not yet read")),
            },
            Err(_) => Err(serde::ser::Error::custom("borrowed")),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Watch<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.state.try_borrow() {
            Ok(s) => f.debug_struct("Watch").field("value", &s.value).finish(),
            Err(_) => write!(f, "<borrowed>"),
        }
    }
}
