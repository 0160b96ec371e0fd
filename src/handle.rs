use std::{cell::RefCell, rc::Rc};

use derive_ex::derive_ex;
use serde_json::Value;

use crate::{Notifier, Selector, Watch};


/// Pairs an engine with a [`Notifier`], giving it the dispatch/read split
/// every domain handle is built from.
///
/// The engine is opaque: it has mutator methods and query methods, all
/// synchronous, and no notion of subscribers. `dispatch` runs a mutator and
/// publishes a notification; `read` runs a query and publishes nothing.
///
/// A handle may be *detached* (no engine). Detached handles are inert, not
/// erroneous: dispatch is a no-op, reads return the caller's documented
/// empty value, and the watch/select hooks never subscribe to anything.
///
/// Cloning a handle is cheap and shares the engine and the hub.
#[derive_ex(Clone, bound())]
pub struct Handle<E: 'static> {
    engine: Option<Rc<RefCell<E>>>,
    notifier: Notifier,
}

impl<E: 'static> Handle<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine: Some(Rc::new(RefCell::new(engine))),
            notifier: Notifier::new(),
        }
    }

    /// A handle with no engine behind it.
    pub fn detached() -> Self {
        Self {
            engine: None,
            notifier: Notifier::new(),
        }
    }

    pub fn is_detached(&self) -> bool {
        self.engine.is_none()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Escape hatch for direct engine access. Mutating through this
    /// reference bypasses notification.
    pub fn engine(&self) -> Option<&Rc<RefCell<E>>> {
        self.engine.as_ref()
    }

    /// Runs a mutator, then notifies. Inside [`batch`](Self::batch) the
    /// notification is deferred with the rest of the batch.
    ///
    /// A panicking mutator propagates to the caller before any
    /// notification is published.
    pub fn dispatch<R>(&self, mutate: impl FnOnce(&mut E) -> R) -> Option<R> {
        let engine = self.engine.as_ref()?;
        let r = mutate(&mut engine.borrow_mut());
        self.notifier.notify();
        Some(r)
    }

    /// Runs a query without notifying.
    pub fn read<R>(&self, query: impl FnOnce(&E) -> R) -> Option<R> {
        Some(query(&self.engine.as_ref()?.borrow()))
    }

    /// Runs a query, or returns `empty` when detached.
    pub fn read_or<R>(&self, empty: R, query: impl FnOnce(&E) -> R) -> R {
        match &self.engine {
            Some(engine) => query(&engine.borrow()),
            None => empty,
        }
    }

    /// Coalesces every dispatch inside `f` into at most one notification.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.notifier.batch(f)
    }

    /// A [`Watch`] over a query, or an inert watch returning `empty` when
    /// detached.
    pub fn watch<T: Clone + 'static>(
        &self,
        read: impl Fn(&E) -> T + 'static,
        empty: T,
    ) -> Watch<T> {
        match &self.engine {
            Some(engine) => {
                let engine = engine.clone();
                Watch::new(&self.notifier, move || read(&engine.borrow()))
            }
            None => Watch::inert(empty),
        }
    }

    /// A shallow-equality [`Selector`] over a JSON query. The detached
    /// empty value is `Value::Null`.
    pub fn select(&self, read: impl Fn(&E) -> Value + 'static) -> Selector<Value> {
        match &self.engine {
            Some(engine) => {
                let engine = engine.clone();
                Selector::new(&self.notifier, move || read(&engine.borrow()))
            }
            None => Selector::inert(Value::Null),
        }
    }

    /// A [`Selector`] with a caller-supplied equality function, or an inert
    /// selector returning `empty` when detached.
    pub fn select_with_eq<T: 'static>(
        &self,
        read: impl Fn(&E) -> T + 'static,
        empty: T,
        eq: impl Fn(&T, &T) -> bool + 'static,
    ) -> Selector<T> {
        match &self.engine {
            Some(engine) => {
                let engine = engine.clone();
                Selector::with_eq(&self.notifier, move || read(&engine.borrow()), eq)
            }
            None => Selector::inert(empty),
        }
    }
}
