use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use derive_ex::derive_ex;
use serde_json::Value;

use crate::{shallow_eq, Notifier, Watch};


/// A memoizing selector over an engine snapshot.
///
/// Built on [`Watch`]: the derived snapshot function computes a candidate
/// value, compares it against the last accepted value with the selector's
/// equality function, and returns the previously accepted `Rc` (the exact
/// same allocation) when they are equal. Consumers therefore keep referential
/// identity across renders as long as the logical value is unchanged, even
/// though the underlying snapshot function allocates a fresh value per call.
///
/// Each selector owns its cache; two selectors over the same snapshot never
/// share accepted values.
#[derive_ex(Clone, bound())]
pub struct Selector<T: 'static> {
    watch: Watch<Rc<T>>,
    cache: Rc<SelectorCache<T>>,
}

struct SelectorCache<T> {
    accepted: RefCell<Option<Rc<T>>>,
    version: Cell<u64>,
}

impl<T: 'static> Selector<T> {
    /// A selector with a custom equality function.
    pub fn with_eq(
        notifier: &Notifier,
        compute: impl Fn() -> T + 'static,
        eq: impl Fn(&T, &T) -> bool + 'static,
    ) -> Self {
        let cache = Rc::new(SelectorCache {
            accepted: RefCell::new(None),
            version: Cell::new(0),
        });
        let c = cache.clone();
        let watch = Watch::new(notifier, move || {
            let candidate = compute();
            let mut accepted = c.accepted.borrow_mut();
            if let Some(prev) = &*accepted {
                if eq(prev, &candidate) {
                    return prev.clone();
                }
            }
            let next = Rc::new(candidate);
            *accepted = Some(next.clone());
            c.version.set(c.version.get() + 1);
            next
        });
        Selector { watch, cache }
    }

    /// A selector that never subscribes and permanently returns `empty`.
    pub fn inert(empty: T) -> Self {
        Selector {
            watch: Watch::inert(Rc::new(empty)),
            cache: Rc::new(SelectorCache {
                accepted: RefCell::new(None),
                version: Cell::new(0),
            }),
        }
    }

    /// Returns the accepted value, recomputing only if the notifier fired
    /// since the last read.
    pub fn get(&self) -> Rc<T> {
        self.watch.get()
    }

    /// Count of *accepted* values: bumps only when a candidate survives the
    /// equality check, never for structurally-equal recomputations.
    pub fn version(&self) -> u64 {
        self.cache.version.get()
    }

    /// Moves the subscription to a different notifier. Inert selectors stay
    /// inert.
    pub fn retarget(&self, notifier: &Notifier) {
        self.watch.retarget(notifier);
    }
}

impl Selector<Value> {
    /// A selector over a dynamic JSON snapshot, using [`shallow_eq`] as the
    /// acceptance test.
    pub fn new(notifier: &Notifier, compute: impl Fn() -> Value + 'static) -> Self {
        Self::with_eq(notifier, compute, |a, b| shallow_eq(a, b))
    }
}
