use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use slabmap::SlabMap;

use crate::Subscription;


/// A publish/subscribe hub that fans out change notifications from an engine
/// to the rendering units observing it.
///
/// Cloning a `Notifier` yields another handle to the same hub. One notifier
/// is typically shared by every watch and selector reading the same engine.
///
/// `notify` invokes subscribers synchronously, in registration order, with no
/// isolation between them: a panicking subscriber aborts the remaining
/// fan-out for that cycle. That is a subscriber bug, not a notifier fault.
#[derive(Clone, Default)]
pub struct Notifier(Rc<NotifierData>);

#[derive(Default)]
struct NotifierData {
    subscribers: RefCell<SlabMap<Subscriber>>,
    next_seq: Cell<u64>,
    depth: Cell<u32>,
    dirty: Cell<bool>,
}

struct Subscriber {
    seq: u64,
    f: Rc<RefCell<dyn FnMut()>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `f` to be called on every notification.
    ///
    /// The callback stays registered until the returned [`Subscription`] is
    /// dropped. Subscribers added during a fan-out are not called until the
    /// next notification.
    pub fn subscribe(&self, f: impl FnMut() + 'static) -> Subscription {
        let seq = self.0.next_seq.get();
        self.0.next_seq.set(seq + 1);
        let key = self.0.subscribers.borrow_mut().insert(Subscriber {
            seq,
            f: Rc::new(RefCell::new(f)),
        });
        let data = Rc::downgrade(&self.0);
        Subscription::from_fn(move || {
            if let Some(data) = data.upgrade() {
                data.subscribers.borrow_mut().remove(key);
            }
        })
    }

    /// Invokes every subscriber, unless a batch is active.
    ///
    /// Inside [`batch`](Self::batch) the fan-out is deferred: any number of
    /// `notify` calls collapse into at most one fan-out when the outermost
    /// batch exits.
    pub fn notify(&self) {
        if self.0.depth.get() > 0 {
            self.0.dirty.set(true);
            return;
        }
        self.0.fan_out();
    }

    /// Runs `f` with notifications deferred.
    ///
    /// Nested calls are supported: the hub keeps a reentrancy depth, and
    /// pending notifications fire exactly once when the outermost batch
    /// exits. The depth is restored even if `f` panics; in that case the
    /// pending fan-out is discarded rather than run during unwinding.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = BatchGuard::enter(&self.0);
        f()
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.subscribers.borrow().len()
    }
}

impl NotifierData {
    fn fan_out(&self) {
        // Snapshot the set before calling out, so subscribers may freely
        // subscribe or unsubscribe from within a callback. Slab keys are
        // reused after removal, so registration order is restored by seq.
        let mut fs: Vec<(u64, Weak<RefCell<dyn FnMut()>>)> = self
            .subscribers
            .borrow()
            .values()
            .map(|s| (s.seq, Rc::downgrade(&s.f)))
            .collect();
        fs.sort_unstable_by_key(|(seq, _)| *seq);
        for (_, f) in fs {
            if let Some(f) = f.upgrade() {
                (&mut *f.borrow_mut())();
            }
        }
    }
}

struct BatchGuard<'a>(&'a NotifierData);

impl<'a> BatchGuard<'a> {
    fn enter(data: &'a NotifierData) -> Self {
        data.depth.set(data.depth.get() + 1);
        BatchGuard(data)
    }
}
impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        let data = self.0;
        data.depth.set(data.depth.get() - 1);
        if data.depth.get() == 0 && data.dirty.replace(false) && !std::thread::panicking() {
            data.fan_out();
        }
    }
}
