use std::{cell::Cell, rc::Rc};

use crate::{Notifier, Watch};

struct Counted {
    calls: Rc<Cell<u32>>,
    value: Rc<Cell<i32>>,
}
impl Counted {
    fn new(value: i32) -> Self {
        Self {
            calls: Rc::new(Cell::new(0)),
            value: Rc::new(Cell::new(value)),
        }
    }
    fn watch(&self, notifier: &Notifier) -> Watch<i32> {
        let calls = self.calls.clone();
        let value = self.value.clone();
        Watch::new(notifier, move || {
            calls.set(calls.get() + 1);
            value.get()
        })
    }
}

#[test]
fn reads_snapshot_lazily() {
    let n = Notifier::new();
    let c = Counted::new(10);
    let w = c.watch(&n);
    assert_eq!(c.calls.get(), 0);
    assert_eq!(w.get(), 10);
    assert_eq!(c.calls.get(), 1);
}

#[test]
fn repeated_reads_between_notifications_are_consistent() {
    let n = Notifier::new();
    let c = Counted::new(10);
    let w = c.watch(&n);

    assert_eq!(w.get(), 10);
    // The engine value changed, but no notification was published:
    // the watch keeps returning the snapshot it already accepted.
    c.value.set(20);
    assert_eq!(w.get(), 10);
    assert_eq!(w.get(), 10);
    assert_eq!(c.calls.get(), 1);

    n.notify();
    assert_eq!(w.get(), 20);
    assert_eq!(c.calls.get(), 2);
}

#[test]
fn version_bumps_once_per_reread() {
    let n = Notifier::new();
    let c = Counted::new(1);
    let w = c.watch(&n);
    assert_eq!(w.version(), 0);

    assert_eq!(w.get(), 1);
    assert_eq!(w.version(), 1);
    assert_eq!(w.get(), 1);
    assert_eq!(w.version(), 1);

    n.notify();
    n.notify();
    assert_eq!(w.get(), 1);
    assert_eq!(w.version(), 2);
}

#[test]
fn retarget_moves_subscription() {
    let n1 = Notifier::new();
    let n2 = Notifier::new();
    let c = Counted::new(5);
    let w = c.watch(&n1);
    assert_eq!(w.get(), 5);
    assert_eq!(n1.subscriber_count(), 1);

    w.retarget(&n2);
    assert_eq!(n1.subscriber_count(), 0);
    assert_eq!(n2.subscriber_count(), 1);

    c.value.set(6);
    n1.notify();
    assert_eq!(w.get(), 6); // retarget itself marks the value dirty

    c.value.set(7);
    n2.notify();
    assert_eq!(w.get(), 7);
}

#[test]
fn dropping_watch_unsubscribes() {
    let n = Notifier::new();
    let c = Counted::new(0);
    let w = c.watch(&n);
    assert_eq!(n.subscriber_count(), 1);
    drop(w);
    drop(c);
    assert_eq!(n.subscriber_count(), 0);
    n.notify();
}

#[test]
fn inert_watch_never_subscribes() {
    let n = Notifier::new();
    let w = Watch::inert(99);
    assert_eq!(n.subscriber_count(), 0);
    assert_eq!(w.get(), 99);
    assert_eq!(w.version(), 0);

    w.retarget(&n);
    assert_eq!(n.subscriber_count(), 0);
    n.notify();
    assert_eq!(w.get(), 99);
    assert_eq!(w.version(), 0);
}

#[test]
fn serializes_last_read_snapshot() {
    let n = Notifier::new();
    let c = Counted::new(42);
    let w = c.watch(&n);
    assert!(serde_json::to_string(&w).is_err()); // nothing read yet
    w.get();
    assert_eq!(serde_json::to_string(&w).unwrap(), "42");
}

#[test]
fn clones_share_the_same_cache() {
    let n = Notifier::new();
    let c = Counted::new(1);
    let w = c.watch(&n);
    let w2 = w.clone();
    assert_eq!(w.get(), 1);
    assert_eq!(w2.get(), 1);
    assert_eq!(c.calls.get(), 1);
}
