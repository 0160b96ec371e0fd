use std::cell::Cell;

use crate::Memo;

#[test]
fn computes_on_first_update() {
    let mut m = Memo::new();
    assert!(m.value().is_none());
    assert_eq!(*m.update((1, "a"), || 10), 10);
    assert_eq!(m.value(), Some(&10));
}

#[test]
fn skips_recompute_while_deps_unchanged() {
    let calls = Cell::new(0);
    let mut m = Memo::new();
    for _ in 0..3 {
        m.update(1, || {
            calls.set(calls.get() + 1);
            "computed"
        });
    }
    assert_eq!(calls.get(), 1);
}

#[test]
fn recomputes_on_dep_change() {
    let mut m = Memo::new();
    assert_eq!(*m.update([1, 2], || 3), 3);
    assert_eq!(*m.update([1, 2], || 99), 3);
    assert_eq!(*m.update([1, 3], || 4), 4);
    assert_eq!(*m.update([1, 2], || 5), 5); // old deps are not remembered
}

#[test]
#[should_panic(expected = "engine failure")]
fn panicking_compute_propagates() {
    let mut m: Memo<i32, i32> = Memo::new();
    m.update(1, || panic!("engine failure"));
}
