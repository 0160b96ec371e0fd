use std::{cell::RefCell, fmt, rc::Rc};

use futures::{
    future::LocalBoxFuture,
    task::{LocalSpawn, LocalSpawnExt},
};

use crate::Notifier;


/// Wraps a promise-like engine call with loading/result/error state and
/// latest-wins cancellation.
///
/// Each dependency change starts a new *epoch*: the previous epoch's
/// settlement becomes stale and is silently dropped if it arrives later.
/// Cancellation is cooperative: in-flight work is never stopped, only its
/// effect on this adapter's state is suppressed. The adapter owns a
/// [`Notifier`] that fires on every accepted settlement so watches and
/// selectors can observe the state.
pub struct AsyncCall<D, T: 'static> {
    deps: Option<D>,
    spawner: Rc<dyn LocalSpawn>,
    node: Rc<AsyncCallNode<T>>,
}

struct AsyncCallNode<T> {
    state: RefCell<State<T>>,
    notifier: Notifier,
}

struct State<T> {
    result: Option<Rc<T>>,
    loading: bool,
    error: Option<Rc<CallError>>,
    epoch: u64,
}

/// One read of an [`AsyncCall`]'s state.
///
/// At most one of `result`/`error` is populated; both are empty exactly
/// while a fresh epoch is still loading.
#[derive(Debug)]
pub struct AsyncState<T> {
    pub result: Option<Rc<T>>,
    pub loading: bool,
    pub error: Option<Rc<CallError>>,
}

impl<T> Clone for AsyncState<T> {
    fn clone(&self) -> Self {
        Self {
            result: self.result.clone(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

impl<D, T: 'static> AsyncCall<D, T> {
    /// `spawner` is the host's single-threaded executor handle; spawned
    /// settlements run on the same thread as the render cycle.
    pub fn new(spawner: Rc<dyn LocalSpawn>) -> Self {
        Self {
            deps: None,
            spawner,
            node: Rc::new(AsyncCallNode {
                state: RefCell::new(State {
                    result: None,
                    loading: true,
                    error: None,
                    epoch: 0,
                }),
                notifier: Notifier::new(),
            }),
        }
    }

    /// Starts a new epoch if `deps` differs from the previous call,
    /// spawning the future produced by `call`.
    ///
    /// On an epoch change the state resets to loading with no result and no
    /// error. A settlement from an older epoch never overwrites state, even
    /// if it arrives after the newer epoch settled.
    pub fn update(
        &mut self,
        deps: D,
        call: impl FnOnce() -> LocalBoxFuture<'static, Result<T, CallError>>,
    ) where
        D: PartialEq,
    {
        if matches!(&self.deps, Some(d) if *d == deps) {
            return;
        }
        self.deps = Some(deps);
        let epoch = {
            let mut s = self.node.state.borrow_mut();
            s.epoch += 1; // everything in flight is now stale
            s.loading = true;
            s.result = None;
            s.error = None;
            s.epoch
        };
        let fut = call();
        let node = Rc::downgrade(&self.node);
        let task = async move {
            let settled = fut.await;
            let Some(node) = node.upgrade() else {
                return;
            };
            {
                let mut s = node.state.borrow_mut();
                if s.epoch != epoch {
                    return; // stale epoch, latest wins
                }
                match settled {
                    Ok(value) => {
                        s.result = Some(Rc::new(value));
                        s.error = None;
                    }
                    Err(e) => {
                        s.error = Some(Rc::new(e));
                        s.result = None;
                    }
                }
                s.loading = false;
            }
            node.notifier.notify();
        };
        if let Err(e) = self.spawner.spawn_local(task) {
            let mut s = self.node.state.borrow_mut();
            s.loading = false;
            s.error = Some(Rc::new(CallError::from(e.to_string())));
        }
    }

    pub fn state(&self) -> AsyncState<T> {
        let s = self.node.state.borrow();
        AsyncState {
            result: s.result.clone(),
            loading: s.loading,
            error: s.error.clone(),
        }
    }

    /// Fires after every accepted settlement.
    pub fn notifier(&self) -> &Notifier {
        &self.node.notifier
    }
}

impl<D, T: 'static> Drop for AsyncCall<D, T> {
    fn drop(&mut self) {
        // Mark the current epoch stale before anything else is torn down.
        self.node.state.borrow_mut().epoch += 1;
    }
}

/// A failed asynchronous engine call.
///
/// Engine errors pass through unchanged; raw values rejected at the
/// boundary (plain strings) are normalized into an error carrying the raw
/// text as its message.
#[derive(Debug)]
pub struct CallError(Box<dyn std::error::Error + 'static>);

impl CallError {
    pub fn new(source: impl std::error::Error + 'static) -> Self {
        CallError(Box::new(source))
    }

    pub fn message(&self) -> String {
        self.0.to_string()
    }

    pub fn inner(&self) -> &(dyn std::error::Error + 'static) {
        &*self.0
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CallError {
    fn from(message: String) -> Self {
        CallError(Box::new(RawMessage(message)))
    }
}
impl From<&str> for CallError {
    fn from(message: &str) -> Self {
        message.to_string().into()
    }
}

#[derive(Debug)]
struct RawMessage(String);

impl fmt::Display for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
impl std::error::Error for RawMessage {}
