mod async_call;
mod debounce;
mod equality;
mod handle;
mod memo;
mod notifier;
mod selector;
mod subscription;
mod watch;

pub use async_call::*;
pub use debounce::*;
pub use equality::*;
pub use handle::*;
pub use memo::*;
pub use notifier::*;
pub use selector::*;
pub use subscription::*;
pub use watch::*;
