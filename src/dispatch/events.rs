//! Dispatcher observers.
//!
//! Observers are told about registrations, handler invocations and chain
//! exhaustion. They never influence dispatch.

use crate::dispatch::handler::HandlerKind;
use crate::error::DispatchError;

/// Something that happened inside a dispatcher.
#[derive(Debug)]
pub enum DispatchEvent<'a> {
    /// A handler was registered.
    Registered { route: &'a str, kind: HandlerKind },
    /// A handler is about to be invoked.
    Invoked { route: &'a str, kind: HandlerKind },
    /// The dispatcher ran out of entries.
    Exhausted { error: Option<&'a DispatchError> },
}

pub trait Observer: Send + Sync {
    fn notify(&self, event: &DispatchEvent<'_>);
}

impl<F> Observer for F
where
    F: Fn(&DispatchEvent<'_>) + Send + Sync,
{
    fn notify(&self, event: &DispatchEvent<'_>) {
        self(event)
    }
}
