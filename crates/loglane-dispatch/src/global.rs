//! Process-wide default dispatcher.
//!
//! Created on first use with a styled console sink at Info. Replace it with
//! [`set_default`] and tear it down with [`shutdown`]; the emission macros
//! always go through whichever dispatcher is current.

use crate::dispatcher::Dispatcher;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::debug;

static DEFAULT: OnceLock<RwLock<Arc<Dispatcher>>> = OnceLock::new();

fn slot() -> &'static RwLock<Arc<Dispatcher>> {
    DEFAULT.get_or_init(|| RwLock::new(Arc::new(Dispatcher::default())))
}

/// The current default dispatcher
pub fn default_dispatcher() -> Arc<Dispatcher> {
    Arc::clone(&slot().read().unwrap_or_else(PoisonError::into_inner))
}

/// Install `dispatcher` as the default and return the one it replaces.
///
/// The previous dispatcher keeps running; shut it down once nothing else
/// holds it.
pub fn set_default(dispatcher: impl Into<Arc<Dispatcher>>) -> Arc<Dispatcher> {
    let mut current = slot().write().unwrap_or_else(PoisonError::into_inner);
    debug!("Replacing default dispatcher");
    std::mem::replace(&mut *current, dispatcher.into())
}

/// Shut the current default dispatcher's sinks down
pub fn shutdown() {
    default_dispatcher().shutdown();
}

#[cfg(test)]
pub(crate) static TEST_GUARD: std::sync::Mutex<()> = std::sync::Mutex::new(());
