//! Named-event listener registry.
//!
//! `EventEmitter` maps an event name to an ordered list of listeners and
//! dispatches payloads to them synchronously. `Observable` gives any type that
//! owns an emitter the full subscribe/unsubscribe/emit surface.
//!
//! Dispatch semantics:
//! - listeners run in registration order;
//! - the listener list is snapshotted when `emit` starts, so listeners added
//!   during an emit wait for the next one;
//! - each snapshotted entry is re-checked before it runs, so a listener removed
//!   during an emit is skipped for the rest of it;
//! - the first listener error stops the dispatch and is returned to the caller.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{ListenerError, MouseError, MouseResult};


/// Callback signature stored by the registry.
pub type ListenerFn<A> = dyn Fn(&A) -> Result<(), ListenerError> + Send + Sync;

/// Shared reference to a listener callback.
///
/// Two `Listener`s are equal when they point at the same callback, which is
/// what `off` uses to find the entry to remove.
pub struct Listener<A: 'static>(Arc<ListenerFn<A>>);

impl<A: 'static> Listener<A> {
    /// Wrap a fallible callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&A) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap a callback that cannot fail.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        Self::new(move |args| {
            f(args);
            Ok(())
        })
    }

    /// Invoke the callback directly.
    pub fn call(&self, args: &A) -> Result<(), ListenerError> {
        (self.0)(args)
    }

    /// True if both handles refer to the same callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl<A: 'static> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<A: 'static> PartialEq for Listener<A> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<A: 'static> Eq for Listener<A> {}

impl<A: 'static> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

struct Entry<A: 'static> {
    id: u64,
    listener: Listener<A>,
    once: bool,
}

impl<A: 'static> Clone for Entry<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            listener: self.listener.clone(),
            once: self.once,
        }
    }
}

struct Registry<A: 'static> {
    next_id: u64,
    events: HashMap<String, Vec<Entry<A>>>,
}

impl<A: 'static> Registry<A> {
    fn contains(&self, name: &str, id: u64) -> bool {
        self.events
            .get(name)
            .is_some_and(|entries| entries.iter().any(|e| e.id == id))
    }

    fn take(&mut self, name: &str, id: u64) -> Option<Entry<A>> {
        let entries = self.events.get_mut(name)?;
        let index = entries.iter().position(|e| e.id == id)?;
        let entry = entries.remove(index);
        if entries.is_empty() {
            self.events.remove(name);
        }
        Some(entry)
    }
}

/// Thread-safe listener registry keyed by event name.
pub struct EventEmitter<A: 'static> {
    registry: Mutex<Registry<A>>,
}

impl<A: 'static> Default for EventEmitter<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> EventEmitter<A> {
    /// Create an emitter with an empty registry.
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                next_id: 0,
                events: HashMap::new(),
            }),
        }
    }

    fn add(&self, name: &str, listener: Listener<A>, once: bool) {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .events
            .entry(name.to_string())
            .or_default()
            .push(Entry { id, listener, once });
    }

    /// Append a persistent listener for `name`.
    pub fn on(&self, name: &str, listener: Listener<A>) -> &Self {
        self.add(name, listener, false);
        self
    }

    /// Append a listener that is removed right before its first invocation.
    pub fn once(&self, name: &str, listener: Listener<A>) -> &Self {
        self.add(name, listener, true);
        self
    }

    /// Remove the most recently added registration of `listener` for `name`.
    ///
    /// Does nothing if the listener is not registered for that name.
    pub fn remove_listener(&self, name: &str, listener: &Listener<A>) -> &Self {
        let mut registry = self.registry.lock();
        if let Some(entries) = registry.events.get_mut(name) {
            if let Some(index) = entries.iter().rposition(|e| e.listener.ptr_eq(listener)) {
                entries.remove(index);
            }
            if entries.is_empty() {
                registry.events.remove(name);
            }
        }
        self
    }

    /// Alias of [`EventEmitter::remove_listener`].
    pub fn off(&self, name: &str, listener: &Listener<A>) -> &Self {
        self.remove_listener(name, listener)
    }

    /// Drop every listener for `name`, or for all names when `None`.
    pub fn remove_all_listeners(&self, name: Option<&str>) -> &Self {
        let mut registry = self.registry.lock();
        match name {
            Some(name) => {
                registry.events.remove(name);
            }
            None => registry.events.clear(),
        }
        self
    }

    /// Invoke the listeners registered for `name` with `args`.
    ///
    /// Returns `Ok(true)` if the event had listeners when the dispatch started.
    /// Stops at the first failing listener and returns its error; the
    /// remaining listeners are skipped for this call only.
    pub fn emit(&self, name: &str, args: &A) -> MouseResult<bool> {
        let snapshot: Vec<Entry<A>> = match self.registry.lock().events.get(name) {
            Some(entries) => entries.clone(),
            None => return Ok(false),
        };

        for entry in &snapshot {
            let live = {
                let mut registry = self.registry.lock();
                if entry.once {
                    registry.take(name, entry.id).is_some()
                } else {
                    registry.contains(name, entry.id)
                }
            };
            if !live {
                continue;
            }

            entry
                .listener
                .call(args)
                .map_err(|source| MouseError::ListenerInvocation {
                    event: name.to_string(),
                    source,
                })?;
        }

        Ok(!snapshot.is_empty())
    }

    /// Number of listeners currently registered for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.registry.lock().events.get(name).map_or(0, Vec::len)
    }

    /// Listeners currently registered for `name`, in registration order.
    pub fn listeners(&self, name: &str) -> Vec<Listener<A>> {
        self.registry
            .lock()
            .events
            .get(name)
            .map(|entries| entries.iter().map(|e| e.listener.clone()).collect())
            .unwrap_or_default()
    }

    /// Names that currently have at least one listener.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.lock().events.keys().cloned().collect();
        names.sort();
        names
    }
}

impl<A: 'static> fmt::Debug for EventEmitter<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock();
        let mut map = f.debug_map();
        for (name, entries) in &registry.events {
            map.entry(name, &entries.len());
        }
        map.finish()
    }
}

/// Publish/subscribe surface for any type that owns an [`EventEmitter`].
///
/// Implementors only provide [`Observable::events`]; every other method is
/// supplied here and returns `&Self` where chaining makes sense.
pub trait Observable<A: 'static> {
    /// The emitter backing this object.
    fn events(&self) -> &EventEmitter<A>;

    fn on(&self, name: &str, listener: Listener<A>) -> &Self {
        self.events().on(name, listener);
        self
    }

    fn once(&self, name: &str, listener: Listener<A>) -> &Self {
        self.events().once(name, listener);
        self
    }

    fn off(&self, name: &str, listener: &Listener<A>) -> &Self {
        self.events().off(name, listener);
        self
    }

    fn remove_listener(&self, name: &str, listener: &Listener<A>) -> &Self {
        self.events().remove_listener(name, listener);
        self
    }

    fn remove_all_listeners(&self, name: Option<&str>) -> &Self {
        self.events().remove_all_listeners(name);
        self
    }

    fn emit(&self, name: &str, args: &A) -> MouseResult<bool> {
        self.events().emit(name, args)
    }

    fn listener_count(&self, name: &str) -> usize {
        self.events().listener_count(name)
    }

    fn listeners(&self, name: &str) -> Vec<Listener<A>> {
        self.events().listeners(name)
    }
}
