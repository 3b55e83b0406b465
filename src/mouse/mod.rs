//! The process-wide mouse handle.
//!
//! [`Mouse`] composes the raw device with an [`EventEmitter`]. Device methods
//! pass straight through; the publish/subscribe surface comes from
//! [`Observable`]. The device reports translated events through the
//! [`MouseDelegate`] seam and the handle re-emits them by name:
//! `click`, `dblclick`, `down`, `move`, `up`.
//!
//! Only one handle is ever published. [`install`] builds it from a provider
//! the first time it is called; every later call, and every call to
//! [`mouse`], returns the same `Arc`. A failed first call is remembered and
//! repeated instead of asking another provider.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::device::{self, DeviceProvider, MouseDelegate, MouseEvent, RawDevice};
use crate::emitter::{EventEmitter, Observable};
use crate::error::{MouseError, MouseResult};


/// Pointing device handle with listener support.
pub struct Mouse {
    device: Box<dyn RawDevice>,
    events: EventEmitter<MouseEvent>,
}

impl Mouse {
    /// Compose `device` with a fresh, empty listener registry and route its events here.
    pub fn with_device(device: Box<dyn RawDevice>) -> Arc<Self> {
        let mouse = Arc::new(Self {
            device,
            events: EventEmitter::new(),
        });

        let delegate: Arc<dyn MouseDelegate> = mouse.clone();
        mouse.device.set_delegate(Some(Arc::downgrade(&delegate)));
        mouse
    }

    pub fn is_supported(&self) -> bool {
        self.device.is_supported()
    }

    pub fn has_full_move_resolution(&self) -> bool {
        self.device.has_full_move_resolution()
    }

    /// Report every move instead of collapsing bursts into one event.
    pub fn set_full_move_resolution(&self, value: bool) {
        self.device.set_full_move_resolution(value);
    }

    /// Latest pointer state known to the device.
    pub fn last_event(&self) -> MouseEvent {
        self.device.last_event()
    }

    /// The wrapped raw device.
    pub fn device(&self) -> &dyn RawDevice {
        self.device.as_ref()
    }
}

impl Observable<MouseEvent> for Mouse {
    fn events(&self) -> &EventEmitter<MouseEvent> {
        &self.events
    }
}

impl MouseDelegate for Mouse {
    fn emit_mouse_event(&self, event: MouseEvent) {
        for kind in event.kinds.iter() {
            // The device thread has no caller to hand a listener error to.
            if let Err(e) = self.events.emit(kind.as_str(), &event) {
                log::error!("[MOUSE] {}", e);
            }
        }
    }
}

impl Drop for Mouse {
    fn drop(&mut self) {
        self.device.set_delegate(None);
    }
}

impl fmt::Debug for Mouse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mouse")
            .field("supported", &self.is_supported())
            .field("full_move_resolution", &self.has_full_move_resolution())
            .field("listeners", &self.events)
            .finish()
    }
}

/// Write-once slot for a published handle.
///
/// The provider is consulted at most once per cell. If it fails, the failure
/// is kept and every later `install` returns it without calling the provider
/// it was given.
pub(crate) struct HandleCell {
    handle: OnceLock<Arc<Mouse>>,
    failure: OnceLock<String>,
    init: Mutex<()>,
}

impl HandleCell {
    pub(crate) const fn new() -> Self {
        Self {
            handle: OnceLock::new(),
            failure: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    pub(crate) fn get(&self) -> Option<Arc<Mouse>> {
        self.handle.get().cloned()
    }

    fn settled(&self) -> Option<MouseResult<Arc<Mouse>>> {
        if let Some(mouse) = self.handle.get() {
            return Some(Ok(Arc::clone(mouse)));
        }
        self.failure
            .get()
            .map(|reason| Err(MouseError::ProviderUnavailable(reason.clone())))
    }

    pub(crate) fn install<P: DeviceProvider>(&self, provider: P) -> MouseResult<Arc<Mouse>> {
        if let Some(settled) = self.settled() {
            return settled;
        }

        let _guard = self.init.lock();
        if let Some(settled) = self.settled() {
            return settled;
        }

        let device = match provider.acquire_device() {
            Ok(device) => device,
            Err(e) => {
                let reason = match e {
                    MouseError::ProviderUnavailable(reason) => reason,
                    other => other.to_string(),
                };
                log::error!("[MOUSE] Failed to acquire pointing device: {}", reason);
                let _ = self.failure.set(reason.clone());
                return Err(MouseError::ProviderUnavailable(reason));
            }
        };
        let mouse = Mouse::with_device(device);
        let published = Arc::clone(self.handle.get_or_init(|| mouse));

        log::info!(
            "[MOUSE] Handle installed (supported: {})",
            published.is_supported()
        );
        Ok(published)
    }
}

static MOUSE: HandleCell = HandleCell::new();

/// Publish the process-wide handle, building it from `provider` on first use.
///
/// Once a handle exists the provider is dropped unused and the existing
/// handle is returned. A provider failure publishes nothing; it is returned
/// as `ProviderUnavailable` now and on every later call.
pub fn install<P: DeviceProvider>(provider: P) -> MouseResult<Arc<Mouse>> {
    MOUSE.install(provider)
}

/// The process-wide handle, installed with the platform's default provider if needed.
pub fn mouse() -> MouseResult<Arc<Mouse>> {
    match MOUSE.get() {
        Some(mouse) => Ok(mouse),
        None => install(device::default_provider()),
    }
}

/// The process-wide handle if it has been installed.
pub fn try_mouse() -> Option<Arc<Mouse>> {
    MOUSE.get()
}
