//! Pointing-device layer.
//!
//! A [`DeviceProvider`] hands out the single [`RawDevice`] of the process.
//! Raw devices own the platform plumbing and report translated events to a
//! [`MouseDelegate`]; they know nothing about listeners.
//!
//! - `event`: event payload types
//! - `translator`: raw messages to events (clicks, double clicks, movement)
//! - `pump`: channel + dispatch thread shared by the providers
//! - `poll`: cross-platform polling provider (`device_query`)
//! - `win`: low-level mouse hook provider (Windows)

pub mod event;
pub mod poll;
pub mod pump;
pub mod translator;
#[cfg(target_os = "windows")]
pub mod win;

use std::sync::Weak;

use crate::error::MouseResult;

pub use event::{Button, ButtonMask, EventKinds, MouseEvent, MouseEventKind, Which};
pub use poll::PollingProvider;
pub use pump::{DeviceCore, PumpedDevice};
pub use translator::{EventTranslator, MessageKind, RawMessage};
#[cfg(target_os = "windows")]
pub use win::HookProvider;

/// Receiver of translated device events.
pub trait MouseDelegate: Send + Sync {
    fn emit_mouse_event(&self, event: MouseEvent);
}

/// Device-state surface of the raw pointing device.
pub trait RawDevice: Send + Sync {
    /// False when the platform offers no pointer input; such a device never reports events.
    fn is_supported(&self) -> bool;

    fn has_full_move_resolution(&self) -> bool;

    fn set_full_move_resolution(&self, value: bool);

    /// Latest translated state of the pointer.
    fn last_event(&self) -> MouseEvent;

    /// Route events to `delegate`, or stop routing with `None`.
    fn set_delegate(&self, delegate: Option<Weak<dyn MouseDelegate>>);
}

/// Source of the process's raw device. Consumed on acquisition.
pub trait DeviceProvider {
    fn acquire_device(self) -> MouseResult<Box<dyn RawDevice>>;
}

impl<F> DeviceProvider for F
where
    F: FnOnce() -> MouseResult<Box<dyn RawDevice>>,
{
    fn acquire_device(self) -> MouseResult<Box<dyn RawDevice>> {
        self()
    }
}

/// Raw device for hosts without pointer input.
#[derive(Debug, Default)]
pub struct UnsupportedDevice;

impl RawDevice for UnsupportedDevice {
    fn is_supported(&self) -> bool {
        false
    }

    fn has_full_move_resolution(&self) -> bool {
        false
    }

    fn set_full_move_resolution(&self, _value: bool) {}

    fn last_event(&self) -> MouseEvent {
        MouseEvent::default()
    }

    fn set_delegate(&self, _delegate: Option<Weak<dyn MouseDelegate>>) {}
}

/// Wraps a provider so that a failed acquisition yields an [`UnsupportedDevice`].
pub struct FallbackProvider<P>(pub P);

impl<P: DeviceProvider> DeviceProvider for FallbackProvider<P> {
    fn acquire_device(self) -> MouseResult<Box<dyn RawDevice>> {
        match self.0.acquire_device() {
            Ok(device) => Ok(device),
            Err(e) => {
                log::warn!("[MOUSE] Pointer input unavailable, continuing unsupported: {}", e);
                Ok(Box::new(UnsupportedDevice))
            }
        }
    }
}

/// Provider used when the caller does not pick one.
#[cfg(target_os = "windows")]
pub fn default_provider() -> HookProvider {
    HookProvider::default()
}

/// Provider used when the caller does not pick one.
#[cfg(not(target_os = "windows"))]
pub fn default_provider() -> PollingProvider {
    PollingProvider::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MouseError;

    #[test]
    fn test_unsupported_device_is_inert() {
        let device = UnsupportedDevice;
        device.set_full_move_resolution(true);
        assert!(!device.is_supported());
        assert!(!device.has_full_move_resolution());
        assert_eq!(device.last_event(), MouseEvent::default());
    }

    #[test]
    fn test_closure_provider() {
        let provider = || -> MouseResult<Box<dyn RawDevice>> { Ok(Box::new(UnsupportedDevice)) };
        let device = provider.acquire_device().unwrap();
        assert!(!device.is_supported());
    }

    #[test]
    fn test_fallback_provider_swallows_failure() {
        let failing = || -> MouseResult<Box<dyn RawDevice>> {
            Err(MouseError::ProviderUnavailable("no display".to_string()))
        };
        let device = FallbackProvider(failing).acquire_device().unwrap();
        assert!(!device.is_supported());
    }
}
