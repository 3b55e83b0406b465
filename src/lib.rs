//! Process-wide mouse handle with event-emitter subscriptions.
//!
//! ```no_run
//! use shared_mouse::{mouse, Listener, MouseEvent, Observable};
//!
//! let handle = mouse().expect("pointer input available");
//! handle.on(
//!     "click",
//!     Listener::from_fn(|e: &MouseEvent| println!("click at {},{}", e.screen_x, e.screen_y)),
//! );
//! ```
//!
//! - `mouse`: the singleton handle and its accessors
//! - `emitter`: named-event listener registry (`on`, `once`, `off`, `emit`, ...)
//! - `device`: raw device seam, event translation and platform providers
//! - `config`: pipeline settings
//! - `error`: error types

pub mod config;
pub mod device;
pub mod emitter;
pub mod error;
pub mod logging;
pub mod mouse;

pub use device::{
    default_provider, Button, ButtonMask, DeviceProvider, FallbackProvider, MouseDelegate,
    MouseEvent, MouseEventKind, RawDevice, UnsupportedDevice, Which,
};
pub use emitter::{EventEmitter, Listener, Observable};
pub use error::{ListenerError, MouseError, MouseResult};
pub use logging::init_logging;
pub use mouse::{install, mouse, try_mouse, Mouse};
