//! Mouse handle configuration.
//!
//! Settings that shape how raw device input becomes mouse events. Held in a
//! single typed struct behind a `parking_lot::RwLock` so providers read a
//! consistent snapshot when they start.

pub mod mouse;

pub use mouse::{MouseConfig, MOUSE_CONFIG};
