//! Central error types for the mouse handle.
//!
//! All errors implement `Serialize` so they can be forwarded to a frontend
//! or written into JSON diagnostics as plain messages.

use serde::Serialize;
use thiserror::Error;

/// Error type returned by a listener callback.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for mouse handle operations.
#[derive(Error, Debug)]
pub enum MouseError {
    /// The device provider could not supply a raw device
    #[error("Mouse provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A listener failed while an event was being emitted
    #[error("Listener for '{event}' failed: {source}")]
    ListenerInvocation {
        event: String,
        #[source]
        source: ListenerError,
    },

    /// Configuration file could not be read or written
    #[error("Config error: {0}")]
    ConfigError(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Serialize for MouseError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Extension trait for adding context to device setup failures.
///
/// Every failure to bring a device up is reported as
/// [`MouseError::ProviderUnavailable`], so the context ends up in its message.
///
/// # Example
/// ```ignore
/// use crate::error::{MouseResult, ResultExt};
///
/// fn start() -> MouseResult<()> {
///     std::thread::Builder::new()
///         .spawn(|| {})
///         .context("failed to start poller")?;
///     Ok(())
/// }
/// ```
pub trait ResultExt<T> {
    /// Add context to an error, converting it to `ProviderUnavailable`.
    fn context(self, msg: &str) -> MouseResult<T>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F: FnOnce() -> String>(self, f: F) -> MouseResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context(self, msg: &str) -> MouseResult<T> {
        self.map_err(|e| MouseError::ProviderUnavailable(format!("{}: {}", msg, e)))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> MouseResult<T> {
        self.map_err(|e| MouseError::ProviderUnavailable(format!("{}: {}", f(), e)))
    }
}

/// Extension trait for adding context to Option types.
pub trait OptionExt<T> {
    /// Convert None to `ProviderUnavailable` with the given message.
    fn context(self, msg: &str) -> MouseResult<T>;

    /// Convert None to `ProviderUnavailable` with a lazily evaluated message.
    fn with_context<F: FnOnce() -> String>(self, f: F) -> MouseResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context(self, msg: &str) -> MouseResult<T> {
        self.ok_or_else(|| MouseError::ProviderUnavailable(msg.to_string()))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> MouseResult<T> {
        self.ok_or_else(|| MouseError::ProviderUnavailable(f()))
    }
}

/// Type alias for Results using MouseError.
pub type MouseResult<T> = Result<T, MouseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MouseError::ProviderUnavailable("no display".to_string());
        assert_eq!(err.to_string(), "Mouse provider unavailable: no display");
    }

    #[test]
    fn test_listener_error_display_and_source() {
        use std::error::Error as _;

        let err = MouseError::ListenerInvocation {
            event: "click".to_string(),
            source: "boom".into(),
        };
        assert_eq!(err.to_string(), "Listener for 'click' failed: boom");
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));
    }

    #[test]
    fn test_error_serialization() {
        let err = MouseError::ProviderUnavailable("hook install failed".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Mouse provider unavailable: hook install failed\"");
    }

    #[test]
    fn test_result_context() {
        let result: Result<(), &str> = Err("channel closed");
        let err = result.context("poller exited").unwrap_err();
        assert!(matches!(err, MouseError::ProviderUnavailable(_)));
        assert_eq!(
            err.to_string(),
            "Mouse provider unavailable: poller exited: channel closed"
        );

        let ok: Result<u32, &str> = Ok(7);
        assert_eq!(ok.with_context(|| unreachable!()).unwrap(), 7);
    }

    #[test]
    fn test_option_context() {
        let err = None::<u32>.context("no pointer").unwrap_err();
        assert_eq!(err.to_string(), "Mouse provider unavailable: no pointer");

        let err = None::<u32>
            .with_context(|| format!("slot {}", 3))
            .unwrap_err();
        assert_eq!(err.to_string(), "Mouse provider unavailable: slot 3");
        assert_eq!(Some(1).context("unused").unwrap(), 1);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MouseError = io_err.into();
        assert!(matches!(err, MouseError::ConfigError(_)));
    }
}
