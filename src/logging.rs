//! Logging setup.
//!
//! The crate logs through the `log` facade with bracketed subsystem tags
//! (`[MOUSE]`, `[CONFIG]`). Binaries that do not install their own logger can
//! call [`init_logging`] to get `env_logger` output filtered by `RUST_LOG`.

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Install `env_logger` with [`DEFAULT_FILTER`]. Returns false if a logger was already set.
pub fn init_logging() -> bool {
    init_logging_with(DEFAULT_FILTER)
}

/// Install `env_logger`, falling back to `default_filter` when `RUST_LOG` is unset.
pub fn init_logging_with(default_filter: &str) -> bool {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let installed = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init()
        .is_ok();

    if installed {
        log::debug!("[LOG] env_logger initialized (default filter: {})", default_filter);
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        init_logging_with("debug");
        assert!(!init_logging());
    }
}
