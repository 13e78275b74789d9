//! Convenience macros for the bootloader core
#![macro_use]

/// Emits a log record at the given `defmt` level.
///
/// On target this expands into the matching `defmt` macro. Host builds
/// have no global logger, so the record is only type checked there.
///
/// # Example
/// ```ignore
/// log!(info, "Baud rate detected: {:?}", baud.0);
/// // On target, expands into:
/// defmt::info!("Baud rate detected: {:?}", baud.0);
/// ```
#[macro_export]
macro_rules! log {
    ($level:ident, $($arg:tt)+) => {{
        #[cfg(target_arch = "arm")]
        defmt::$level!($($arg)+);
        #[cfg(not(target_arch = "arm"))]
        let _ = core::format_args!($($arg)+);
    }};
}
