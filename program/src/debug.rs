//! Internal logging helpers for local development and testing.

/// Logs through `solana-program-log`, compiled out entirely unless the `debug` feature is set.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug")]
        solana_program_log::log!($($arg)*)
    };
}
