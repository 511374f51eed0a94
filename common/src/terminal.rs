pub mod ansi;
pub mod logging;

/// Informational status line, `[*]`.
#[macro_export]
macro_rules! print_info {
    ($($arg:tt)+) => {
        $crate::tracing::info!($($arg)+)
    };
}

/// Something was found, `[+]`.
#[macro_export]
macro_rules! print_positive {
    ($($arg:tt)+) => {
        $crate::tracing::info!(target: $crate::terminal::logging::POSITIVE_TARGET, $($arg)+)
    };
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)+) => {
        $crate::tracing::warn!($($arg)+)
    };
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)+) => {
        $crate::tracing::error!($($arg)+)
    };
}

#[macro_export]
macro_rules! print_debug {
    ($($arg:tt)+) => {
        $crate::tracing::debug!($($arg)+)
    };
}

/// A bare line without any marker.
#[macro_export]
macro_rules! print_raw {
    ($($arg:tt)+) => {
        $crate::tracing::info!(target: $crate::terminal::logging::RAW_TARGET, $($arg)+)
    };
}
