//! Logging shims used throughout the crate.
//!
//! With the `defmt` feature (on bare metal targets) these forward to [`defmt`],
//! with the `log` feature they forward to [`log`]. Otherwise they compile to nothing.
//!
//! Only plain `{}` placeholders are used so the same format strings are valid for
//! both backends.
#![allow(unused_macros)]

#[cfg(all(feature = "defmt", target_os = "none"))]
macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => { ::defmt::trace!($s $(, $x)*) };
}

#[cfg(all(feature = "log", not(all(feature = "defmt", target_os = "none"))))]
macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => { ::log::trace!($s $(, $x)*) };
}

#[cfg(not(any(feature = "log", all(feature = "defmt", target_os = "none"))))]
macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        let _ = ($( & $x ),*);
    }};
}

#[cfg(all(feature = "defmt", target_os = "none"))]
macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => { ::defmt::debug!($s $(, $x)*) };
}

#[cfg(all(feature = "log", not(all(feature = "defmt", target_os = "none"))))]
macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => { ::log::debug!($s $(, $x)*) };
}

#[cfg(not(any(feature = "log", all(feature = "defmt", target_os = "none"))))]
macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        let _ = ($( & $x ),*);
    }};
}

#[cfg(all(feature = "defmt", target_os = "none"))]
macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => { ::defmt::warn!($s $(, $x)*) };
}

#[cfg(all(feature = "log", not(all(feature = "defmt", target_os = "none"))))]
macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => { ::log::warn!($s $(, $x)*) };
}

#[cfg(not(any(feature = "log", all(feature = "defmt", target_os = "none"))))]
macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        let _ = ($( & $x ),*);
    }};
}

#[cfg(all(feature = "defmt", target_os = "none"))]
macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => { ::defmt::error!($s $(, $x)*) };
}

#[cfg(all(feature = "log", not(all(feature = "defmt", target_os = "none"))))]
macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => { ::log::error!($s $(, $x)*) };
}

#[cfg(not(any(feature = "log", all(feature = "defmt", target_os = "none"))))]
macro_rules! error {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        let _ = ($( & $x ),*);
    }};
}
