//! Error types for winc-flash-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Bus errors
    /// A register or block transfer on the module bus reported failure
    TransportFailure,

    // Polling errors
    /// A bounded poll ran out of attempts before the module answered
    ///
    /// The flash ID probe is always bounded. Every other poll only yields
    /// this error when `DriverConfig::poll_limit` is set.
    Timeout,

    // Argument errors
    /// Zero-length program request
    InvalidLength,
    /// Range does not fit in the 24-bit flash address space
    AddressOutOfBounds,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransportFailure => write!(f, "module bus transfer failed"),
            Self::Timeout => write!(f, "flash command did not complete in time"),
            Self::InvalidLength => write!(f, "invalid data length"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
