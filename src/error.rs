//! Error types for region updates

use thiserror::Error;

/// Errors returned by [`crate::update`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    /// A driver operation failed
    #[error("Flash operation failed: {0}")]
    Flash(#[from] winc_flash_core::Error),

    /// Read-back did not match the data written
    #[error("Verification failed at 0x{addr:06X}: expected 0x{expected:02X}, got 0x{found:02X}")]
    VerifyMismatch {
        /// Flash address of the first differing byte
        addr: u32,
        /// Byte that was written
        expected: u8,
        /// Byte read back
        found: u8,
    },
}

/// Result type for region updates
pub type Result<T> = std::result::Result<T, UpdateError>;
