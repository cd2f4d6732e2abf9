//! Module register bus abstraction
//!
//! This module defines the transport trait the host platform implements to
//! reach the WiFi module's registers and shared memory.

mod traits;

pub use traits::*;
