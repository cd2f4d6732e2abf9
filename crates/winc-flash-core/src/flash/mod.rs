//! Flash operations
//!
//! This module provides the public read, write, erase and power operations
//! on the module's SPI flash, plus the range decomposition they rely on.

mod context;
mod driver;
pub mod geometry;
mod id;
mod operations;

pub use context::{DriverConfig, FlashContext};
pub use driver::WincFlash;
pub use id::{FlashId, CAPACITY_CODE_BASE};
pub use operations::*;
