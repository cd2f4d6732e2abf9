//! winc-flash - Host-side access to the SPI flash of WINC1500-class modules
//!
//! This crate re-exports the blocking flavour of `winc-flash-core` and adds
//! what a host tool needs on top of the bare driver:
//!
//! - [`SharedFlash`]: a driver handle that can be shared between threads,
//!   keeping every multi-register command sequence atomic on the bus
//! - [`update`]: erase, program and verify a region in one call
//!
//! # Example
//!
//! ```ignore
//! use winc_flash::{update, WincFlash};
//!
//! let mut flash = WincFlash::new(bus);
//! flash.enable(true)?;
//! update::update_region(&mut flash, 0x4000, &firmware, &mut update::NoProgress)?;
//! flash.enable(false)?;
//! ```

pub mod error;
pub mod shared;
pub mod update;

pub use winc_flash_core::{bus, flash, protocol, regs, spi};
pub use winc_flash_core::{DriverConfig, Error, FlashId, RegisterBus, Result, WincFlash};

pub use error::UpdateError;
pub use shared::SharedFlash;
pub use update::{update_region, verify_region, NoProgress, UpdateProgress};
