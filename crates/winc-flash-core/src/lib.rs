//! winc-flash-core - SPI flash driver for WINC1500-class WiFi modules
//!
//! The flash inside the module is not wired to the host directly. Every
//! SPI NOR command is staged in the module's flash controller registers,
//! triggered, and polled for completion over the module's own register
//! bus; data moves through the module's shared memory by DMA.
//!
//! This crate is `no_std` and works in sync or async mode through
//! `maybe-async`.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable boxed register buses
//! - `is_sync` - Compile every bus operation as a blocking call
//! - `serde` - Serialize `DriverConfig` and `FlashId`
//!
//! # Example
//!
//! ```ignore
//! use winc_flash_core::{RegisterBus, WincFlash};
//!
//! fn dump_header<B: RegisterBus>(bus: B) -> winc_flash_core::Result<[u8; 64]> {
//!     let mut flash = WincFlash::new(bus);
//!     flash.enable(true)?;
//!     log::info!("Flash size: {} Mbit", flash.size());
//!
//!     let mut header = [0u8; 64];
//!     flash.read(0, &mut header)?;
//!     flash.enable(false)?;
//!     Ok(header)
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
pub mod error;
pub mod flash;
pub mod protocol;
pub mod regs;
pub mod spi;

pub use bus::RegisterBus;
pub use error::{Error, Result};
pub use flash::{DriverConfig, FlashId, WincFlash};
