//! Driver handle binding a register bus to its flash context

use crate::bus::RegisterBus;
use crate::error::Result;
use maybe_async::maybe_async;

use super::context::{DriverConfig, FlashContext};
use super::id::FlashId;
use super::operations;

/// Flash driver for one WiFi module
///
/// Owns the bus handle and the per-module state (configuration and the
/// cached flash size). Not meant to be shared between execution contexts
/// without external locking, since every command is staged over several
/// register writes.
pub struct WincFlash<B: RegisterBus> {
    bus: B,
    ctx: FlashContext,
}

impl<B: RegisterBus> WincFlash<B> {
    /// Create a driver with the default configuration
    pub fn new(bus: B) -> Self {
        Self::with_config(bus, DriverConfig::default())
    }

    /// Create a driver with a custom configuration
    pub fn with_config(bus: B, config: DriverConfig) -> Self {
        Self {
            bus,
            ctx: FlashContext::new(config),
        }
    }

    /// Driver configuration
    pub fn config(&self) -> &DriverConfig {
        &self.ctx.config
    }

    /// Borrow the underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the bus
    pub fn into_inner(self) -> B {
        self.bus
    }

    /// Power the flash up (`true`) or down (`false`)
    #[maybe_async]
    pub async fn enable(&mut self, on: bool) -> Result<()> {
        operations::enable(&mut self.bus, &self.ctx, on).await
    }

    /// Read `buf.len()` bytes starting at `addr`
    #[maybe_async]
    pub async fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        operations::read(&mut self.bus, &self.ctx, addr, buf).await
    }

    /// Program `data` at `addr`; the region must be erased
    #[maybe_async]
    pub async fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        operations::write(&mut self.bus, &self.ctx, addr, data).await
    }

    /// Erase the sectors touched by 4KB strides over `[addr, addr + len)`
    #[maybe_async]
    pub async fn erase(&mut self, addr: u32, len: u32) -> Result<()> {
        operations::erase(&mut self.bus, &self.ctx, addr, len).await
    }

    /// Flash size in Mbit, 0 if undetectable
    #[maybe_async]
    pub async fn size(&mut self) -> u32 {
        operations::size(&mut self.bus, &mut self.ctx).await
    }

    /// Flash size in bytes, 0 if undetectable
    #[maybe_async]
    pub async fn size_bytes(&mut self) -> u32 {
        self.size().await.checked_mul(1024 * 1024 / 8).unwrap_or(0)
    }

    /// Read the JEDEC ID
    #[maybe_async]
    pub async fn read_id(&mut self) -> Result<FlashId> {
        operations::read_id(&mut self.bus).await
    }

    /// Read the security register
    #[maybe_async]
    pub async fn read_security_register(&mut self) -> Result<u8> {
        operations::read_security_register(&mut self.bus, &self.ctx).await
    }

    /// Clear security flags and unlock all blocks
    #[maybe_async]
    pub async fn unlock(&mut self) -> Result<()> {
        operations::unlock(&mut self.bus, &self.ctx).await
    }
}
