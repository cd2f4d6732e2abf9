//! Register bus trait definitions
//!
//! These traits use `maybe_async` to support both sync and async modes.
//! - By default, traits are async (suitable for Embassy, tokio)
//! - With the `is_sync` feature, traits become synchronous

use crate::error::Result;
use maybe_async::maybe_async;

/// Register-level access to the WiFi module (sync or async depending on `is_sync` feature)
///
/// The module sits behind a host SPI bus and exposes 32-bit registers plus a
/// shared memory window. Implementations wrap whatever host transport is in
/// use and report any failed transfer as `Error::TransportFailure`.
///
/// The bus is assumed to have no reentrancy: a command is staged over
/// several register writes that must not be interleaved with another
/// command on the same module.
///
/// ## Example: host SPI transport
///
/// ```ignore
/// #[maybe_async]
/// impl RegisterBus for HostSpi {
///     async fn write_register(&mut self, addr: u32, value: u32) -> Result<()> {
///         self.send_cmd(CMD_SINGLE_WRITE, addr, value)
///             .await
///             .map_err(|_| Error::TransportFailure)
///     }
///     // ...
/// }
/// ```
#[maybe_async(AFIT)]
pub trait RegisterBus {
    /// Write a 32-bit module register
    async fn write_register(&mut self, addr: u32, value: u32) -> Result<()>;

    /// Read a 32-bit module register
    async fn read_register(&mut self, addr: u32) -> Result<u32>;

    /// Copy `buf.len()` bytes of module memory starting at `addr` into `buf`
    async fn read_block(&mut self, addr: u32, buf: &mut [u8]) -> Result<()>;

    /// Copy `data` into module memory starting at `addr`
    async fn write_block(&mut self, addr: u32, data: &[u8]) -> Result<()>;

    /// Silicon revision of the module
    ///
    /// Used to decide whether the flash sits behind the power/pin-mux gate
    /// (revision `0x3A0` and later).
    async fn chip_revision(&mut self) -> Result<u32>;
}

#[maybe_async(AFIT)]
impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    async fn write_register(&mut self, addr: u32, value: u32) -> Result<()> {
        (**self).write_register(addr, value).await
    }

    async fn read_register(&mut self, addr: u32) -> Result<u32> {
        (**self).read_register(addr).await
    }

    async fn read_block(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        (**self).read_block(addr, buf).await
    }

    async fn write_block(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        (**self).write_block(addr, data).await
    }

    async fn chip_revision(&mut self) -> Result<u32> {
        (**self).chip_revision().await
    }
}

// Blanket impl for boxed buses to allow trait objects (sync mode only)
// In async mode, traits with async fn are not object-safe
#[cfg(all(feature = "alloc", feature = "is_sync"))]
impl RegisterBus for alloc::boxed::Box<dyn RegisterBus + Send> {
    fn write_register(&mut self, addr: u32, value: u32) -> Result<()> {
        (**self).write_register(addr, value)
    }

    fn read_register(&mut self, addr: u32) -> Result<u32> {
        (**self).read_register(addr)
    }

    fn read_block(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        (**self).read_block(addr, buf)
    }

    fn write_block(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        (**self).write_block(addr, data)
    }

    fn chip_revision(&mut self) -> Result<u32> {
        (**self).chip_revision()
    }
}
