//! Thread-safe driver handle
//!
//! The module bus has no reentrancy: every flash command is staged over
//! several register writes and completion polls that must not interleave
//! with another command. [`SharedFlash`] holds the driver behind a mutex
//! for the whole duration of each operation.

use std::sync::{Mutex, MutexGuard};

use winc_flash_core::{DriverConfig, Error, FlashId, RegisterBus, Result, WincFlash};

/// Driver handle that can be shared between threads
pub struct SharedFlash<B: RegisterBus> {
    inner: Mutex<WincFlash<B>>,
}

impl<B: RegisterBus> SharedFlash<B> {
    /// Wrap an existing driver
    pub fn new(flash: WincFlash<B>) -> Self {
        Self {
            inner: Mutex::new(flash),
        }
    }

    /// Create a shared driver on `bus` with the given configuration
    pub fn with_config(bus: B, config: DriverConfig) -> Self {
        Self::new(WincFlash::with_config(bus, config))
    }

    fn lock(&self) -> Result<MutexGuard<'_, WincFlash<B>>> {
        self.inner.lock().map_err(|_| {
            log::warn!("Flash handle poisoned by a panicking holder");
            Error::TransportFailure
        })
    }

    /// Run `f` with exclusive access to the driver
    ///
    /// Use this to keep a sequence of operations (e.g. a region update)
    /// from interleaving with other users.
    pub fn with<R>(&self, f: impl FnOnce(&mut WincFlash<B>) -> R) -> Result<R> {
        let mut flash = self.lock()?;
        Ok(f(&mut flash))
    }

    /// Power the flash up or down
    pub fn enable(&self, on: bool) -> Result<()> {
        self.lock()?.enable(on)
    }

    /// Read `buf.len()` bytes starting at `addr`
    pub fn read(&self, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.lock()?.read(addr, buf)
    }

    /// Program `data` at `addr`
    pub fn write(&self, addr: u32, data: &[u8]) -> Result<()> {
        self.lock()?.write(addr, data)
    }

    /// Erase `len` bytes starting at `addr`
    pub fn erase(&self, addr: u32, len: u32) -> Result<()> {
        self.lock()?.erase(addr, len)
    }

    /// Flash size in Mbit, 0 if undetectable or the handle is poisoned
    pub fn size(&self) -> u32 {
        self.lock().map(|mut flash| flash.size()).unwrap_or(0)
    }

    /// Flash size in bytes, 0 if undetectable or the handle is poisoned
    pub fn size_bytes(&self) -> u32 {
        self.lock().map(|mut flash| flash.size_bytes()).unwrap_or(0)
    }

    /// Read the JEDEC ID
    pub fn read_id(&self) -> Result<FlashId> {
        self.lock()?.read_id()
    }

    /// Read the security register
    pub fn read_security_register(&self) -> Result<u8> {
        self.lock()?.read_security_register()
    }

    /// Clear security flags and unlock all blocks
    pub fn unlock(&self) -> Result<()> {
        self.lock()?.unlock()
    }

    /// Take the driver back out
    pub fn into_inner(self) -> Result<WincFlash<B>> {
        self.inner.into_inner().map_err(|_| Error::TransportFailure)
    }
}

impl<B: RegisterBus> From<WincFlash<B>> for SharedFlash<B> {
    fn from(flash: WincFlash<B>) -> Self {
        Self::new(flash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use test_log::test;
    use winc_flash_dummy::DummyModule;

    fn shared() -> SharedFlash<DummyModule> {
        SharedFlash::new(WincFlash::new(DummyModule::new_default()))
    }

    #[test]
    fn test_concurrent_writers() {
        let flash = shared();

        std::thread::scope(|s| {
            for t in 0..4u32 {
                let flash = &flash;
                s.spawn(move || {
                    let data = vec![t as u8 + 1; 1000];
                    flash.write(t * 0x1000 + 0x80, &data).unwrap();
                });
            }
        });

        for t in 0..4u32 {
            let mut buf = vec![0u8; 1000];
            flash.read(t * 0x1000 + 0x80, &mut buf).unwrap();
            assert!(buf.iter().all(|&b| b == t as u8 + 1), "writer {t}");
        }

        // Each page program is one uninterrupted command sequence
        let flash = flash.into_inner().unwrap();
        let programs = flash.bus().journal().programs();
        assert_eq!(programs.iter().map(|&(_, len)| len).sum::<u32>(), 4000);
    }

    #[test]
    fn test_forwards_driver_operations() {
        let flash = shared();

        assert_eq!(flash.size(), 4);
        assert_eq!(flash.size_bytes(), 512 * 1024);
        assert_eq!(flash.read_id().unwrap().manufacturer(), 0xC2);

        flash.erase(0, 4096).unwrap();
        flash.write(0x10, &[1, 2, 3]).unwrap();
        let mut buf = [0u8; 3];
        flash.read(0x10, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);

        flash.unlock().unwrap();
        assert_eq!(flash.read_security_register().unwrap(), 0);
        flash.enable(false).unwrap();
        assert!(flash.with(|f| f.bus().is_powered_down()).unwrap());
    }

    #[test]
    fn test_poisoned_handle_reports_transport_failure() {
        let flash = Arc::new(shared());

        let holder = Arc::clone(&flash);
        let result = std::thread::spawn(move || {
            let _ = holder.with(|_| panic!("bus holder died"));
        })
        .join();
        assert!(result.is_err());

        let mut buf = [0u8; 4];
        assert_eq!(flash.read(0, &mut buf), Err(Error::TransportFailure));
        assert_eq!(flash.size(), 0);
    }
}
