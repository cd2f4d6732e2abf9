//! Region update: erase, program, verify
//!
//! Erase works on whole 4KB sectors. Bytes that share a sector with the
//! target region but lie outside it are erased too and NOT restored; read
//! and rewrite them yourself if they matter.

use winc_flash_core::flash::geometry::{check_range, sector_span};
use winc_flash_core::{Error, RegisterBus, WincFlash};

use crate::error::{Result, UpdateError};

/// Bytes programmed or compared between two progress reports
const CHUNK_SIZE: usize = 4096;

/// Progress callbacks for [`update_region`] and [`verify_region`]
pub trait UpdateProgress {
    /// Called before erasing `len` bytes at `start`
    fn erasing(&mut self, start: u32, len: u32);

    /// Called when starting write operations
    fn writing(&mut self, bytes_to_write: usize);

    /// Called to update write progress
    fn write_progress(&mut self, bytes_written: usize);

    /// Called when starting to read back for comparison
    fn verifying(&mut self, bytes_to_verify: usize);

    /// Called to update verify progress
    fn verify_progress(&mut self, bytes_verified: usize);

    /// Called when the update is complete
    fn complete(&mut self);
}

/// A no-op progress reporter
pub struct NoProgress;

impl UpdateProgress for NoProgress {
    fn erasing(&mut self, _start: u32, _len: u32) {}
    fn writing(&mut self, _bytes_to_write: usize) {}
    fn write_progress(&mut self, _bytes_written: usize) {}
    fn verifying(&mut self, _bytes_to_verify: usize) {}
    fn verify_progress(&mut self, _bytes_verified: usize) {}
    fn complete(&mut self) {}
}

/// Replace the flash contents at `offset` with `data`
///
/// Erases every sector overlapping `[offset, offset + data.len())`,
/// programs `data` and reads it back. Fails on the first driver error or
/// on the first byte that reads back differently.
pub fn update_region<B: RegisterBus, P: UpdateProgress>(
    flash: &mut WincFlash<B>,
    offset: u32,
    data: &[u8],
    progress: &mut P,
) -> Result<()> {
    if data.is_empty() {
        return Err(Error::InvalidLength.into());
    }
    check_range(offset, data.len())?;

    let (start, len) = sector_span(offset, data.len() as u32);
    log::info!(
        "Updating {} bytes at 0x{:06X} (erasing 0x{:06X}..0x{:06X})",
        data.len(),
        offset,
        start,
        start + len
    );

    progress.erasing(start, len);
    flash.erase(start, len)?;

    progress.writing(data.len());
    let mut written = 0usize;
    for chunk in data.chunks(CHUNK_SIZE) {
        flash.write(offset + written as u32, chunk)?;
        written += chunk.len();
        progress.write_progress(written);
    }

    verify_region(flash, offset, data, progress)?;

    progress.complete();
    Ok(())
}

/// Compare the flash contents at `offset` against `expected`
pub fn verify_region<B: RegisterBus, P: UpdateProgress>(
    flash: &mut WincFlash<B>,
    offset: u32,
    expected: &[u8],
    progress: &mut P,
) -> Result<()> {
    progress.verifying(expected.len());

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut verified = 0usize;

    for want in expected.chunks(CHUNK_SIZE) {
        let addr = offset + verified as u32;
        let have = &mut buf[..want.len()];
        flash.read(addr, have)?;

        if let Some(i) = have.iter().zip(want).position(|(h, w)| h != w) {
            let mismatches = have.iter().zip(want).filter(|(h, w)| h != w).count();
            log::warn!(
                "{} byte(s) differ in chunk at 0x{:06X}",
                mismatches,
                addr
            );
            return Err(UpdateError::VerifyMismatch {
                addr: addr + i as u32,
                expected: want[i],
                found: have[i],
            });
        }

        verified += want.len();
        progress.verify_progress(verified);
    }

    Ok(())
}
