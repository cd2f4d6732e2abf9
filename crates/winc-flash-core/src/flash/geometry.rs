//! Flash geometry and range decomposition
//!
//! Splits caller ranges into the units the module can handle in one
//! command: 32KB blocks for reads (the bus wrapper caps a DMA transfer
//! below 64KB), 256 byte pages for programming and 4KB strides for erase.

use crate::error::{Error, Result};

/// Program granularity; a program command never crosses a page boundary
pub const PAGE_SIZE: u32 = 256;
/// Read chunk size
pub const BLOCK_SIZE: u32 = 32 * 1024;
/// Smallest erasable unit
pub const SECTOR_SIZE: u32 = 4096;
/// Distance between two sector erase commands
pub const ERASE_STRIDE: u32 = 16 * PAGE_SIZE;
/// Offset legacy firmware tools added to every sector erase address
pub const LEGACY_ERASE_NUDGE: u32 = 10;
/// Reach of a 3-byte SPI NOR address
pub const ADDRESS_SPACE: u64 = 1 << 24;

/// One piece of a decomposed range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Flash address of the first byte
    pub addr: u32,
    /// Offset of the first byte within the caller's buffer
    pub offset: usize,
    /// Number of bytes
    pub len: usize,
}

impl Chunk {
    /// Buffer range covered by this chunk
    pub fn range(&self) -> core::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Reject ranges that run past the 24-bit address space
pub fn check_range(addr: u32, len: usize) -> Result<()> {
    let end = addr as u64 + len as u64;
    if end > ADDRESS_SPACE {
        return Err(Error::AddressOutOfBounds);
    }
    Ok(())
}

/// Split a read into chunks of at most [`BLOCK_SIZE`] bytes
pub fn read_chunks(addr: u32, len: usize) -> ReadChunks {
    ReadChunks {
        addr,
        offset: 0,
        len,
    }
}

/// Iterator returned by [`read_chunks`]
#[derive(Debug, Clone)]
pub struct ReadChunks {
    addr: u32,
    offset: usize,
    len: usize,
}

impl Iterator for ReadChunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.offset >= self.len {
            return None;
        }

        let chunk_len = core::cmp::min(BLOCK_SIZE as usize, self.len - self.offset);
        let chunk = Chunk {
            addr: self.addr.wrapping_add(self.offset as u32),
            offset: self.offset,
            len: chunk_len,
        };
        self.offset += chunk_len;
        Some(chunk)
    }
}

/// Split a write into page program chunks
///
/// An unaligned start first fills the tail of its page; every following
/// chunk starts on a page boundary and spans at most one page.
pub fn program_chunks(addr: u32, len: usize) -> ProgramChunks {
    ProgramChunks {
        addr,
        offset: 0,
        len,
    }
}

/// Iterator returned by [`program_chunks`]
#[derive(Debug, Clone)]
pub struct ProgramChunks {
    addr: u32,
    offset: usize,
    len: usize,
}

impl Iterator for ProgramChunks {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.offset >= self.len {
            return None;
        }

        let current = self.addr.wrapping_add(self.offset as u32);
        let to_page_end = (PAGE_SIZE - current % PAGE_SIZE) as usize;
        let chunk_len = core::cmp::min(to_page_end, self.len - self.offset);

        let chunk = Chunk {
            addr: current,
            offset: self.offset,
            len: chunk_len,
        };
        self.offset += chunk_len;
        Some(chunk)
    }
}

/// Stride addresses visited by an erase of `len` bytes at `addr`
///
/// Yields `addr`, `addr + ERASE_STRIDE`, ... while below `addr + len`, so
/// a partial final stride still gets its own erase.
pub fn erase_strides(addr: u32, len: u32) -> EraseStrides {
    EraseStrides {
        next: addr as u64,
        end: addr as u64 + len as u64,
    }
}

/// Iterator returned by [`erase_strides`]
#[derive(Debug, Clone)]
pub struct EraseStrides {
    next: u64,
    end: u64,
}

impl Iterator for EraseStrides {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.next >= self.end {
            return None;
        }
        let addr = self.next as u32;
        self.next += ERASE_STRIDE as u64;
        Some(addr)
    }
}

/// Smallest sector-aligned span covering `[addr, addr + len)`
///
/// Returns `(start, len)`; an empty range yields a zero length.
pub fn sector_span(addr: u32, len: u32) -> (u32, u32) {
    if len == 0 {
        return (addr & !(SECTOR_SIZE - 1), 0);
    }
    let start = addr as u64 & !(SECTOR_SIZE as u64 - 1);
    let end = (addr as u64 + len as u64).div_ceil(SECTOR_SIZE as u64) * SECTOR_SIZE as u64;
    (start as u32, (end - start) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program_plan(addr: u32, len: usize) -> heapless::Vec<(u32, usize), 64> {
        program_chunks(addr, len).map(|c| (c.addr, c.len)).collect()
    }

    #[test]
    fn test_unaligned_write_fills_page_tail_first() {
        assert_eq!(program_plan(250, 20).as_slice(), &[(250, 6), (256, 14)]);
    }

    #[test]
    fn test_unaligned_write_inside_one_page() {
        assert_eq!(program_plan(10, 5).as_slice(), &[(10, 5)]);
        // Exactly reaching the page end stays a single program
        assert_eq!(program_plan(200, 56).as_slice(), &[(200, 56)]);
    }

    #[test]
    fn test_aligned_write_uses_whole_pages() {
        assert_eq!(
            program_plan(0x1000, 768).as_slice(),
            &[(0x1000, 256), (0x1100, 256), (0x1200, 256)]
        );
        assert_eq!(
            program_plan(0x1000, 600).as_slice(),
            &[(0x1000, 256), (0x1100, 256), (0x1200, 88)]
        );
    }

    #[test]
    fn test_program_chunks_never_cross_a_page() {
        for addr in [0u32, 1, 17, 255, 256, 300, 511, 4095] {
            for len in [1usize, 2, 100, 255, 256, 257, 513, 1000, 4096] {
                let mut expected_offset = 0;
                for chunk in program_chunks(addr, len) {
                    assert_eq!(chunk.offset, expected_offset);
                    assert!(chunk.len > 0);
                    let first_page = chunk.addr / PAGE_SIZE;
                    let last_page = (chunk.addr + chunk.len as u32 - 1) / PAGE_SIZE;
                    assert_eq!(first_page, last_page, "addr={addr} len={len}");
                    expected_offset += chunk.len;
                }
                assert_eq!(expected_offset, len);
            }
        }
    }

    #[test]
    fn test_program_chunks_empty() {
        assert_eq!(program_chunks(123, 0).count(), 0);
    }

    #[test]
    fn test_read_chunk_count_and_coverage() {
        for len in [1usize, 100, 32768, 32769, 65536, 100_000, 200_000] {
            let chunks: heapless::Vec<Chunk, 16> = read_chunks(0x2000, len).collect();
            assert_eq!(chunks.len(), len.div_ceil(BLOCK_SIZE as usize));

            let mut expected_offset = 0;
            for chunk in &chunks {
                assert!(chunk.len <= BLOCK_SIZE as usize);
                assert_eq!(chunk.offset, expected_offset);
                assert_eq!(chunk.addr, 0x2000 + chunk.offset as u32);
                expected_offset += chunk.len;
            }
            assert_eq!(expected_offset, len);
        }
    }

    #[test]
    fn test_erase_stride_count() {
        for len in [1u32, 10, 4095, 4096, 4097, 8192, 10_000, 65536] {
            assert_eq!(
                erase_strides(0x3000, len).count() as u32,
                len.div_ceil(ERASE_STRIDE)
            );
        }
        assert_eq!(erase_strides(0x3000, 0).count(), 0);
    }

    #[test]
    fn test_erase_strides_step_from_start() {
        let addrs: heapless::Vec<u32, 4> = erase_strides(0x100, 9000).collect();
        assert_eq!(addrs.as_slice(), &[0x100, 0x1100, 0x2100]);
    }

    #[test]
    fn test_check_range() {
        assert!(check_range(0, 16 * 1024 * 1024).is_ok());
        assert!(check_range(0xFF_FFFF, 1).is_ok());
        assert_eq!(check_range(0xFF_FFFF, 2), Err(Error::AddressOutOfBounds));
        assert_eq!(check_range(u32::MAX, 1), Err(Error::AddressOutOfBounds));
    }

    #[test]
    fn test_sector_span() {
        assert_eq!(sector_span(0, 4096), (0, 4096));
        assert_eq!(sector_span(100, 4096), (0, 8192));
        assert_eq!(sector_span(4095, 2), (0, 8192));
        assert_eq!(sector_span(0x5000, 1), (0x5000, 4096));
        assert_eq!(sector_span(0x5010, 0), (0x5000, 0));
    }
}
