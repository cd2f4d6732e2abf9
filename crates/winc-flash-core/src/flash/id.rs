//! JEDEC ID decoding

use core::fmt;

/// Capacity code of a 1 Mbit part; JEDEC codes are log2 of the byte size
pub const CAPACITY_CODE_BASE: u8 = 0x11;

/// Raw ID word returned by `RDID` through the DMA scratch register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlashId(pub u32);

impl FlashId {
    /// JEDEC manufacturer code
    pub fn manufacturer(&self) -> u8 {
        self.0 as u8
    }

    /// Memory type code
    pub fn memory_type(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Capacity code; the size is `1 << (code - 0x11)` Mbit
    pub fn capacity_code(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Returns false for the all-zero and all-ones words of a silent bus
    pub fn is_valid(&self) -> bool {
        self.0 != 0 && self.0 != 0xffff_ffff
    }

    /// Flash size in megabits, `None` if the ID is unusable
    pub fn size_mbit(&self) -> Option<u32> {
        if !self.is_valid() {
            return None;
        }
        let shift = self.capacity_code().checked_sub(CAPACITY_CODE_BASE)?;
        if shift >= 32 {
            return None;
        }
        Some(1u32 << shift)
    }
}

impl fmt::Display for FlashId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X} {:02X} {:02X}",
            self.manufacturer(),
            self.memory_type(),
            self.capacity_code()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fields() {
        let id = FlashId(0x0013_20C2);
        assert_eq!(id.manufacturer(), 0xC2);
        assert_eq!(id.memory_type(), 0x20);
        assert_eq!(id.capacity_code(), 0x13);
    }

    #[test]
    fn test_size_from_capacity_code() {
        assert_eq!(FlashId(0x0011_20C2).size_mbit(), Some(1));
        assert_eq!(FlashId(0x0013_20C2).size_mbit(), Some(4));
        assert_eq!(FlashId(0x0014_20C2).size_mbit(), Some(8));
    }

    #[test]
    fn test_invalid_ids() {
        assert_eq!(FlashId(0).size_mbit(), None);
        assert_eq!(FlashId(0xffff_ffff).size_mbit(), None);
        // Capacity code below the base
        assert_eq!(FlashId(0x0010_20C2).size_mbit(), None);
        // Shift would overflow a u32
        assert_eq!(FlashId(0x0031_20C2).size_mbit(), None);
        assert_eq!(FlashId(0x0030_20C2).size_mbit(), Some(1 << 31));
    }
}
