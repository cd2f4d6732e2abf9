//! Flash status register

use bitflags::bitflags;

bitflags! {
    /// Status register bits as returned by `RDSR`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusRegister: u8 {
        /// Write In Progress / Busy
        const WIP  = 1 << 0;
        /// Write Enable Latch
        const WEL  = 1 << 1;
        /// Block Protect bit 0
        const BP0  = 1 << 2;
        /// Block Protect bit 1
        const BP1  = 1 << 3;
        /// Block Protect bit 2
        const BP2  = 1 << 4;
        /// Block Protect bit 3
        const BP3  = 1 << 5;
        /// Quad Enable
        const QE   = 1 << 6;
        /// Status Register Write Disable
        const SRWD = 1 << 7;
    }
}

impl StatusRegister {
    /// Returns true while a program or erase cycle is running
    pub fn is_busy(&self) -> bool {
        self.contains(Self::WIP)
    }
}

impl From<u8> for StatusRegister {
    fn from(value: u8) -> Self {
        Self::from_bits_retain(value)
    }
}
