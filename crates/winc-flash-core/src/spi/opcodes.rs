//! SPI NOR opcodes understood by the module's flash
//!
//! The embedded flash follows the MX25L6465E command set. Only the commands
//! the driver issues through the indirect controller are listed here.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required before any program/erase operation
pub const WREN: u8 = 0x06;
/// Write Disable - clears WEL bit in status register
pub const WRDI: u8 = 0x04;

// ============================================================================
// Status and identification
// ============================================================================

/// Read Status Register
pub const RDSR: u8 = 0x05;
/// Read JEDEC ID (manufacturer, memory type, capacity)
pub const RDID: u8 = 0x9F;

// ============================================================================
// Data transfer
// ============================================================================

/// Fast Read (one dummy byte after the address)
pub const FAST_READ: u8 = 0x0B;
/// Page Program with 3-byte address
pub const PP: u8 = 0x02;
/// Sector Erase 4KB with 3-byte address
pub const SE_20: u8 = 0x20;

/// Filler sent in the dummy phase of `FAST_READ`
pub const FAST_READ_DUMMY: u8 = 0xA5;

// ============================================================================
// Power management
// ============================================================================

/// Deep Power Down
pub const DP: u8 = 0xB9;
/// Release from Deep Power Down
pub const RDP: u8 = 0xAB;

// ============================================================================
// Security register operations (Macronix)
// ============================================================================

/// Read Security Register
pub const RDSCUR: u8 = 0x2B;
/// Clear security register fail flags
pub const CLSR: u8 = 0x30;
/// Gang Block Unlock
pub const GBULK: u8 = 0x98;

/// Security Register: write protect selection / block lock active
pub const SCUR_WPSEL: u8 = 0x80;
/// Security Register: last program failed
pub const SCUR_P_FAIL: u8 = 0x20;
/// Security Register: last erase failed
pub const SCUR_E_FAIL: u8 = 0x40;
