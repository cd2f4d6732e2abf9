//! WiFi module register definitions for indirect SPI flash access
//!
//! The module exposes its SPI flash controller as a small block of 32-bit
//! registers. A command is staged into the buffer registers and started by
//! writing the command count register with the trigger bit set; the
//! controller then raises the transaction done register.
//!
//! # Command register layout
//!
//! - `SPI_FLASH_BUF1` holds command bytes 0..=3, byte 0 in the low bits
//! - `SPI_FLASH_BUF2` holds command byte 4
//! - `SPI_FLASH_BUF_DIR` bit *n* set means byte *n* is driven by the host
//! - `SPI_FLASH_CMD_CNT` carries the command length, the trigger bit and,
//!   for page program, the number of bytes to program

// ============================================================================
// SPI flash controller block
// ============================================================================

/// Base of the SPI flash controller register block
pub const SPI_FLASH_BASE: u32 = 0x10200;
/// Controller mode register
pub const SPI_FLASH_MODE: u32 = SPI_FLASH_BASE + 0x00;
/// Command byte count, trigger bit and program length
pub const SPI_FLASH_CMD_CNT: u32 = SPI_FLASH_BASE + 0x04;
/// Number of data bytes moved by the DMA engine
pub const SPI_FLASH_DATA_CNT: u32 = SPI_FLASH_BASE + 0x08;
/// Command buffer word 1 (bytes 0..=3)
pub const SPI_FLASH_BUF1: u32 = SPI_FLASH_BASE + 0x0c;
/// Command buffer word 2 (byte 4)
pub const SPI_FLASH_BUF2: u32 = SPI_FLASH_BASE + 0x10;
/// Buffer direction mask
pub const SPI_FLASH_BUF_DIR: u32 = SPI_FLASH_BASE + 0x14;
/// Transaction done (reads 1 when the last command completed)
pub const SPI_FLASH_TR_DONE: u32 = SPI_FLASH_BASE + 0x18;
/// DMA target/source address
pub const SPI_FLASH_DMA_ADDR: u32 = SPI_FLASH_BASE + 0x1c;
/// MSB control register
pub const SPI_FLASH_MSB_CTL: u32 = SPI_FLASH_BASE + 0x20;
/// TX control register
pub const SPI_FLASH_TX_CTL: u32 = SPI_FLASH_BASE + 0x24;

// CMD_CNT bits
/// Command length field (bytes in the command buffer)
pub const CMD_CNT_LEN_MASK: u32 = 0x7f;
/// Start the staged command
pub const CMD_CNT_TRIGGER: u32 = 1 << 7;
/// Program length offset
pub const CMD_CNT_PROG_LEN_OFF: u32 = 8;
/// Program length mask (before shifting)
pub const CMD_CNT_PROG_LEN_MASK: u32 = 0xfffff;

/// Value of `SPI_FLASH_TR_DONE` once the command has completed
pub const TR_DONE_COMPLETE: u32 = 1;

// ============================================================================
// Scratch and shared memory
// ============================================================================

/// DMA scratch word receiving the result of register-type reads
pub const DMA_SCRATCH_ADDR: u32 = 0x1084;
/// Host view of the shared packet memory, used as DMA bounce buffer
pub const HOST_SHARE_MEM_BASE: u32 = 0xd0000;

// ============================================================================
// Pin multiplexing
// ============================================================================

/// GPIO pin-mux register
pub const PINMUX_SEL_REG: u32 = 0x1410;
/// Nibbles for GPIO15..=18
pub const PINMUX_FLASH_MASK: u32 = 0x7777 << 12;
/// Route GPIO15..=18 to the SPI flash
pub const PINMUX_FLASH_ENABLE: u32 = 0x1111 << 12;
/// Park GPIO15..=18 to minimize leakage while the flash sleeps
pub const PINMUX_FLASH_ISOLATE: u32 = 0x0010 << 12;

// ============================================================================
// Silicon revisions
// ============================================================================

/// First revision whose flash sits behind a power/pin-mux gate
pub const REV_3A0: u32 = 0x3a0;
