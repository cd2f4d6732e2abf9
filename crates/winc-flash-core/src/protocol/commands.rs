//! Primitive flash commands
//!
//! Compatible with MX25L6465E and should work with other 25-series parts.
//! The `limit` argument bounds the completion poll, `None` waits forever.

use crate::bus::RegisterBus;
use crate::error::Result;
use crate::regs::DMA_SCRATCH_ADDR;
use crate::spi::{opcodes, FlashCommand, StatusRegister};
use maybe_async::maybe_async;

use super::poll::issue;

/// Completion polls allowed for the ID probe
///
/// The probe runs before anything is known about the module, so it never
/// blocks indefinitely.
pub const ID_POLL_LIMIT: u32 = 500;

/// Bytes the DMA engine moves for a status or ID read
const REG_READ_LEN: u32 = 4;

/// Read the status register
#[maybe_async]
pub async fn read_status<B: RegisterBus + ?Sized>(
    bus: &mut B,
    limit: Option<u32>,
) -> Result<StatusRegister> {
    let cmd = FlashCommand::read_reg(opcodes::RDSR, REG_READ_LEN);
    issue(bus, &cmd, limit).await?;
    let reg = bus.read_register(DMA_SCRATCH_ADDR).await?;
    Ok(StatusRegister::from(reg as u8))
}

/// Read the raw JEDEC ID word
///
/// Byte 0 is the manufacturer, byte 1 the memory type and byte 2 the
/// capacity code. Gives up with `Error::Timeout` after [`ID_POLL_LIMIT`]
/// completion polls.
#[maybe_async]
pub async fn read_id<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<u32> {
    let cmd = FlashCommand::read_reg(opcodes::RDID, REG_READ_LEN);
    issue(bus, &cmd, Some(ID_POLL_LIMIT)).await?;
    let id = bus.read_register(DMA_SCRATCH_ADDR).await?;
    log::debug!("Flash ID {:#x}", id);
    Ok(id)
}

/// Read the security register
#[maybe_async]
pub async fn read_security_register<B: RegisterBus + ?Sized>(
    bus: &mut B,
    limit: Option<u32>,
) -> Result<u8> {
    let cmd = FlashCommand::read_reg(opcodes::RDSCUR, 1);
    issue(bus, &cmd, limit).await?;
    let reg = bus.read_register(DMA_SCRATCH_ADDR).await?;
    Ok(reg as u8)
}

/// Send the Write Enable command
#[maybe_async]
pub async fn write_enable<B: RegisterBus + ?Sized>(bus: &mut B, limit: Option<u32>) -> Result<()> {
    issue(bus, &FlashCommand::simple(opcodes::WREN), limit).await
}

/// Send the Write Disable command
#[maybe_async]
pub async fn write_disable<B: RegisterBus + ?Sized>(bus: &mut B, limit: Option<u32>) -> Result<()> {
    issue(bus, &FlashCommand::simple(opcodes::WRDI), limit).await
}

/// Clear the security register fail flags
#[maybe_async]
pub async fn clear_security_flags<B: RegisterBus + ?Sized>(
    bus: &mut B,
    limit: Option<u32>,
) -> Result<()> {
    issue(bus, &FlashCommand::simple(opcodes::CLSR), limit).await
}

/// Unlock every block of the flash
#[maybe_async]
pub async fn gang_unblock<B: RegisterBus + ?Sized>(bus: &mut B, limit: Option<u32>) -> Result<()> {
    issue(bus, &FlashCommand::simple(opcodes::GBULK), limit).await
}

/// Erase the 4KB sector containing `addr`
///
/// Does not wait for the erase itself to finish; poll the status register
/// for that.
#[maybe_async]
pub async fn sector_erase<B: RegisterBus + ?Sized>(
    bus: &mut B,
    addr: u32,
    limit: Option<u32>,
) -> Result<()> {
    issue(bus, &FlashCommand::erase(opcodes::SE_20, addr), limit).await
}

/// Program `len` bytes staged at module address `mem_addr` into flash at `addr`
///
/// The range must not cross a page boundary; the flash wraps inside the
/// page otherwise.
#[maybe_async]
pub async fn page_program<B: RegisterBus + ?Sized>(
    bus: &mut B,
    mem_addr: u32,
    addr: u32,
    len: u32,
    limit: Option<u32>,
) -> Result<()> {
    issue(bus, &FlashCommand::program(addr, mem_addr, len), limit).await
}

/// Fast-read `len` bytes at flash `addr` into module memory at `mem_addr`
///
/// `len` must stay below 64KB, a limit of the module's bus wrapper.
#[maybe_async]
pub async fn load_to_memory<B: RegisterBus + ?Sized>(
    bus: &mut B,
    mem_addr: u32,
    addr: u32,
    len: u32,
    limit: Option<u32>,
) -> Result<()> {
    issue(bus, &FlashCommand::load_to_memory(addr, mem_addr, len), limit).await
}

/// Put the flash into deep power down
#[maybe_async]
pub async fn enter_low_power<B: RegisterBus + ?Sized>(
    bus: &mut B,
    limit: Option<u32>,
) -> Result<()> {
    issue(bus, &FlashCommand::simple(opcodes::DP), limit).await
}

/// Release the flash from deep power down
#[maybe_async]
pub async fn exit_low_power<B: RegisterBus + ?Sized>(bus: &mut B, limit: Option<u32>) -> Result<()> {
    issue(bus, &FlashCommand::simple(opcodes::RDP), limit).await
}
