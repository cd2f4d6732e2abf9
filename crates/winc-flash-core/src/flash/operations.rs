//! Public flash operations
//!
//! Each operation is composed from the primitive commands in
//! [`crate::protocol`] and aborts on the first failure. A failed operation
//! leaves flash and shared memory in an unknown, partially updated state.

use crate::bus::RegisterBus;
use crate::error::{Error, Result};
use crate::protocol;
use crate::regs::{
    PINMUX_FLASH_ENABLE, PINMUX_FLASH_ISOLATE, PINMUX_FLASH_MASK, PINMUX_SEL_REG, REV_3A0,
};
use crate::spi::opcodes::SCUR_WPSEL;
use maybe_async::maybe_async;

use super::context::FlashContext;
use super::geometry::{
    check_range, erase_strides, program_chunks, read_chunks, LEGACY_ERASE_NUDGE,
};
use super::id::FlashId;

/// Route the flash pins and power the flash up or down
///
/// Modules older than revision `0x3A0` have no flash power gate; the call
/// then returns immediately without touching the bus beyond the revision
/// query. Enabling routes the pins before waking the flash; disabling puts
/// the flash to sleep before the pins are isolated.
#[maybe_async]
pub async fn enable<B: RegisterBus + ?Sized>(
    bus: &mut B,
    ctx: &FlashContext,
    on: bool,
) -> Result<()> {
    let rev = bus.chip_revision().await?;
    if rev < REV_3A0 {
        log::debug!("Chip revision {:#x} has no flash gate", rev);
        return Ok(());
    }

    let limit = ctx.poll_limit();
    let mut pinmux = bus.read_register(PINMUX_SEL_REG).await? & !PINMUX_FLASH_MASK;

    if on {
        pinmux |= PINMUX_FLASH_ENABLE;
        bus.write_register(PINMUX_SEL_REG, pinmux).await?;
        protocol::exit_low_power(bus, limit).await?;
    } else {
        protocol::enter_low_power(bus, limit).await?;
        pinmux |= PINMUX_FLASH_ISOLATE;
        bus.write_register(PINMUX_SEL_REG, pinmux).await?;
    }

    log::debug!("Flash {}", if on { "enabled" } else { "disabled" });
    Ok(())
}

/// Read flash contents into `buf`
///
/// The transfer is split into 32KB blocks, each bounced through the
/// module's shared memory.
#[maybe_async]
pub async fn read<B: RegisterBus + ?Sized>(
    bus: &mut B,
    ctx: &FlashContext,
    addr: u32,
    buf: &mut [u8],
) -> Result<()> {
    check_range(addr, buf.len())?;

    let mem = ctx.config.shared_mem_base;
    let limit = ctx.poll_limit();

    for chunk in read_chunks(addr, buf.len()) {
        protocol::load_to_memory(bus, mem, chunk.addr, chunk.len as u32, limit).await?;
        bus.read_block(mem, &mut buf[chunk.range()]).await?;
    }

    Ok(())
}

/// Program one page-contained chunk and wait for the flash to finish
#[maybe_async]
async fn program_page<B: RegisterBus + ?Sized>(
    bus: &mut B,
    ctx: &FlashContext,
    addr: u32,
    data: &[u8],
) -> Result<()> {
    let mem = ctx.config.shared_mem_base;
    let limit = ctx.poll_limit();

    protocol::write_enable(bus, limit).await?;
    bus.write_block(mem, data).await?;
    protocol::page_program(bus, mem, addr, data.len() as u32, limit).await?;

    // First status read after the program command is not trusted
    protocol::read_status(bus, limit).await?;
    protocol::wait_ready(bus, limit).await?;

    protocol::write_disable(bus, limit).await
}

/// Write data to flash
///
/// The target region must be erased first. An unaligned start fills the
/// rest of its page before whole pages are programmed; no program command
/// ever crosses a page boundary.
#[maybe_async]
pub async fn write<B: RegisterBus + ?Sized>(
    bus: &mut B,
    ctx: &FlashContext,
    addr: u32,
    data: &[u8],
) -> Result<()> {
    if data.is_empty() {
        return Err(Error::InvalidLength);
    }
    check_range(addr, data.len())?;

    for chunk in program_chunks(addr, data.len()) {
        program_page(bus, ctx, chunk.addr, &data[chunk.range()]).await?;
    }

    Ok(())
}

/// Erase `len` bytes starting at `addr`
///
/// One sector erase is issued per 4KB stride starting at `addr`, so a
/// partial final stride is erased too. Sector erase acts on the whole
/// sector containing the address, which means bytes before an unaligned
/// `addr` are erased as well.
#[maybe_async]
pub async fn erase<B: RegisterBus + ?Sized>(
    bus: &mut B,
    ctx: &FlashContext,
    addr: u32,
    len: u32,
) -> Result<()> {
    check_range(addr, len as usize)?;

    let limit = ctx.poll_limit();
    let nudge = if ctx.config.legacy_erase_offset {
        LEGACY_ERASE_NUDGE
    } else {
        0
    };

    log::debug!("Erasing {:#x} bytes at {:#x}", len, addr);

    for stride in erase_strides(addr, len) {
        protocol::write_enable(bus, limit).await?;
        protocol::read_status(bus, limit).await?;
        protocol::sector_erase(bus, stride + nudge, limit).await?;
        protocol::read_status(bus, limit).await?;
        protocol::wait_ready(bus, limit).await?;
    }

    log::debug!("Erase done");
    Ok(())
}

/// Read the flash JEDEC ID
#[maybe_async]
pub async fn read_id<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<FlashId> {
    protocol::read_id(bus).await.map(FlashId)
}

/// Flash size in Mbit, 0 if it cannot be detected
///
/// The first successful probe is cached in `ctx`; a failed probe is not,
/// so the next call probes again.
#[maybe_async]
pub async fn size<B: RegisterBus + ?Sized>(bus: &mut B, ctx: &mut FlashContext) -> u32 {
    if let Some(size) = ctx.cached_size() {
        return size;
    }

    let id = match read_id(bus).await {
        Ok(id) => id,
        Err(e) => {
            log::warn!("Flash ID probe failed: {}", e);
            return 0;
        }
    };

    match id.size_mbit() {
        Some(size) => {
            log::debug!("Flash size {} Mbit (ID {})", size, id);
            ctx.set_size(size);
            size
        }
        None => {
            log::warn!("Can't detect flash size from ID {:#x}", id.0);
            0
        }
    }
}

/// Read the security register
#[maybe_async]
pub async fn read_security_register<B: RegisterBus + ?Sized>(
    bus: &mut B,
    ctx: &FlashContext,
) -> Result<u8> {
    protocol::read_security_register(bus, ctx.poll_limit()).await
}

/// Clear the security flags and unlock all blocks if any are locked
#[maybe_async]
pub async fn unlock<B: RegisterBus + ?Sized>(bus: &mut B, ctx: &FlashContext) -> Result<()> {
    let limit = ctx.poll_limit();

    let scur = protocol::read_security_register(bus, limit).await?;
    protocol::clear_security_flags(bus, limit).await?;

    if scur & SCUR_WPSEL != 0 {
        log::debug!("Security register {:#04x}, unlocking blocks", scur);
        protocol::write_enable(bus, limit).await?;
        protocol::gang_unblock(bus, limit).await?;
    }

    Ok(())
}
