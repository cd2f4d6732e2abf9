//! Command issue and completion polling

use crate::bus::RegisterBus;
use crate::error::{Error, Result};
use crate::regs::{SPI_FLASH_TR_DONE, TR_DONE_COMPLETE};
use crate::spi::FlashCommand;
use maybe_async::maybe_async;

use super::commands::read_status;

/// Wait for the controller to report the last command as done
///
/// Polls `SPI_FLASH_TR_DONE` back to back until it reads 1. A failing
/// register read aborts immediately. With `limit` set to `None` this blocks
/// for as long as the module stays silent.
#[maybe_async]
pub async fn wait_transaction_done<B: RegisterBus + ?Sized>(
    bus: &mut B,
    limit: Option<u32>,
) -> Result<()> {
    let mut polls: u32 = 0;

    loop {
        let done = bus.read_register(SPI_FLASH_TR_DONE).await?;
        if done == TR_DONE_COMPLETE {
            return Ok(());
        }

        polls = polls.saturating_add(1);
        if let Some(max) = limit {
            if polls >= max {
                log::warn!("flash controller not done after {} polls", polls);
                return Err(Error::Timeout);
            }
        }
    }
}

/// Stage `cmd` in the controller, trigger it and wait for completion
#[maybe_async]
pub async fn issue<B: RegisterBus + ?Sized>(
    bus: &mut B,
    cmd: &FlashCommand,
    limit: Option<u32>,
) -> Result<()> {
    let frame = cmd.encode();
    log::trace!(
        "cmd {:#04x}: data_cnt={:#x} buf1={:#010x} buf2={:?} dir={:#04x} dma={:#x} cmd_cnt={:#x}",
        cmd.opcode,
        frame.data_count,
        frame.buf1,
        frame.buf2,
        frame.direction,
        frame.dma_addr,
        frame.cmd_cnt
    );

    for (reg, value) in frame.register_writes() {
        bus.write_register(reg, value).await?;
    }

    wait_transaction_done(bus, limit).await
}

/// Wait for the WIP (Write In Progress) bit to clear
///
/// Reads the status register at least once and keeps reading until the
/// flash reports idle. `limit` bounds both the number of status reads and
/// each read's completion poll.
#[maybe_async]
pub async fn wait_ready<B: RegisterBus + ?Sized>(bus: &mut B, limit: Option<u32>) -> Result<()> {
    let mut polls: u32 = 0;

    loop {
        let status = read_status(bus, limit).await?;
        if !status.is_busy() {
            return Ok(());
        }

        polls = polls.saturating_add(1);
        if let Some(max) = limit {
            if polls >= max {
                log::warn!("flash still busy after {} status reads", polls);
                return Err(Error::Timeout);
            }
        }
    }
}
