//! winc-flash-dummy - In-memory WiFi module emulator for testing
//!
//! This crate emulates the part of a WINC1500-class module that the flash
//! driver talks to: the register file with its SPI flash controller, the
//! shared memory window used for DMA, and the SPI NOR chip behind it. It's
//! useful for testing and development without real hardware.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod journal;

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;

use maybe_async::maybe_async;
use winc_flash_core::error::{Error, Result};
use winc_flash_core::regs::{
    CMD_CNT_LEN_MASK, CMD_CNT_PROG_LEN_MASK, CMD_CNT_PROG_LEN_OFF, CMD_CNT_TRIGGER,
    HOST_SHARE_MEM_BASE, REV_3A0, SPI_FLASH_BUF1, SPI_FLASH_BUF2, SPI_FLASH_CMD_CNT,
    SPI_FLASH_DATA_CNT, SPI_FLASH_DMA_ADDR, SPI_FLASH_TR_DONE, TR_DONE_COMPLETE,
};
use winc_flash_core::spi::{opcodes, FlashCommand, StatusRegister};
use winc_flash_core::RegisterBus;

pub use journal::{BusEvent, Journal};

/// Emulated page size
const PAGE_SIZE: usize = 256;
/// Emulated sector size
const SECTOR_SIZE: usize = 4096;

/// Configuration for the dummy module
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// JEDEC ID bytes: manufacturer, memory type, capacity code
    pub jedec_id: [u8; 3],
    /// Flash size in bytes
    pub size: usize,
    /// Silicon revision reported by `chip_revision`
    pub chip_revision: u32,
    /// TR_DONE reads that return 0 after each trigger
    pub completion_latency: u32,
    /// Never complete a triggered command
    pub hang: bool,
    /// Status reads that report WIP after a program or erase
    pub busy_polls: u32,
    /// Base of the shared memory window
    pub shared_mem_base: u32,
    /// Size of the shared memory window in bytes
    pub shared_mem_size: usize,
    /// Initial security register value
    pub security: u8,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            jedec_id: [0xC2, 0x20, 0x13], // Macronix, 4 Mbit
            size: 512 * 1024,
            chip_revision: REV_3A0,
            completion_latency: 0,
            hang: false,
            busy_polls: 2,
            shared_mem_base: HOST_SHARE_MEM_BASE,
            shared_mem_size: 64 * 1024,
            security: 0,
        }
    }
}

impl DummyConfig {
    /// Raw ID word as the driver reads it from the DMA scratch register
    pub fn id_word(&self) -> u32 {
        u32::from_le_bytes([self.jedec_id[0], self.jedec_id[1], self.jedec_id[2], 0])
    }
}

/// Pending fault
#[derive(Debug, Clone, Copy, Default)]
struct Faults {
    /// Bus calls left before the next one fails
    countdown: Option<usize>,
    /// Register whose every access fails
    register: Option<u32>,
}

/// Dummy WiFi module
///
/// Emulates the module's register bus, shared memory and flash chip in
/// memory for testing purposes.
pub struct DummyModule {
    config: DummyConfig,
    flash: Vec<u8>,
    shared_mem: Vec<u8>,
    registers: BTreeMap<u32, u32>,
    write_enabled: bool,
    busy: u32,
    powered_down: bool,
    security: u8,
    blocks_locked: bool,
    tr_pending: u32,
    faults: Faults,
    journal: Journal,
}

impl DummyModule {
    /// Create a new dummy module with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let flash = vec![0xFF; config.size];
        let shared_mem = vec![0; config.shared_mem_size];
        let security = config.security;
        Self {
            config,
            flash,
            shared_mem,
            registers: BTreeMap::new(),
            write_enabled: false,
            busy: 0,
            powered_down: false,
            security,
            blocks_locked: security & opcodes::SCUR_WPSEL != 0,
            tr_pending: 0,
            faults: Faults::default(),
            journal: Journal::default(),
        }
    }

    /// Create a new dummy module with default configuration (4 Mbit Macronix)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy module with pre-filled flash contents
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut module = Self::new(config);
        let len = core::cmp::min(initial_data.len(), module.flash.len());
        module.flash[..len].copy_from_slice(&initial_data[..len]);
        module
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Get a reference to the flash contents
    pub fn data(&self) -> &[u8] {
        &self.flash
    }

    /// Get a mutable reference to the flash contents
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.flash
    }

    /// Get a reference to the shared memory window
    pub fn shared_memory(&self) -> &[u8] {
        &self.shared_mem
    }

    /// Current register value, without recording a bus event
    pub fn register(&self, addr: u32) -> u32 {
        self.registers.get(&addr).copied().unwrap_or(0)
    }

    /// Set a register value, without recording a bus event
    pub fn set_register(&mut self, addr: u32, value: u32) {
        self.registers.insert(addr, value);
    }

    /// Whether the flash is in deep power down
    pub fn is_powered_down(&self) -> bool {
        self.powered_down
    }

    /// Whether the write enable latch is set
    pub fn write_enabled(&self) -> bool {
        self.write_enabled
    }

    /// Current security register value
    pub fn security_register(&self) -> u8 {
        self.security
    }

    /// Whether program and erase are blocked by the block lock
    pub fn blocks_locked(&self) -> bool {
        self.blocks_locked
    }

    /// Recorded traffic
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Forget recorded traffic
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Fail the `n`th bus call from now (1 is the next one), once
    pub fn fail_nth_operation(&mut self, n: usize) {
        self.faults.countdown = Some(n.max(1));
    }

    /// Fail every access to register `addr`
    pub fn fail_register(&mut self, addr: u32) {
        self.faults.register = Some(addr);
    }

    /// Remove all injected faults
    pub fn clear_faults(&mut self) {
        self.faults = Faults::default();
    }

    /// Make the module stop (or resume) completing commands
    pub fn set_hang(&mut self, hang: bool) {
        self.config.hang = hang;
    }

    fn check_fault(&mut self, reg: Option<u32>) -> Result<()> {
        if let Some(left) = self.faults.countdown {
            if left <= 1 {
                self.faults.countdown = None;
                log::debug!("dummy: injected bus failure");
                return Err(Error::TransportFailure);
            }
            self.faults.countdown = Some(left - 1);
        }

        if let (Some(addr), Some(failing)) = (reg, self.faults.register) {
            if addr == failing {
                log::debug!("dummy: injected failure on register {:#x}", addr);
                return Err(Error::TransportFailure);
            }
        }

        Ok(())
    }

    fn shared_range(&self, addr: u32, len: usize) -> Option<core::ops::Range<usize>> {
        let start = addr.checked_sub(self.config.shared_mem_base)? as usize;
        let end = start.checked_add(len)?;
        (end <= self.shared_mem.len()).then_some(start..end)
    }

    /// Store DMA data at a module address
    ///
    /// Shared memory takes the bytes directly; anything else is treated as
    /// register space and updated byte lane by byte lane.
    fn dma_store(&mut self, addr: u32, data: &[u8]) {
        if let Some(range) = self.shared_range(addr, data.len()) {
            self.shared_mem[range].copy_from_slice(data);
            return;
        }

        for (i, &byte) in data.iter().enumerate() {
            let byte_addr = addr.wrapping_add(i as u32);
            let word_addr = byte_addr & !3;
            let shift = (byte_addr & 3) * 8;
            let word = self.register(word_addr);
            let word = (word & !(0xff << shift)) | ((byte as u32) << shift);
            self.registers.insert(word_addr, word);
        }
    }

    fn dma_load(&self, addr: u32, len: usize) -> Vec<u8> {
        match self.shared_range(addr, len) {
            Some(range) => self.shared_mem[range].to_vec(),
            None => {
                log::warn!("dummy: DMA source {:#x} outside shared memory", addr);
                vec![0xFF; len]
            }
        }
    }

    fn status(&self) -> StatusRegister {
        let mut status = StatusRegister::empty();
        status.set(StatusRegister::WIP, self.busy > 0);
        status.set(StatusRegister::WEL, self.write_enabled);
        status
    }

    /// Decode the staged command block into a command descriptor
    fn decode(&self, cmd_cnt: u32) -> FlashCommand {
        let header_len = (cmd_cnt & CMD_CNT_LEN_MASK) as usize;
        let buf1 = self.register(SPI_FLASH_BUF1).to_le_bytes();
        let buf2 = self.register(SPI_FLASH_BUF2) as u8;

        let address = (header_len >= 4)
            .then(|| ((buf1[1] as u32) << 16) | ((buf1[2] as u32) << 8) | buf1[3] as u32);
        let dummy = (header_len >= 5).then_some(buf2);

        FlashCommand {
            opcode: buf1[0],
            address,
            dummy,
            data_count: self.register(SPI_FLASH_DATA_CNT),
            dma_addr: self.register(SPI_FLASH_DMA_ADDR),
            program_len: (cmd_cnt >> CMD_CNT_PROG_LEN_OFF) & CMD_CNT_PROG_LEN_MASK,
        }
    }

    fn execute(&mut self, cmd: &FlashCommand) {
        if self.powered_down && cmd.opcode != opcodes::RDP {
            log::debug!("dummy: flash asleep, ignoring {:#04x}", cmd.opcode);
            return;
        }

        match cmd.opcode {
            opcodes::RDSR => {
                let status = self.status().bits();
                self.busy = self.busy.saturating_sub(1);
                self.reply(cmd, &[status, status, status, status]);
            }
            opcodes::RDID => {
                let id = self.config.id_word().to_le_bytes();
                self.reply(cmd, &id);
            }
            opcodes::RDSCUR => {
                let scur = self.security;
                self.reply(cmd, &[scur, scur, scur, scur]);
            }
            opcodes::WREN => self.write_enabled = true,
            opcodes::WRDI => self.write_enabled = false,
            opcodes::CLSR => self.security &= !(opcodes::SCUR_P_FAIL | opcodes::SCUR_E_FAIL),
            opcodes::GBULK => {
                if self.write_enabled {
                    self.blocks_locked = false;
                    self.write_enabled = false;
                }
            }
            opcodes::FAST_READ => self.handle_fast_read(cmd),
            opcodes::PP => self.handle_page_program(cmd),
            opcodes::SE_20 => self.handle_sector_erase(cmd),
            opcodes::DP => self.powered_down = true,
            opcodes::RDP => self.powered_down = false,
            op => log::warn!("dummy: unsupported opcode {:#04x}", op),
        }
    }

    /// Deliver the data phase of a read-type command
    fn reply(&mut self, cmd: &FlashCommand, data: &[u8]) {
        let len = core::cmp::min(cmd.data_count as usize, data.len());
        self.dma_store(cmd.dma_addr, &data[..len]);
    }

    fn flash_index(&self, addr: u32) -> usize {
        addr as usize % self.flash.len()
    }

    fn handle_fast_read(&mut self, cmd: &FlashCommand) {
        let addr = cmd.address.unwrap_or(0);
        let len = cmd.data_count as usize;
        let data: Vec<u8> = (0..len)
            .map(|i| self.flash[self.flash_index(addr.wrapping_add(i as u32))])
            .collect();
        self.dma_store(cmd.dma_addr, &data);
    }

    fn handle_page_program(&mut self, cmd: &FlashCommand) {
        if !self.write_enabled {
            log::debug!("dummy: page program without WEL ignored");
            return;
        }
        self.write_enabled = false;

        if self.blocks_locked {
            self.security |= opcodes::SCUR_P_FAIL;
            return;
        }

        let addr = self.flash_index(cmd.address.unwrap_or(0));
        let page = addr & !(PAGE_SIZE - 1);
        let data = self.dma_load(cmd.dma_addr, cmd.program_len as usize);

        // Flash programming: can only change 1 -> 0, wrapping inside the page
        for (i, &byte) in data.iter().enumerate() {
            let target = page + (addr + i) % PAGE_SIZE;
            self.flash[target] &= byte;
        }

        self.busy = self.config.busy_polls;
    }

    fn handle_sector_erase(&mut self, cmd: &FlashCommand) {
        if !self.write_enabled {
            log::debug!("dummy: sector erase without WEL ignored");
            return;
        }
        self.write_enabled = false;

        if self.blocks_locked {
            self.security |= opcodes::SCUR_E_FAIL;
            return;
        }

        let addr = self.flash_index(cmd.address.unwrap_or(0));
        let sector = addr & !(SECTOR_SIZE - 1);
        let end = core::cmp::min(sector + SECTOR_SIZE, self.flash.len());
        for byte in &mut self.flash[sector..end] {
            *byte = 0xFF;
        }

        self.busy = self.config.busy_polls;
    }

    fn handle_register_write(&mut self, addr: u32, value: u32) {
        self.registers.insert(addr, value);

        if addr == SPI_FLASH_CMD_CNT && value & CMD_CNT_TRIGGER != 0 {
            let cmd = self.decode(value);
            log::trace!("dummy: cmd {:#04x} addr={:?}", cmd.opcode, cmd.address);
            self.execute(&cmd);
            self.journal.record_command(cmd);
            self.tr_pending = self.config.completion_latency;
            self.registers.insert(SPI_FLASH_TR_DONE, 0);
        }
    }

    fn handle_register_read(&mut self, addr: u32) -> u32 {
        if addr != SPI_FLASH_TR_DONE {
            return self.register(addr);
        }

        if self.config.hang {
            return 0;
        }
        if self.tr_pending > 0 {
            self.tr_pending -= 1;
            return 0;
        }
        self.registers.insert(SPI_FLASH_TR_DONE, TR_DONE_COMPLETE);
        TR_DONE_COMPLETE
    }
}

#[maybe_async(AFIT)]
impl RegisterBus for DummyModule {
    async fn write_register(&mut self, addr: u32, value: u32) -> Result<()> {
        self.check_fault(Some(addr))?;
        self.journal.record_event(BusEvent::WriteRegister { addr, value });
        self.handle_register_write(addr, value);
        Ok(())
    }

    async fn read_register(&mut self, addr: u32) -> Result<u32> {
        self.check_fault(Some(addr))?;
        let value = self.handle_register_read(addr);
        self.journal.record_event(BusEvent::ReadRegister { addr, value });
        Ok(value)
    }

    async fn read_block(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        self.check_fault(None)?;
        let range = self
            .shared_range(addr, buf.len())
            .ok_or(Error::TransportFailure)?;
        buf.copy_from_slice(&self.shared_mem[range]);
        self.journal.record_event(BusEvent::ReadBlock {
            addr,
            len: buf.len(),
        });
        Ok(())
    }

    async fn write_block(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        self.check_fault(None)?;
        let range = self
            .shared_range(addr, data.len())
            .ok_or(Error::TransportFailure)?;
        self.shared_mem[range].copy_from_slice(data);
        self.journal.record_event(BusEvent::WriteBlock {
            addr,
            len: data.len(),
        });
        Ok(())
    }

    async fn chip_revision(&mut self) -> Result<u32> {
        Ok(self.config.chip_revision)
    }
}
