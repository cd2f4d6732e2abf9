//! Record of bus traffic seen by the emulator

use alloc::vec::Vec;

use winc_flash_core::spi::{opcodes, FlashCommand};

/// One call on the register bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// `write_register(addr, value)`
    WriteRegister {
        /// Register address
        addr: u32,
        /// Value written
        value: u32,
    },
    /// `read_register(addr)` and the value returned
    ReadRegister {
        /// Register address
        addr: u32,
        /// Value returned
        value: u32,
    },
    /// `read_block(addr, len)`
    ReadBlock {
        /// Module memory address
        addr: u32,
        /// Number of bytes
        len: usize,
    },
    /// `write_block(addr, len)`
    WriteBlock {
        /// Module memory address
        addr: u32,
        /// Number of bytes
        len: usize,
    },
}

/// Bus events and decoded flash commands, in issue order
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Vec<BusEvent>,
    commands: Vec<FlashCommand>,
}

impl Journal {
    pub(crate) fn record_event(&mut self, event: BusEvent) {
        self.events.push(event);
    }

    pub(crate) fn record_command(&mut self, cmd: FlashCommand) {
        self.commands.push(cmd);
    }

    /// Every bus call, oldest first
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    /// Every triggered flash command, oldest first
    pub fn commands(&self) -> &[FlashCommand] {
        &self.commands
    }

    /// Number of register writes
    pub fn register_writes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, BusEvent::WriteRegister { .. }))
            .count()
    }

    /// Number of bus calls of any kind
    pub fn bus_operations(&self) -> usize {
        self.events.len()
    }

    /// Commands with the given opcode
    pub fn commands_with(&self, opcode: u8) -> impl Iterator<Item = &FlashCommand> + '_ {
        self.commands.iter().filter(move |c| c.opcode == opcode)
    }

    /// `(addr, len)` of every page program
    pub fn programs(&self) -> Vec<(u32, u32)> {
        self.commands_with(opcodes::PP)
            .map(|c| (c.address.unwrap_or(0), c.program_len))
            .collect()
    }

    /// Address of every sector erase
    pub fn erases(&self) -> Vec<u32> {
        self.commands_with(opcodes::SE_20)
            .map(|c| c.address.unwrap_or(0))
            .collect()
    }

    /// `(addr, len)` of every fast read into memory
    pub fn loads(&self) -> Vec<(u32, u32)> {
        self.commands_with(opcodes::FAST_READ)
            .map(|c| (c.address.unwrap_or(0), c.data_count))
            .collect()
    }

    /// Opcodes in issue order
    pub fn opcodes(&self) -> Vec<u8> {
        self.commands.iter().map(|c| c.opcode).collect()
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.events.clear();
        self.commands.clear();
    }
}
