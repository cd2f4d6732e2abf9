//! Flash command descriptor and its register encoding

use crate::regs::{
    CMD_CNT_PROG_LEN_MASK, CMD_CNT_PROG_LEN_OFF, CMD_CNT_TRIGGER, DMA_SCRATCH_ADDR,
    SPI_FLASH_BUF1, SPI_FLASH_BUF2, SPI_FLASH_BUF_DIR, SPI_FLASH_CMD_CNT, SPI_FLASH_DATA_CNT,
    SPI_FLASH_DMA_ADDR,
};
use crate::spi::opcodes;

/// Maximum number of header bytes (opcode + 3 address bytes + dummy byte)
pub const MAX_HEADER_LEN: usize = 5;

/// A single SPI NOR command as seen by the module's flash controller
///
/// Nothing here is persisted; the descriptor only exists long enough to be
/// encoded into a [`CommandFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashCommand {
    /// The opcode byte
    pub opcode: u8,

    /// 24-bit address (if any), sent most significant byte first
    pub address: Option<u32>,

    /// Dummy byte sent after the address (if any)
    pub dummy: Option<u8>,

    /// Number of bytes the DMA engine moves in the data phase
    pub data_count: u32,

    /// DMA target (reads) or source (page program)
    pub dma_addr: u32,

    /// Bytes to program, encoded in the command count register
    pub program_len: u32,
}

impl FlashCommand {
    /// Create a command with no address or data (e.g., WREN, DP)
    pub const fn simple(opcode: u8) -> Self {
        Self {
            opcode,
            address: None,
            dummy: None,
            data_count: 0,
            dma_addr: 0,
            program_len: 0,
        }
    }

    /// Create a register read landing in the DMA scratch word (e.g., RDSR)
    pub const fn read_reg(opcode: u8, data_count: u32) -> Self {
        Self {
            opcode,
            address: None,
            dummy: None,
            data_count,
            dma_addr: DMA_SCRATCH_ADDR,
            program_len: 0,
        }
    }

    /// Create an erase command with 3-byte address
    pub const fn erase(opcode: u8, addr: u32) -> Self {
        Self {
            opcode,
            address: Some(addr),
            dummy: None,
            data_count: 0,
            dma_addr: 0,
            program_len: 0,
        }
    }

    /// Create a page program command sourcing `len` bytes from `mem_addr`
    pub const fn program(addr: u32, mem_addr: u32, len: u32) -> Self {
        Self {
            opcode: opcodes::PP,
            address: Some(addr),
            dummy: None,
            data_count: 0,
            dma_addr: mem_addr,
            program_len: len,
        }
    }

    /// Create a fast read that DMAs `len` bytes into module memory at `mem_addr`
    pub const fn load_to_memory(addr: u32, mem_addr: u32, len: u32) -> Self {
        Self {
            opcode: opcodes::FAST_READ,
            address: Some(addr),
            dummy: Some(opcodes::FAST_READ_DUMMY),
            data_count: len,
            dma_addr: mem_addr,
            program_len: 0,
        }
    }

    /// Number of bytes the host drives before the data phase
    pub fn header_len(&self) -> usize {
        let mut len = 1;
        if self.address.is_some() {
            len += 3;
        }
        if self.dummy.is_some() {
            len += 1;
        }
        len
    }

    /// Header bytes in wire order; only the first `header_len()` are valid
    pub fn header(&self) -> [u8; MAX_HEADER_LEN] {
        let mut buf = [0u8; MAX_HEADER_LEN];
        buf[0] = self.opcode;
        let mut pos = 1;
        if let Some(addr) = self.address {
            buf[1] = (addr >> 16) as u8;
            buf[2] = (addr >> 8) as u8;
            buf[3] = addr as u8;
            pos = 4;
        }
        if let Some(dummy) = self.dummy {
            buf[pos] = dummy;
        }
        buf
    }

    /// Direction mask: one bit per header byte driven by the host
    pub fn direction_mask(&self) -> u32 {
        (1u32 << self.header_len()) - 1
    }

    /// Encode this command into its controller register values
    pub fn encode(&self) -> CommandFrame {
        let header = self.header();
        let header_len = self.header_len();

        let buf1 = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let buf2 = (header_len > 4).then_some(header[4] as u32);

        let cmd_cnt = header_len as u32
            | CMD_CNT_TRIGGER
            | ((self.program_len & CMD_CNT_PROG_LEN_MASK) << CMD_CNT_PROG_LEN_OFF);

        CommandFrame {
            data_count: self.data_count,
            buf1,
            buf2,
            direction: self.direction_mask(),
            dma_addr: self.dma_addr,
            cmd_cnt,
        }
    }
}

/// Register values that stage and trigger one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    /// Value for `SPI_FLASH_DATA_CNT`
    pub data_count: u32,
    /// Value for `SPI_FLASH_BUF1`
    pub buf1: u32,
    /// Value for `SPI_FLASH_BUF2`, only written for 5-byte headers
    pub buf2: Option<u32>,
    /// Value for `SPI_FLASH_BUF_DIR`
    pub direction: u32,
    /// Value for `SPI_FLASH_DMA_ADDR`
    pub dma_addr: u32,
    /// Value for `SPI_FLASH_CMD_CNT`, trigger bit included
    pub cmd_cnt: u32,
}

impl CommandFrame {
    /// Register writes in the order the controller expects them
    ///
    /// The trigger write to `SPI_FLASH_CMD_CNT` is always last.
    pub fn register_writes(&self) -> heapless::Vec<(u32, u32), 6> {
        let mut writes = heapless::Vec::new();
        // Capacity is exactly the number of registers, pushes cannot fail.
        let _ = writes.push((SPI_FLASH_DATA_CNT, self.data_count));
        let _ = writes.push((SPI_FLASH_BUF1, self.buf1));
        if let Some(buf2) = self.buf2 {
            let _ = writes.push((SPI_FLASH_BUF2, buf2));
        }
        let _ = writes.push((SPI_FLASH_BUF_DIR, self.direction));
        let _ = writes.push((SPI_FLASH_DMA_ADDR, self.dma_addr));
        let _ = writes.push((SPI_FLASH_CMD_CNT, self.cmd_cnt));
        writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::HOST_SHARE_MEM_BASE;

    #[test]
    fn test_read_status_frame() {
        let frame = FlashCommand::read_reg(opcodes::RDSR, 4).encode();
        assert_eq!(frame.data_count, 4);
        assert_eq!(frame.buf1, 0x05);
        assert_eq!(frame.buf2, None);
        assert_eq!(frame.direction, 0x01);
        assert_eq!(frame.dma_addr, 0x1084);
        assert_eq!(frame.cmd_cnt, 0x81);
    }

    #[test]
    fn test_simple_frame_has_no_dma() {
        let frame = FlashCommand::simple(opcodes::WREN).encode();
        assert_eq!(frame.data_count, 0);
        assert_eq!(frame.buf1, 0x06);
        assert_eq!(frame.direction, 0x01);
        assert_eq!(frame.dma_addr, 0);
        assert_eq!(frame.cmd_cnt, 1 | (1 << 7));
    }

    #[test]
    fn test_sector_erase_packs_address_msb_first() {
        let frame = FlashCommand::erase(opcodes::SE_20, 0x12_3456).encode();
        // Wire order 0x20 0x12 0x34 0x56, packed little-endian
        assert_eq!(frame.buf1, 0x5634_1220);
        assert_eq!(frame.direction, 0x0f);
        assert_eq!(frame.cmd_cnt, 4 | (1 << 7));
        assert_eq!(frame.dma_addr, 0);
    }

    #[test]
    fn test_page_program_carries_length() {
        let frame = FlashCommand::program(0x0100, HOST_SHARE_MEM_BASE, 256).encode();
        assert_eq!(frame.buf1, 0x0001_0002);
        assert_eq!(frame.data_count, 0);
        assert_eq!(frame.dma_addr, HOST_SHARE_MEM_BASE);
        assert_eq!(frame.cmd_cnt, 4 | (1 << 7) | (256 << 8));
    }

    #[test]
    fn test_program_length_is_masked_to_20_bits() {
        let frame = FlashCommand::program(0, 0, 0x0010_0001).encode();
        assert_eq!(frame.cmd_cnt >> 8, 1);
    }

    #[test]
    fn test_load_to_memory_uses_second_buffer_word() {
        let frame = FlashCommand::load_to_memory(0x01_0203, HOST_SHARE_MEM_BASE, 0x8000).encode();
        assert_eq!(frame.data_count, 0x8000);
        assert_eq!(frame.buf1, 0x0302_010b);
        assert_eq!(frame.buf2, Some(0xA5));
        assert_eq!(frame.direction, 0x1f);
        assert_eq!(frame.cmd_cnt, 5 | (1 << 7));
    }

    #[test]
    fn test_register_write_order() {
        let frame = FlashCommand::load_to_memory(0, HOST_SHARE_MEM_BASE, 16).encode();
        let regs: heapless::Vec<u32, 6> = frame.register_writes().iter().map(|w| w.0).collect();
        assert_eq!(
            regs.as_slice(),
            &[
                SPI_FLASH_DATA_CNT,
                SPI_FLASH_BUF1,
                SPI_FLASH_BUF2,
                SPI_FLASH_BUF_DIR,
                SPI_FLASH_DMA_ADDR,
                SPI_FLASH_CMD_CNT
            ]
        );

        let frame = FlashCommand::simple(opcodes::WRDI).encode();
        let writes = frame.register_writes();
        assert_eq!(writes.len(), 5);
        assert_eq!(writes.last(), Some(&(SPI_FLASH_CMD_CNT, 0x81)));
    }

    #[test]
    fn test_trigger_bit_set_exactly_once() {
        let cmds = [
            FlashCommand::simple(opcodes::DP),
            FlashCommand::read_reg(opcodes::RDID, 4),
            FlashCommand::erase(opcodes::SE_20, 0x1000),
            FlashCommand::program(0x1000, HOST_SHARE_MEM_BASE, 0xff),
            FlashCommand::load_to_memory(0x1000, HOST_SHARE_MEM_BASE, 0x7fff),
        ];
        for cmd in cmds {
            let writes = cmd.encode().register_writes();
            let triggers = writes
                .iter()
                .filter(|(reg, val)| *reg == SPI_FLASH_CMD_CNT && val & CMD_CNT_TRIGGER != 0)
                .count();
            assert_eq!(triggers, 1);
        }
    }
}
