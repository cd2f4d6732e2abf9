//! SPI NOR types and command structures
//!
//! This module provides the command descriptor understood by the module's
//! indirect flash controller, the opcodes it issues and the status
//! register bits it polls.

mod command;
pub mod opcodes;
mod status;

pub use command::{CommandFrame, FlashCommand, MAX_HEADER_LEN};
pub use opcodes::*;
pub use status::StatusRegister;
