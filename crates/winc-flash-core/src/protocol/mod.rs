//! Indirect flash command protocol
//!
//! Every primitive in this module stages one SPI NOR command in the module's
//! flash controller, triggers it, and waits for the transaction done
//! register before returning. Read-type commands then fetch their result
//! word from the DMA scratch register.

mod commands;
mod poll;

pub use commands::*;
pub use poll::{issue, wait_ready, wait_transaction_done};
