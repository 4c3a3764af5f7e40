//! Accessory channel abstraction
//!
//! An [`AccessoryChannel`] is the only way the pipeline talks to the pak. Two
//! wire variants implement it:
//!
//! - [`LegacyChannel`] drives the console library's legacy block calls
//!   through a [`MempakBus`]
//! - [`TransferChannel`] builds raw Joybus accessory frames and sends them
//!   through a [`JoybusBus`]
//!
//! Which one is used is decided when the program is built; the pipeline is
//! generic over the trait and never inspects the concrete type.

mod legacy;
pub mod joybus;
mod transfer;

pub use legacy::{status, LegacyChannel, MempakBus};
pub use transfer::{JoybusBus, TransferChannel};

use core::fmt;

use crate::error::TransportError;
use crate::geometry::{bank_select_block, is_block_address, Block, BANK_COUNT, BANK_SELECT_ADDR};

/// Number of controller ports on the console
pub const PORT_COUNT: u8 = 4;

/// A controller port, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Port(u8);

impl Port {
    /// Controller 1
    pub const FIRST: Port = Port(0);

    /// Create a port from a 0-based index
    pub const fn new(index: u8) -> Option<Self> {
        if index < PORT_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// 0-based port index
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Ports are labelled 1-4 on the console
        write!(f, "port {}", self.0 + 1)
    }
}

/// Wire protocol to an attached controller pak
///
/// All calls are blocking: they return once the bus transaction finished or
/// the transport reported a failure. A block read either fills the whole
/// block or fails.
pub trait AccessoryChannel {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Whether a compatible pak is attached and responding
    fn probe(&mut self, port: Port) -> bool;

    /// Write a block to the pak
    fn write_block(
        &mut self,
        port: Port,
        address: u16,
        data: &Block,
    ) -> Result<(), TransportError>;

    /// Read exactly one block at a 32-byte aligned address
    fn read_block(&mut self, port: Port, address: u16) -> Result<Block, TransportError>;

    /// Select `bank` for subsequent data window reads
    fn select_bank(&mut self, port: Port, bank: u8) -> Result<(), TransportError> {
        if bank as usize >= BANK_COUNT {
            return Err(TransportError::InvalidBank(bank));
        }
        log::trace!("{}: select bank {}", port, bank);
        self.write_block(port, BANK_SELECT_ADDR, &bank_select_block(bank))
    }
}

impl<C: AccessoryChannel + ?Sized> AccessoryChannel for &mut C {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn probe(&mut self, port: Port) -> bool {
        (**self).probe(port)
    }

    fn write_block(
        &mut self,
        port: Port,
        address: u16,
        data: &Block,
    ) -> Result<(), TransportError> {
        (**self).write_block(port, address, data)
    }

    fn read_block(&mut self, port: Port, address: u16) -> Result<Block, TransportError> {
        (**self).read_block(port, address)
    }

    fn select_bank(&mut self, port: Port, bank: u8) -> Result<(), TransportError> {
        (**self).select_bank(port, bank)
    }
}

/// Reject addresses no block transfer may use
pub(crate) fn check_address(address: u16) -> Result<(), TransportError> {
    if is_block_address(address) {
        Ok(())
    } else {
        Err(TransportError::InvalidAddress(address))
    }
}
