//! Legacy block-transfer variant
//!
//! Older console libraries expose the pak through three calls: an init
//! routine that reports whether a pak answered, and block read/write calls
//! returning an integer status. [`LegacyChannel`] adapts those calls to
//! [`AccessoryChannel`].

use super::{check_address, AccessoryChannel, Port};
use crate::error::TransportError;
use crate::geometry::{Block, BLOCK_SIZE};

/// Status codes returned by the legacy block calls
pub mod status {
    /// Transfer completed
    pub const OK: i32 = 0;
    /// No pak inserted in the controller
    pub const NO_PAK: i32 = -1;
    /// Data CRC check failed
    pub const BAD_CRC: i32 = -2;
    /// Controller did not answer
    pub const NO_CONTROLLER: i32 = -3;
}

/// Legacy console library calls for controller pak access
pub trait MempakBus {
    /// Initialize the pak on `port`; returns true if one answered
    fn init(&mut self, port: Port) -> bool;

    /// Read one block; returns a [`status`] code
    fn read_address(&mut self, port: Port, address: u16, data: &mut [u8; BLOCK_SIZE]) -> i32;

    /// Write one block; returns a [`status`] code
    fn write_address(&mut self, port: Port, address: u16, data: &[u8; BLOCK_SIZE]) -> i32;
}

impl<B: MempakBus + ?Sized> MempakBus for &mut B {
    fn init(&mut self, port: Port) -> bool {
        (**self).init(port)
    }

    fn read_address(&mut self, port: Port, address: u16, data: &mut [u8; BLOCK_SIZE]) -> i32 {
        (**self).read_address(port, address, data)
    }

    fn write_address(&mut self, port: Port, address: u16, data: &[u8; BLOCK_SIZE]) -> i32 {
        (**self).write_address(port, address, data)
    }
}

/// Map a legacy status code to a transport result
pub(crate) fn status_to_result(code: i32) -> Result<(), TransportError> {
    match code {
        status::OK => Ok(()),
        status::NO_PAK => Err(TransportError::NoAccessory),
        // The legacy calls do not report the CRC values
        status::BAD_CRC => Err(TransportError::DataCrc {
            expected: 0,
            found: 0,
        }),
        status::NO_CONTROLLER => Err(TransportError::NoResponse),
        other => Err(TransportError::Status(other)),
    }
}

/// [`AccessoryChannel`] backed by the legacy block calls
pub struct LegacyChannel<B> {
    bus: B,
}

impl<B: MempakBus> LegacyChannel<B> {
    /// Wrap a legacy bus
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Get a reference to the underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Get a mutable reference to the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consume the channel and return the bus
    pub fn into_inner(self) -> B {
        self.bus
    }
}

impl<B: MempakBus> AccessoryChannel for LegacyChannel<B> {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn probe(&mut self, port: Port) -> bool {
        self.bus.init(port)
    }

    fn write_block(
        &mut self,
        port: Port,
        address: u16,
        data: &Block,
    ) -> Result<(), TransportError> {
        check_address(address)?;
        status_to_result(self.bus.write_address(port, address, data))
    }

    fn read_block(&mut self, port: Port, address: u16) -> Result<Block, TransportError> {
        check_address(address)?;
        let mut block = [0u8; BLOCK_SIZE];
        status_to_result(self.bus.read_address(port, address, &mut block))?;
        Ok(block)
    }
}
