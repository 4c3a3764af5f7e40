//! Unified accessory-transfer variant
//!
//! Newer console libraries expose a raw Joybus exchange. [`TransferChannel`]
//! builds the accessory read/write frames itself and validates the data CRC
//! the pak returns.

use super::joybus::{self, CrcCheck, READ_RX_LEN, WRITE_RX_LEN};
use super::{check_address, AccessoryChannel, Port};
use crate::error::TransportError;
use crate::geometry::{Block, BLOCK_SIZE, LABEL_ADDR};

/// Raw Joybus exchange with the controller on a port
pub trait JoybusBus {
    /// Send `tx` and receive exactly `rx.len()` bytes
    ///
    /// Returns [`TransportError::NoResponse`] if the controller did not
    /// answer.
    fn exchange(&mut self, port: Port, tx: &[u8], rx: &mut [u8]) -> Result<(), TransportError>;
}

impl<B: JoybusBus + ?Sized> JoybusBus for &mut B {
    fn exchange(&mut self, port: Port, tx: &[u8], rx: &mut [u8]) -> Result<(), TransportError> {
        (**self).exchange(port, tx, rx)
    }
}

fn crc_result(data: &Block, found: u8) -> Result<(), TransportError> {
    match joybus::check_crc(data, found) {
        CrcCheck::Valid => Ok(()),
        CrcCheck::NoPak => Err(TransportError::NoAccessory),
        CrcCheck::Mismatch => Err(TransportError::DataCrc {
            expected: joybus::data_crc(data),
            found,
        }),
    }
}

/// [`AccessoryChannel`] speaking Joybus accessory frames
pub struct TransferChannel<B> {
    bus: B,
}

impl<B: JoybusBus> TransferChannel<B> {
    /// Wrap a Joybus exchange
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

impl<B: JoybusBus> AccessoryChannel for TransferChannel<B> {
    fn name(&self) -> &'static str {
        "transfer"
    }

    fn probe(&mut self, port: Port) -> bool {
        match self.read_block(port, LABEL_ADDR) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("{}: label read failed: {}", port, e);
                false
            }
        }
    }

    fn write_block(
        &mut self,
        port: Port,
        address: u16,
        data: &Block,
    ) -> Result<(), TransportError> {
        check_address(address)?;
        let tx = joybus::encode_write(address, data);
        let mut rx = [0u8; WRITE_RX_LEN];
        self.bus.exchange(port, &tx, &mut rx)?;

        match crc_result(data, rx[0]) {
            Err(TransportError::DataCrc { .. }) => Err(TransportError::WriteNotAcknowledged),
            other => other,
        }
    }

    fn read_block(&mut self, port: Port, address: u16) -> Result<Block, TransportError> {
        check_address(address)?;
        let tx = joybus::encode_read(address);
        let mut rx = [0u8; READ_RX_LEN];
        self.bus.exchange(port, &tx, &mut rx)?;

        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(&rx[..BLOCK_SIZE]);
        crc_result(&block, rx[BLOCK_SIZE])?;
        Ok(block)
    }
}
