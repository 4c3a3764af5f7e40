//! Page assembly from block reads

use crate::channel::{AccessoryChannel, Port};
use crate::error::TransportError;
use crate::geometry::{Page, BLOCK_SIZE, PAGE_SIZE};

/// Reads 256-byte pages as [`BLOCKS_PER_PAGE`](crate::geometry::BLOCKS_PER_PAGE) consecutive blocks
pub struct BankReader;

impl BankReader {
    /// Read the page starting at `base_address` in the selected bank
    ///
    /// Blocks are read in ascending address order. The first failing block
    /// aborts the page and its error is returned unchanged; a partially read
    /// page is never returned.
    pub fn read_page<C: AccessoryChannel + ?Sized>(
        channel: &mut C,
        port: Port,
        base_address: u16,
    ) -> Result<Page, TransportError> {
        let mut page = [0u8; PAGE_SIZE];
        for (i, chunk) in page.chunks_exact_mut(BLOCK_SIZE).enumerate() {
            let address = base_address + (i * BLOCK_SIZE) as u16;
            let block = channel.read_block(port, address)?;
            chunk.copy_from_slice(&block);
        }
        Ok(page)
    }
}
