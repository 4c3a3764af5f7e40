//! Pak and FlashRAM geometry
//!
//! All sizes and bus addresses used by the acquisition pipeline. The image
//! layout is Bank0 ‖ Bank1 ‖ Bank2 ‖ Bank3, each bank Page0 ‖ … ‖ Page127,
//! each page 8 blocks in address order.

/// Atomic transfer unit on the accessory bus
pub const BLOCK_SIZE: usize = 32;

/// Number of blocks that make up one page
pub const BLOCKS_PER_PAGE: usize = 8;

/// Read granularity of the assembler
pub const PAGE_SIZE: usize = BLOCK_SIZE * BLOCKS_PER_PAGE;

/// Pages in one 32 KiB bank
pub const PAGES_PER_BANK: usize = 128;

/// Size of one bank's data window
pub const BANK_SIZE: usize = PAGE_SIZE * PAGES_PER_BANK;

/// Number of selectable banks on a 1 Mbit pak
pub const BANK_COUNT: usize = 4;

/// Total size of an assembled dump
pub const IMAGE_SIZE: usize = BANK_SIZE * BANK_COUNT;

/// Write unit accepted by cartridge FlashRAM
pub const FLASH_CHUNK_SIZE: usize = 128;

/// Number of chunk writes needed to store a full image
pub const FLASH_CHUNK_COUNT: usize = IMAGE_SIZE.div_ceil(FLASH_CHUNK_SIZE);

/// Value used for bytes that were never read
pub const SENTINEL: u8 = 0xFF;

/// First block address of the data window
pub const DATA_START: u16 = 0x0000;

/// Start of the last block in the data window (inclusive)
pub const DATA_END: u16 = 0x7FE0;

/// Bank-select register; a block written here selects the bank in byte 0
pub const BANK_SELECT_ADDR: u16 = 0x8000;

/// Block holding the pak label, read by the transfer-variant probe
pub const LABEL_ADDR: u16 = 0x0000;

/// A single bus block
pub type Block = [u8; BLOCK_SIZE];

/// One assembled page
pub type Page = [u8; PAGE_SIZE];

/// Bus address of the first block of `page` within a bank
pub const fn page_address(page: usize) -> u16 {
    DATA_START + (page * PAGE_SIZE) as u16
}

/// Offset of `bank`/`page` inside the assembled image
pub const fn image_offset(bank: usize, page: usize) -> usize {
    bank * BANK_SIZE + page * PAGE_SIZE
}

/// Whether `address` may be used for a block transfer
///
/// Valid addresses are 32-byte aligned and either inside the data window or
/// equal to the bank-select register.
pub const fn is_block_address(address: u16) -> bool {
    address % BLOCK_SIZE as u16 == 0 && (address <= DATA_END || address == BANK_SELECT_ADDR)
}

/// Build the command block that selects `bank`
pub const fn bank_select_block(bank: u8) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    block[0] = bank;
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(PAGE_SIZE, 256);
        assert_eq!(BANK_SIZE, 32 * 1024);
        assert_eq!(IMAGE_SIZE, 131072);
        assert_eq!(FLASH_CHUNK_COUNT, 1024);
    }

    #[test]
    fn test_last_page_ends_at_data_end() {
        let last = page_address(PAGES_PER_BANK - 1);
        assert_eq!(last + ((BLOCKS_PER_PAGE - 1) * BLOCK_SIZE) as u16, DATA_END);
    }

    #[test]
    fn test_image_offset() {
        assert_eq!(image_offset(0, 0), 0);
        assert_eq!(image_offset(2, 50), 66560);
        assert_eq!(image_offset(3, 127), IMAGE_SIZE - PAGE_SIZE);
    }

    #[test]
    fn test_block_address_validation() {
        assert!(is_block_address(0x0000));
        assert!(is_block_address(0x7FE0));
        assert!(is_block_address(BANK_SELECT_ADDR));
        assert!(!is_block_address(0x0010));
        assert!(!is_block_address(0x8020));
        assert!(!is_block_address(0xFFE0));
    }

    #[test]
    fn test_bank_select_block() {
        let block = bank_select_block(3);
        assert_eq!(block[0], 3);
        assert!(block[1..].iter().all(|&b| b == 0));
    }
}
