//! Joybus accessory framing
//!
//! Controller accessories are addressed through two Joybus commands. The
//! 16-bit address word sent with each command carries the block address in
//! its upper 11 bits and a 5-bit CRC of those bits in the low 5 bits. Every
//! 32-byte data payload is protected by an 8-bit CRC returned by the pak.

use crate::geometry::{Block, BLOCK_SIZE};

/// Read 32 bytes from the controller accessory
pub const CMD_ACCESSORY_READ: u8 = 0x02;
/// Write 32 bytes to the controller accessory
pub const CMD_ACCESSORY_WRITE: u8 = 0x03;

/// TX length of an accessory read: command + address word
pub const READ_TX_LEN: usize = 3;
/// RX length of an accessory read: data + data CRC
pub const READ_RX_LEN: usize = BLOCK_SIZE + 1;
/// TX length of an accessory write: command + address word + data
pub const WRITE_TX_LEN: usize = 3 + BLOCK_SIZE;
/// RX length of an accessory write: data CRC
pub const WRITE_RX_LEN: usize = 1;

/// Mask selecting the address bits of an address word
pub const ADDRESS_MASK: u16 = !0x1F;

const ADDRESS_CRC_TABLE: [u16; 16] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x15, 0x1F, 0x0B, 0x16, 0x19, 0x07, 0x0E, 0x1C, 0x0D, 0x1A, 0x01,
];

const DATA_CRC_POLY: u8 = 0x85;

/// Build the address word for `address`: aligned address bits plus CRC
pub fn address_word(address: u16) -> u16 {
    let address = address & ADDRESS_MASK;
    let crc = (5..16)
        .filter(|&bit| address & (1u16 << bit) != 0)
        .fold(0u16, |crc, bit| crc ^ ADDRESS_CRC_TABLE[bit]);
    address | (crc & 0x1F)
}

/// Split an address word back into the address and check its CRC
pub fn decode_address_word(word: u16) -> Option<u16> {
    let address = word & ADDRESS_MASK;
    (address_word(address) == word).then_some(address)
}

/// CRC-8 (poly 0x85, MSB first) over a data block followed by 8 zero bits
pub fn data_crc(data: &Block) -> u8 {
    let mut crc: u8 = 0;
    for i in 0..=BLOCK_SIZE {
        for bit in (0..8).rev() {
            let feedback = if crc & 0x80 != 0 { DATA_CRC_POLY } else { 0 };
            crc <<= 1;
            if i < BLOCK_SIZE && data[i] & (1 << bit) != 0 {
                crc |= 1;
            }
            crc ^= feedback;
        }
    }
    crc
}

/// Encode an accessory read request
pub fn encode_read(address: u16) -> [u8; READ_TX_LEN] {
    let [hi, lo] = address_word(address).to_be_bytes();
    [CMD_ACCESSORY_READ, hi, lo]
}

/// Encode an accessory write request
pub fn encode_write(address: u16, data: &Block) -> [u8; WRITE_TX_LEN] {
    let mut tx = [0u8; WRITE_TX_LEN];
    let [hi, lo] = address_word(address).to_be_bytes();
    tx[0] = CMD_ACCESSORY_WRITE;
    tx[1] = hi;
    tx[2] = lo;
    tx[3..].copy_from_slice(data);
    tx
}

/// How a returned data CRC relates to the expected one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcCheck {
    /// CRC matches the data
    Valid,
    /// CRC is the bitwise inverse of the expected value; no pak is inserted
    NoPak,
    /// Anything else
    Mismatch,
}

/// Compare a CRC returned by the pak against the CRC of `data`
pub fn check_crc(data: &Block, found: u8) -> CrcCheck {
    let expected = data_crc(data);
    if found == expected {
        CrcCheck::Valid
    } else if found == !expected {
        CrcCheck::NoPak
    } else {
        CrcCheck::Mismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_word() {
        assert_eq!(address_word(0x0000), 0x0000);
        assert_eq!(address_word(0x0020), 0x0035);
        assert_eq!(address_word(0x0100), 0x0116);
        assert_eq!(address_word(0x0300), 0x030F);
        assert_eq!(address_word(0x7FE0), 0x7FEC);
        assert_eq!(address_word(0x8000), 0x8001);
    }

    #[test]
    fn test_decode_address_word() {
        assert_eq!(decode_address_word(0x8001), Some(0x8000));
        assert_eq!(decode_address_word(0x7FEC), Some(0x7FE0));
        assert_eq!(decode_address_word(0x8000), None);
    }

    #[test]
    fn test_data_crc() {
        assert_eq!(data_crc(&[0x00; 32]), 0x00);
        assert_eq!(data_crc(&[0xFF; 32]), 0x0A);

        let mut block = [0u8; 32];
        block[0] = 0x01;
        assert_eq!(data_crc(&block), 0x04);
        block[0] = 0x02;
        assert_eq!(data_crc(&block), 0x08);

        let mut counting = [0u8; 32];
        for (i, b) in counting.iter_mut().enumerate() {
            *b = i as u8;
        }
        assert_eq!(data_crc(&counting), 0x33);
    }

    #[test]
    fn test_check_crc() {
        let block = [0xFF; 32];
        assert_eq!(check_crc(&block, 0x0A), CrcCheck::Valid);
        assert_eq!(check_crc(&block, !0x0A), CrcCheck::NoPak);
        assert_eq!(check_crc(&block, 0x0B), CrcCheck::Mismatch);
    }

    #[test]
    fn test_encode_frames() {
        assert_eq!(encode_read(0x0020), [CMD_ACCESSORY_READ, 0x00, 0x35]);

        let tx = encode_write(0x8000, &[0x02; 32]);
        assert_eq!(&tx[..3], &[CMD_ACCESSORY_WRITE, 0x80, 0x01]);
        assert!(tx[3..].iter().all(|&b| b == 0x02));
    }
}
