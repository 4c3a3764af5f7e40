//! Error types for mpkdump-core
//!
//! All errors are `no_std` compatible and `Copy` so they can be stored in
//! the acquisition result and logged without allocation.

use core::fmt;

use crate::geometry::{image_offset, BANK_SIZE};

/// Failure of a single accessory bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The controller did not answer the transaction
    NoResponse,
    /// The controller answered but no pak is inserted
    NoAccessory,
    /// Data CRC in the response did not match the transferred data
    DataCrc {
        /// CRC computed over the data
        expected: u8,
        /// CRC reported by the pak
        found: u8,
    },
    /// A block write was not acknowledged with the matching data CRC
    WriteNotAcknowledged,
    /// Block address is unaligned or outside the addressable window
    InvalidAddress(u16),
    /// Bank index is beyond the number of banks on the pak
    InvalidBank(u8),
    /// Legacy library status code without a dedicated variant
    Status(i32),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse => write!(f, "controller did not respond"),
            Self::NoAccessory => write!(f, "no accessory inserted"),
            Self::DataCrc { expected, found } => write!(
                f,
                "data CRC mismatch: expected 0x{:02X}, found 0x{:02X}",
                expected, found
            ),
            Self::WriteNotAcknowledged => write!(f, "block write not acknowledged"),
            Self::InvalidAddress(addr) => write!(f, "invalid block address 0x{:04X}", addr),
            Self::InvalidBank(bank) => write!(f, "invalid bank {}", bank),
            Self::Status(code) => write!(f, "accessory transfer failed (rc={})", code),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

/// Acquisition-level failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpError {
    /// No compatible accessory answered the probe
    AccessoryAbsent,
    /// Selecting a bank failed; the pak is treated as gone
    BankSelectFailed {
        /// Bank that could not be selected
        bank: u8,
        /// Underlying bus failure
        source: TransportError,
    },
    /// A block read inside a page failed
    PageReadFailed {
        /// Bank being read
        bank: u8,
        /// Page within the bank
        page: u8,
        /// Underlying bus failure
        source: TransportError,
    },
}

impl DumpError {
    /// First image offset that is sentinel-filled because of this fault
    ///
    /// Returns `None` for [`DumpError::AccessoryAbsent`], which produces no
    /// image at all.
    pub fn offset(&self) -> Option<usize> {
        match *self {
            Self::AccessoryAbsent => None,
            Self::BankSelectFailed { bank, .. } => Some(bank as usize * BANK_SIZE),
            Self::PageReadFailed { bank, page, .. } => {
                Some(image_offset(bank as usize, page as usize))
            }
        }
    }

    /// The bus failure behind this error, if any
    pub fn transport(&self) -> Option<TransportError> {
        match *self {
            Self::AccessoryAbsent => None,
            Self::BankSelectFailed { source, .. } | Self::PageReadFailed { source, .. } => {
                Some(source)
            }
        }
    }
}

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessoryAbsent => write!(f, "no controller pak found"),
            Self::BankSelectFailed { bank, source } => {
                write!(f, "bank {} select failed: {}", bank, source)
            }
            Self::PageReadFailed { bank, page, source } => {
                write!(f, "bank {} page {} unreadable: {}", bank, page, source)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DumpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::AccessoryAbsent => None,
            Self::BankSelectFailed { source, .. } | Self::PageReadFailed { source, .. } => {
                Some(source)
            }
        }
    }
}

/// FlashRAM target failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashRamError {
    /// A write was issued before `init`
    NotInitialized,
    /// Chunk extends past the end of the device
    OutOfBounds {
        /// Chunk start offset
        offset: u32,
        /// Chunk length in bytes
        len: usize,
    },
    /// Chunk is larger than the device write unit
    ChunkTooLarge(usize),
    /// The device reported a failure
    Device,
}

impl fmt::Display for FlashRamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "FlashRAM not initialized"),
            Self::OutOfBounds { offset, len } => write!(
                f,
                "FlashRAM write of {} bytes at 0x{:05X} out of bounds",
                len, offset
            ),
            Self::ChunkTooLarge(len) => write!(f, "FlashRAM chunk of {} bytes too large", len),
            Self::Device => write!(f, "FlashRAM device error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FlashRamError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_offsets() {
        let err = DumpError::PageReadFailed {
            bank: 2,
            page: 50,
            source: TransportError::NoResponse,
        };
        assert_eq!(err.offset(), Some(66560));

        let err = DumpError::BankSelectFailed {
            bank: 1,
            source: TransportError::NoAccessory,
        };
        assert_eq!(err.offset(), Some(32768));
        assert_eq!(err.transport(), Some(TransportError::NoAccessory));

        assert_eq!(DumpError::AccessoryAbsent.offset(), None);
        assert_eq!(DumpError::AccessoryAbsent.transport(), None);
    }
}
