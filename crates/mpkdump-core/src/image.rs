//! The assembled 128 KiB dump

use crate::geometry::{image_offset, Page, BANK_COUNT, BANK_SIZE, IMAGE_SIZE, PAGE_SIZE, SENTINEL};

/// A full pak image: Bank0 ‖ Bank1 ‖ Bank2 ‖ Bank3
///
/// The image is always [`IMAGE_SIZE`] bytes. It starts out sentinel-filled,
/// so bytes that were never read are `0xFF` rather than uninitialized.
#[derive(Clone, PartialEq, Eq)]
pub struct DumpImage {
    bytes: [u8; IMAGE_SIZE],
}

impl DumpImage {
    /// Create a sentinel-filled image
    pub const fn new() -> Self {
        Self {
            bytes: [SENTINEL; IMAGE_SIZE],
        }
    }

    /// Create a sentinel-filled image on the heap
    #[cfg(feature = "alloc")]
    pub fn boxed() -> alloc::boxed::Box<Self> {
        alloc::boxed::Box::new(Self::new())
    }

    /// Raw image bytes in dump layout
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The 32 KiB slice belonging to `bank`, or `None` past [`BANK_COUNT`]
    pub fn bank(&self, bank: usize) -> Option<&[u8]> {
        if bank >= BANK_COUNT {
            return None;
        }
        Some(&self.bytes[bank * BANK_SIZE..(bank + 1) * BANK_SIZE])
    }

    /// Start of the trailing run of sentinel bytes, if the image ends in one
    ///
    /// A truncated dump ends in a run of `0xFF` starting at the fault offset,
    /// but a fully read pak may end in erased bytes too; this is only a
    /// coarse signal.
    pub fn trailing_sentinel_start(&self) -> Option<usize> {
        let tail = self.bytes.iter().rev().take_while(|&&b| b == SENTINEL).count();
        (tail > 0).then(|| IMAGE_SIZE - tail)
    }

    pub(crate) fn store_page(&mut self, bank: usize, page: usize, data: &Page) {
        let offset = image_offset(bank, page);
        self.bytes[offset..offset + PAGE_SIZE].copy_from_slice(data);
    }

    /// Sentinel-fill everything from `offset` to the end
    pub(crate) fn fill_from(&mut self, offset: usize) {
        self.bytes[offset..].fill(SENTINEL);
    }
}

impl Default for DumpImage {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for DumpImage {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl core::fmt::Debug for DumpImage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DumpImage")
            .field("len", &self.bytes.len())
            .field("trailing_sentinel_start", &self.trailing_sentinel_start())
            .finish()
    }
}
