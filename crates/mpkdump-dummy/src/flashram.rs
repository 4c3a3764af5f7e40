//! In-memory cartridge FlashRAM

use alloc::vec;
use alloc::vec::Vec;

use mpkdump_core::error::FlashRamError;
use mpkdump_core::flashram::FlashRam;
use mpkdump_core::geometry::{FLASH_CHUNK_SIZE, IMAGE_SIZE};

/// Emulated 1 Mbit FlashRAM
///
/// Erased bytes read as 0xFF and programming can only clear bits, as on the
/// real part. Every chunk write is logged.
pub struct DummyFlashRam {
    data: Vec<u8>,
    initialized: bool,
    init_calls: usize,
    erase_calls: usize,
    flush_calls: usize,
    chunk_log: Vec<(u32, usize)>,
    fail_offset: Option<u32>,
}

impl DummyFlashRam {
    /// Create an erased FlashRAM the size of one dump image
    pub fn new() -> Self {
        Self::with_size(IMAGE_SIZE)
    }

    /// Create an erased FlashRAM of `size` bytes
    pub fn with_size(size: usize) -> Self {
        Self {
            data: vec![0xFF; size],
            initialized: false,
            init_calls: 0,
            erase_calls: 0,
            flush_calls: 0,
            chunk_log: Vec::new(),
            fail_offset: None,
        }
    }

    /// Make the chunk write at `offset` report a device error
    pub fn fail_chunk_at(&mut self, offset: u32) {
        self.fail_offset = Some(offset);
    }

    /// Stored bytes; this is what the flashcart saves as the `.fla` file
    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    /// `(offset, len)` of every chunk write, in order
    pub fn chunk_log(&self) -> &[(u32, usize)] {
        &self.chunk_log
    }

    /// Number of `init` calls, i.e. write phases started
    pub fn init_calls(&self) -> usize {
        self.init_calls
    }

    /// Number of `erase_all` calls
    pub fn erase_calls(&self) -> usize {
        self.erase_calls
    }

    /// Number of `flush` calls
    pub fn flush_calls(&self) -> usize {
        self.flush_calls
    }
}

impl Default for DummyFlashRam {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashRam for DummyFlashRam {
    fn init(&mut self) -> Result<(), FlashRamError> {
        self.initialized = true;
        self.init_calls += 1;
        Ok(())
    }

    fn erase_all(&mut self) -> Result<(), FlashRamError> {
        if !self.initialized {
            return Err(FlashRamError::NotInitialized);
        }
        self.erase_calls += 1;
        self.data.fill(0xFF);
        Ok(())
    }

    fn write_chunk(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashRamError> {
        if !self.initialized {
            return Err(FlashRamError::NotInitialized);
        }
        if data.len() > FLASH_CHUNK_SIZE {
            return Err(FlashRamError::ChunkTooLarge(data.len()));
        }
        let start = offset as usize;
        if start + data.len() > self.data.len() {
            return Err(FlashRamError::OutOfBounds {
                offset,
                len: data.len(),
            });
        }

        self.chunk_log.push((offset, data.len()));
        if self.fail_offset == Some(offset) {
            return Err(FlashRamError::Device);
        }

        // Programming can only change 1 -> 0
        for (dst, &src) in self.data[start..start + data.len()].iter_mut().zip(data) {
            *dst &= src;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), FlashRamError> {
        self.flush_calls += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_requires_init() {
        let mut flash = DummyFlashRam::new();
        assert_eq!(
            flash.write_chunk(0, &[0u8; 4]),
            Err(FlashRamError::NotInitialized)
        );
        assert!(flash.chunk_log().is_empty());
    }

    #[test]
    fn test_programming_clears_bits_only() {
        let mut flash = DummyFlashRam::new();
        flash.init().unwrap();
        flash.write_chunk(0, &[0x0F]).unwrap();
        flash.write_chunk(0, &[0xF0]).unwrap();
        assert_eq!(flash.contents()[0], 0x00);

        flash.erase_all().unwrap();
        assert_eq!(flash.contents()[0], 0xFF);
    }

    #[test]
    fn test_chunk_limits() {
        let mut flash = DummyFlashRam::with_size(256);
        flash.init().unwrap();
        assert_eq!(
            flash.write_chunk(0, &[0u8; 129]),
            Err(FlashRamError::ChunkTooLarge(129))
        );
        assert_eq!(
            flash.write_chunk(200, &[0u8; 128]),
            Err(FlashRamError::OutOfBounds {
                offset: 200,
                len: 128
            })
        );
        flash.write_chunk(128, &[0u8; 128]).unwrap();
        assert_eq!(flash.chunk_log(), &[(128, 128)]);
    }
}
