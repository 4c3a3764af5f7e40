//! FlashRAM write phase
//!
//! The assembled image is streamed to cartridge FlashRAM in 128-byte chunks
//! with a cursor running from 0 to the end of the buffer. Chunk boundaries
//! are a property of the medium only. The write target turns the stored
//! bytes into a save file on its own when the console is reset; nothing is
//! read back here.

use crate::assembler::DumpProgress;
use crate::error::FlashRamError;
use crate::geometry::FLASH_CHUNK_SIZE;
use crate::image::DumpImage;

/// Cartridge FlashRAM operations
pub trait FlashRam {
    /// Prepare the device for writing
    fn init(&mut self) -> Result<(), FlashRamError>;

    /// Erase the whole device; devices without an explicit erase keep the default
    fn erase_all(&mut self) -> Result<(), FlashRamError> {
        Ok(())
    }

    /// Program at most [`FLASH_CHUNK_SIZE`] bytes at `offset`
    fn write_chunk(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashRamError>;

    /// Commit buffered writes; devices without a write buffer keep the default
    fn flush(&mut self) -> Result<(), FlashRamError> {
        Ok(())
    }
}

impl<F: FlashRam + ?Sized> FlashRam for &mut F {
    fn init(&mut self) -> Result<(), FlashRamError> {
        (**self).init()
    }

    fn erase_all(&mut self) -> Result<(), FlashRamError> {
        (**self).erase_all()
    }

    fn write_chunk(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashRamError> {
        (**self).write_chunk(offset, data)
    }

    fn flush(&mut self) -> Result<(), FlashRamError> {
        (**self).flush()
    }
}

/// Statistics about a write phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Chunk writes issued
    pub chunks_written: usize,
    /// Bytes covered by the issued chunks
    pub bytes_written: usize,
    /// Chunk writes the device reported as failed
    pub chunks_failed: usize,
    /// Failed init/erase/flush steps
    pub setup_failures: usize,
}

/// Streams a buffer to a [`FlashRam`] device
pub struct FlashWriter<F> {
    flash: F,
}

impl<F: FlashRam> FlashWriter<F> {
    /// Create a writer for `flash`
    pub fn new(flash: F) -> Self {
        Self { flash }
    }

    /// Get a reference to the device
    pub fn flash(&self) -> &F {
        &self.flash
    }

    /// Consume the writer and return the device
    pub fn into_inner(self) -> F {
        self.flash
    }

    /// Write an assembled image
    pub fn write<P: DumpProgress + ?Sized>(
        &mut self,
        image: &DumpImage,
        progress: &mut P,
    ) -> WriteStats {
        self.write_buffer(image.as_bytes(), progress)
    }

    /// Write `data` from offset 0 in sequential chunks
    ///
    /// Device failures are logged and counted but never stop the phase:
    /// every chunk is issued exactly once.
    pub fn write_buffer<P: DumpProgress + ?Sized>(
        &mut self,
        data: &[u8],
        progress: &mut P,
    ) -> WriteStats {
        let mut stats = WriteStats::default();

        if let Err(e) = self.flash.init() {
            log::warn!("FlashRAM init failed: {}", e);
            stats.setup_failures += 1;
        }
        if let Err(e) = self.flash.erase_all() {
            log::warn!("FlashRAM erase failed: {}", e);
            stats.setup_failures += 1;
        }

        progress.writing(data.len());

        let mut written = 0usize;
        for chunk in data.chunks(FLASH_CHUNK_SIZE) {
            log::trace!("FlashRAM chunk 0x{:05X}+{}", written, chunk.len());
            if let Err(e) = self.flash.write_chunk(written as u32, chunk) {
                log::warn!("FlashRAM write at 0x{:05X} failed: {}", written, e);
                stats.chunks_failed += 1;
            }
            written += chunk.len();
            stats.chunks_written += 1;
            progress.write_progress(written);
        }
        stats.bytes_written = written;

        if let Err(e) = self.flash.flush() {
            log::warn!("FlashRAM flush failed: {}", e);
            stats.setup_failures += 1;
        }

        stats
    }
}
