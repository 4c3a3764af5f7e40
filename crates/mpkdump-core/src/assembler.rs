//! Bank/page sequencing and the partial-failure fill policy
//!
//! The assembler walks banks 0..4 and pages 0..128 strictly in ascending
//! order. The first fault ends acquisition: every byte from the fault offset
//! to the end of the image is sentinel-filled and no further transaction is
//! issued. A bank-select failure is treated as the pak going away, so it ends
//! acquisition for all remaining banks as well.

use crate::bank::BankReader;
use crate::channel::AccessoryChannel;
use crate::config::DumpConfig;
use crate::error::DumpError;
use crate::geometry::{
    image_offset, page_address, BANK_COUNT, IMAGE_SIZE, PAGES_PER_BANK, PAGE_SIZE,
};
use crate::image::DumpImage;

/// Result of an acquisition that got past the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquisition {
    /// Bytes successfully read from the pak, all at the start of the image
    pub bytes_read: usize,
    /// The fault that ended acquisition early, if any
    pub fault: Option<DumpError>,
}

impl Acquisition {
    /// Whether every bank was read without a fault
    pub fn is_complete(&self) -> bool {
        self.fault.is_none()
    }
}

/// Progress callbacks for a dump session
///
/// Purely observational; nothing reported here changes control flow.
pub trait DumpProgress {
    /// Called when acquisition starts
    fn reading(&mut self, total_bytes: usize);

    /// Called after each page is stored in the image
    fn read_progress(&mut self, bytes_read: usize);

    /// Called once when a fault truncates acquisition
    fn faulted(&mut self, error: &DumpError);

    /// Called when the FlashRAM write starts
    fn writing(&mut self, total_bytes: usize);

    /// Called after each chunk write is issued
    fn write_progress(&mut self, bytes_written: usize);

    /// Called when the session is finished
    fn complete(&mut self, acquisition: &Acquisition);
}

/// A no-op progress reporter
pub struct NoProgress;

impl DumpProgress for NoProgress {
    fn reading(&mut self, _total_bytes: usize) {}
    fn read_progress(&mut self, _bytes_read: usize) {}
    fn faulted(&mut self, _error: &DumpError) {}
    fn writing(&mut self, _total_bytes: usize) {}
    fn write_progress(&mut self, _bytes_written: usize) {}
    fn complete(&mut self, _acquisition: &Acquisition) {}
}

/// Drives page reads across all banks into a [`DumpImage`]
pub struct DumpAssembler<C> {
    channel: C,
    config: DumpConfig,
}

impl<C: AccessoryChannel> DumpAssembler<C> {
    /// Create an assembler reading through `channel`
    pub fn new(channel: C, config: DumpConfig) -> Self {
        Self { channel, config }
    }

    /// Get a reference to the channel
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Consume the assembler and return the channel
    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Read the whole pak into `image`
    ///
    /// Returns [`DumpError::AccessoryAbsent`] without touching `image` if the
    /// probe fails. Every other fault is recorded in the returned
    /// [`Acquisition`]; in that case `image` holds the bytes read before the
    /// fault followed by sentinel bytes.
    pub fn assemble<P: DumpProgress + ?Sized>(
        &mut self,
        image: &mut DumpImage,
        progress: &mut P,
    ) -> Result<Acquisition, DumpError> {
        let port = self.config.port;

        if !self.channel.probe(port) {
            log::error!("No controller pak found on {}", port);
            return Err(DumpError::AccessoryAbsent);
        }
        log::debug!("{}: pak present ({} channel)", port, self.channel.name());

        progress.reading(IMAGE_SIZE);

        for bank in 0..BANK_COUNT as u8 {
            if let Err(source) = self.channel.select_bank(port, bank) {
                let error = DumpError::BankSelectFailed { bank, source };
                return Ok(Self::truncate(image, error, progress));
            }

            for page in 0..PAGES_PER_BANK {
                let data = match BankReader::read_page(&mut self.channel, port, page_address(page))
                {
                    Ok(data) => data,
                    Err(source) => {
                        let error = DumpError::PageReadFailed {
                            bank,
                            page: page as u8,
                            source,
                        };
                        return Ok(Self::truncate(image, error, progress));
                    }
                };
                image.store_page(bank as usize, page, &data);

                let interval = self.config.progress_interval;
                if interval != 0 && page % interval == 0 {
                    log::info!("Bank {}: {}/{} pages", bank, page, PAGES_PER_BANK);
                }
                progress.read_progress(image_offset(bank as usize, page) + PAGE_SIZE);
            }
        }

        Ok(Acquisition {
            bytes_read: IMAGE_SIZE,
            fault: None,
        })
    }

    fn truncate<P: DumpProgress + ?Sized>(
        image: &mut DumpImage,
        error: DumpError,
        progress: &mut P,
    ) -> Acquisition {
        // Only AccessoryAbsent has no offset, and it never reaches here
        let offset = error.offset().unwrap_or(0);
        log::warn!(
            "{}; stopping after 0x{:05X} bytes, rest filled with 0xFF",
            error,
            offset
        );
        image.fill_from(offset);
        progress.faulted(&error);

        Acquisition {
            bytes_read: offset,
            fault: Some(error),
        }
    }
}
