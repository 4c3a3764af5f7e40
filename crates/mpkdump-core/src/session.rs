//! One complete dump session: probe, acquire, write
//!
//! The console program ends in an idle loop waiting for reset. Here the
//! session instead returns a [`Completion`] so the caller decides what
//! "done" means.

use crate::assembler::{Acquisition, DumpAssembler, DumpProgress};
use crate::channel::AccessoryChannel;
use crate::config::DumpConfig;
use crate::error::DumpError;
use crate::flashram::{FlashRam, FlashWriter, WriteStats};
use crate::geometry::IMAGE_SIZE;
use crate::image::DumpImage;

/// Terminal state of a dump session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// No pak answered the probe; nothing was read and nothing was written
    Halted,
    /// The image was handed to FlashRAM
    Written {
        /// How far acquisition got
        acquisition: Acquisition,
        /// What the write phase issued
        write: WriteStats,
    },
}

impl Completion {
    /// The acquisition result, if the session got past the probe
    pub fn acquisition(&self) -> Option<&Acquisition> {
        match self {
            Self::Halted => None,
            Self::Written { acquisition, .. } => Some(acquisition),
        }
    }
}

/// Run a full dump session
///
/// `image` is exclusively borrowed by the assembler during acquisition and
/// only read by the writer afterwards. On [`Completion::Halted`] neither
/// `image` nor `flash` is touched.
pub fn run<C, F, P>(
    channel: C,
    flash: F,
    image: &mut DumpImage,
    config: &DumpConfig,
    progress: &mut P,
) -> Completion
where
    C: AccessoryChannel,
    F: FlashRam,
    P: DumpProgress + ?Sized,
{
    log::info!("MPK -> FlashRAM dump start ({} channel)", channel.name());

    let mut assembler = DumpAssembler::new(channel, *config);
    let acquisition = match assembler.assemble(image, progress) {
        Ok(acquisition) => acquisition,
        Err(DumpError::AccessoryAbsent) => return Completion::Halted,
        Err(e) => {
            // assemble reports every other fault through Acquisition
            log::error!("Unexpected acquisition error: {}", e);
            return Completion::Halted;
        }
    };

    let image: &DumpImage = image;
    log::info!("Writing {} KiB to FlashRAM...", IMAGE_SIZE / 1024);
    let write = FlashWriter::new(flash).write(image, progress);
    log::info!("Done. Reset the console so the flashcart stores the .fla file");

    progress.complete(&acquisition);
    Completion::Written { acquisition, write }
}
