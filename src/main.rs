//! mpkdump - Controller pak to FlashRAM dumper
//!
//! Host build of the dumper. It runs the same session the console program
//! runs (probe, read 4 banks, write 128 KiB to FlashRAM) against the
//! in-memory pak and FlashRAM from `mpkdump-dummy`, then writes the FlashRAM
//! contents to `mpk_dump_fla.fla` the way a flashcart does on reset.
//!
//! # Wire variant
//!
//! The pak protocol is chosen at build time:
//! - `legacy` (default) - legacy block calls with an init probe
//! - `transfer` - raw Joybus accessory frames with a label-read probe
//!
//! If both features are enabled, `transfer` is used.

mod artifact;
mod error;
mod progress;

use std::path::Path;

use mpkdump_core::{run, Completion, DumpConfig, DumpImage};
use mpkdump_dummy::{DummyFlashRam, DummyPak, DummyPakConfig};

use error::HostError;
use progress::BarProgress;

/// File name the flashcart gives the saved FlashRAM
const ARTIFACT_NAME: &str = "mpk_dump_fla.fla";

#[cfg(feature = "transfer")]
fn open_channel(pak: &mut DummyPak) -> mpkdump_core::channel::TransferChannel<&mut DummyPak> {
    mpkdump_core::channel::TransferChannel::new(pak)
}

#[cfg(not(any(feature = "legacy", feature = "transfer")))]
compile_error!("enable the `legacy` or `transfer` feature to pick a wire variant");

#[cfg(all(feature = "legacy", not(feature = "transfer")))]
fn open_channel(pak: &mut DummyPak) -> mpkdump_core::channel::LegacyChannel<&mut DummyPak> {
    mpkdump_core::channel::LegacyChannel::new(pak)
}

fn main() -> Result<(), HostError> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DumpConfig::default();
    let mut pak = DummyPak::new(DummyPakConfig::default());
    let mut flash = DummyFlashRam::new();
    let mut image = DumpImage::boxed();
    let mut progress = BarProgress::new();

    let completion = run(
        open_channel(&mut pak),
        &mut flash,
        &mut image,
        &config,
        &mut progress,
    );

    match completion {
        Completion::Halted => {
            // The console would idle here until reset; there is nothing to save
            log::error!("No controller pak on {}, nothing written", config.port);
        }
        Completion::Written { acquisition, write } => {
            match acquisition.fault {
                None => log::info!("Read all {} bytes", acquisition.bytes_read),
                Some(fault) => log::warn!(
                    "Dump truncated at 0x{:05X}: {}",
                    acquisition.bytes_read,
                    fault
                ),
            }
            if write.chunks_failed > 0 || write.setup_failures > 0 {
                log::warn!(
                    "FlashRAM reported {} failed chunks, {} failed setup steps",
                    write.chunks_failed,
                    write.setup_failures
                );
            }

            let path = Path::new(ARTIFACT_NAME);
            artifact::materialize(&flash, path)?;
            println!("Wrote {} bytes to {:?}", flash.contents().len(), path);
        }
    }

    Ok(())
}
