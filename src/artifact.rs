//! Save-file materialization
//!
//! On hardware the flashcart copies FlashRAM to a `.fla` file when the
//! console is reset. The host build does the same from the emulated
//! FlashRAM: the file is the raw 131072-byte image, no header or footer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use mpkdump_core::geometry::IMAGE_SIZE;
use mpkdump_dummy::DummyFlashRam;

use crate::error::HostError;

/// Write the FlashRAM contents to `path`
pub fn materialize(flash: &DummyFlashRam, path: &Path) -> Result<(), HostError> {
    let data = flash.contents();
    if data.len() != IMAGE_SIZE {
        return Err(HostError::ArtifactSize {
            expected: IMAGE_SIZE,
            found: data.len(),
        });
    }

    let io_err = |source| HostError::Artifact {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(io_err)?;
    file.write_all(data).map_err(io_err)?;
    log::debug!("Saved {} bytes to {}", data.len(), path.display());
    Ok(())
}
