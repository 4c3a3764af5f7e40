//! mpkdump-core - Controller pak acquisition pipeline
//!
//! This crate reads the full contents of a 1 Mbit multi-bank controller pak
//! (4 banks of 32 KiB) into one 128 KiB [`DumpImage`] and streams that image
//! to cartridge FlashRAM. It is `no_std` so the same code runs on the console
//! and in host-side tests.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation (boxed images)
//!
//! # Example
//!
//! ```ignore
//! use mpkdump_core::{channel::LegacyChannel, run, DumpConfig, DumpImage, NoProgress};
//!
//! let mut channel = LegacyChannel::new(bus);
//! let mut image = DumpImage::boxed();
//! match run(&mut channel, &mut flashram, &mut image, &DumpConfig::default(), &mut NoProgress) {
//!     Completion::Halted => println!("no pak"),
//!     Completion::Written { acquisition, .. } => println!("{} bytes read", acquisition.bytes_read),
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod assembler;
pub mod bank;
pub mod channel;
pub mod config;
pub mod error;
pub mod flashram;
pub mod geometry;
pub mod image;
pub mod session;

pub use assembler::{Acquisition, DumpAssembler, DumpProgress, NoProgress};
pub use bank::BankReader;
pub use channel::{AccessoryChannel, Port};
pub use config::DumpConfig;
pub use error::{DumpError, FlashRamError, TransportError};
pub use flashram::{FlashRam, FlashWriter, WriteStats};
pub use image::DumpImage;
pub use session::{run, Completion};
