//! mpkdump-dummy - In-memory controller pak and FlashRAM emulator
//!
//! This crate provides a [`DummyPak`] that emulates a 1 Mbit multi-bank
//! controller pak behind both wire variants, and a [`DummyFlashRam`] that
//! records what the write phase stores. It's useful for testing and
//! development without a console.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod flashram;
mod pak;

pub use flashram::DummyFlashRam;
pub use pak::{
    pattern_byte, BusEvent, BusStats, DummyPak, DummyPakConfig, Fault, FixtureError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use mpkdump_core::channel::{LegacyChannel, TransferChannel};
    use mpkdump_core::geometry::{
        image_offset, BANK_SIZE, FLASH_CHUNK_COUNT, FLASH_CHUNK_SIZE, IMAGE_SIZE, SENTINEL,
    };
    use mpkdump_core::{run, Completion, DumpConfig, DumpError, DumpImage, NoProgress};

    #[derive(Debug, Clone, Copy)]
    enum Variant {
        Legacy,
        Transfer,
    }

    const VARIANTS: [Variant; 2] = [Variant::Legacy, Variant::Transfer];

    fn dump(
        variant: Variant,
        pak: &mut DummyPak,
        flash: &mut DummyFlashRam,
        image: &mut DumpImage,
    ) -> Completion {
        let config = DumpConfig::default();
        match variant {
            Variant::Legacy => run(LegacyChannel::new(pak), flash, image, &config, &mut NoProgress),
            Variant::Transfer => {
                run(TransferChannel::new(pak), flash, image, &config, &mut NoProgress)
            }
        }
    }

    fn assert_truncated_at(image: &[u8], fixture: &[u8], boundary: usize) {
        assert_eq!(image.len(), IMAGE_SIZE);
        assert_eq!(&image[..boundary], &fixture[..boundary]);
        assert!(
            image[boundary..].iter().all(|&b| b == SENTINEL),
            "non-sentinel byte after 0x{:05X}",
            boundary
        );
    }

    #[test]
    fn test_fault_free_dump_matches_fixture() {
        for variant in VARIANTS {
            let mut pak = DummyPak::new(DummyPakConfig::default());
            let mut flash = DummyFlashRam::new();
            let mut image = DumpImage::new();

            let completion = dump(variant, &mut pak, &mut flash, &mut image);
            let acquisition = completion.acquisition().copied().unwrap();
            assert!(acquisition.is_complete(), "{:?}", variant);
            assert_eq!(image.as_bytes(), pak.contents(), "{:?}", variant);
            assert_eq!(flash.contents(), pak.contents(), "{:?}", variant);
            assert_eq!(pak.stats().bank_selects, 4);
        }
    }

    #[test]
    fn test_page_fault_end_to_end() {
        for variant in VARIANTS {
            let mut pak = DummyPak::new(DummyPakConfig::default().fail_page(2, 50));
            let mut flash = DummyFlashRam::new();
            let mut image = DumpImage::new();

            let completion = dump(variant, &mut pak, &mut flash, &mut image);
            let acquisition = completion.acquisition().copied().unwrap();
            assert_eq!(acquisition.bytes_read, 66560);
            assert!(matches!(
                acquisition.fault,
                Some(DumpError::PageReadFailed {
                    bank: 2,
                    page: 50,
                    ..
                })
            ));

            assert_truncated_at(image.as_bytes(), pak.contents(), 66560);
            assert_eq!(flash.contents(), image.as_bytes());
            assert_eq!(flash.init_calls(), 1, "write phase must run exactly once");

            // Last transaction is the failing read; nothing was issued after it
            assert_eq!(
                pak.trace().last(),
                Some(&BusEvent::Read {
                    bank: 2,
                    address: 50 * 256
                })
            );
        }
    }

    #[test]
    fn test_fault_inside_page_discards_whole_page() {
        for variant in VARIANTS {
            let mut pak =
                DummyPak::new(DummyPakConfig::default().with_fault(Fault::block(1, 7, 5)));
            let mut flash = DummyFlashRam::new();
            let mut image = DumpImage::new();

            dump(variant, &mut pak, &mut flash, &mut image);
            assert_truncated_at(image.as_bytes(), pak.contents(), image_offset(1, 7));
        }
    }

    #[test]
    fn test_bank_select_fault_end_to_end() {
        for variant in VARIANTS {
            let mut pak = DummyPak::new(DummyPakConfig::default().fail_bank_select(3));
            let mut flash = DummyFlashRam::new();
            let mut image = DumpImage::new();

            let completion = dump(variant, &mut pak, &mut flash, &mut image);
            let acquisition = completion.acquisition().copied().unwrap();
            assert!(matches!(
                acquisition.fault,
                Some(DumpError::BankSelectFailed { bank: 3, .. })
            ));
            assert_truncated_at(image.as_bytes(), pak.contents(), 3 * BANK_SIZE);
            assert_eq!(pak.trace().last(), Some(&BusEvent::BankSelect(3)));
            assert_eq!(flash.init_calls(), 1);
        }
    }

    #[test]
    fn test_absent_pak_produces_nothing() {
        for variant in VARIANTS {
            let mut pak = DummyPak::new(DummyPakConfig::absent());
            let mut flash = DummyFlashRam::new();
            let mut image = DumpImage::new();

            let completion = dump(variant, &mut pak, &mut flash, &mut image);
            assert_eq!(completion, Completion::Halted);
            assert_eq!(pak.stats().bank_selects, 0);
            assert_eq!(flash.init_calls(), 0);
            assert!(flash.chunk_log().is_empty());
        }
        // Legacy probes with init, transfer with a label read
        let mut pak = DummyPak::new(DummyPakConfig::absent());
        dump(
            Variant::Legacy,
            &mut pak,
            &mut DummyFlashRam::new(),
            &mut DumpImage::new(),
        );
        assert_eq!(pak.trace(), &[BusEvent::Init]);

        let mut pak = DummyPak::new(DummyPakConfig::absent());
        dump(
            Variant::Transfer,
            &mut pak,
            &mut DummyFlashRam::new(),
            &mut DumpImage::new(),
        );
        assert_eq!(
            pak.trace(),
            &[BusEvent::Read {
                bank: 0,
                address: 0
            }]
        );
    }

    #[test]
    fn test_write_phase_chunking() {
        for variant in VARIANTS {
            let mut pak = DummyPak::new(DummyPakConfig::default().fail_page(0, 3));
            let mut flash = DummyFlashRam::new();
            let mut image = DumpImage::new();

            let completion = dump(variant, &mut pak, &mut flash, &mut image);
            let Completion::Written { write, .. } = completion else {
                panic!("expected write phase");
            };
            assert_eq!(write.chunks_written, FLASH_CHUNK_COUNT);

            let log = flash.chunk_log();
            assert_eq!(log.len(), 1024);
            for (i, &(offset, len)) in log.iter().enumerate() {
                assert_eq!(offset as usize, i * FLASH_CHUNK_SIZE);
                assert_eq!(len, FLASH_CHUNK_SIZE);
            }
            assert_eq!(flash.erase_calls(), 1);
            assert_eq!(flash.flush_calls(), 1);
        }
    }

    #[test]
    fn test_flash_chunk_failure_keeps_writing() {
        for variant in VARIANTS {
            let mut pak = DummyPak::new(DummyPakConfig::default());
            let mut flash = DummyFlashRam::new();
            flash.fail_chunk_at((100 * FLASH_CHUNK_SIZE) as u32);
            let mut image = DumpImage::new();

            let completion = dump(variant, &mut pak, &mut flash, &mut image);
            let Completion::Written { acquisition, write } = completion else {
                panic!("expected write phase");
            };
            assert!(acquisition.is_complete());
            assert_eq!(write.chunks_failed, 1);
            assert_eq!(write.setup_failures, 0);
            assert_eq!(flash.chunk_log().len(), 1024);
            assert_eq!(flash.flush_calls(), 1);

            // Only the failed chunk is left erased
            let failed = 100 * FLASH_CHUNK_SIZE..101 * FLASH_CHUNK_SIZE;
            assert!(flash.contents()[failed.clone()].iter().all(|&b| b == 0xFF));
            assert_eq!(&flash.contents()[..failed.start], &pak.contents()[..failed.start]);
            assert_eq!(&flash.contents()[failed.end..], &pak.contents()[failed.end..]);
        }
    }

    #[test]
    fn test_bank_reads_follow_selection() {
        let mut pak = DummyPak::new(DummyPakConfig::default());
        dump(
            Variant::Transfer,
            &mut pak,
            &mut DummyFlashRam::new(),
            &mut DumpImage::new(),
        );

        // Label probe, then per bank: select followed by 1024 ascending reads
        let trace = &pak.trace()[1..];
        assert_eq!(trace.len(), 4 * (1 + 1024));
        for (bank, events) in trace.chunks(1025).enumerate() {
            assert_eq!(events[0], BusEvent::BankSelect(bank as u8));
            for (i, event) in events[1..].iter().enumerate() {
                assert_eq!(
                    *event,
                    BusEvent::Read {
                        bank: bank as u8,
                        address: (i * 32) as u16
                    }
                );
            }
        }
    }

    #[test]
    fn test_repeat_dump_is_identical() {
        for variant in VARIANTS {
            let mut pak = DummyPak::new(DummyPakConfig::default());
            let mut first = DumpImage::new();
            let mut second = DumpImage::new();

            dump(variant, &mut pak, &mut DummyFlashRam::new(), &mut first);
            dump(variant, &mut pak, &mut DummyFlashRam::new(), &mut second);
            assert!(first == second);
        }
    }

    #[test]
    fn test_erased_pak_dump_is_all_sentinel() {
        // A fully erased pak is indistinguishable from a truncated one by content
        let mut pak = DummyPak::erased(DummyPakConfig::default());
        let mut image = DumpImage::new();
        let completion = dump(
            Variant::Legacy,
            &mut pak,
            &mut DummyFlashRam::new(),
            &mut image,
        );
        assert!(completion.acquisition().unwrap().is_complete());
        assert_eq!(image.trailing_sentinel_start(), Some(0));
    }
}
