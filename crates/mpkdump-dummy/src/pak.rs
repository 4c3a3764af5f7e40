//! In-memory 1 Mbit controller pak

use alloc::vec;
use alloc::vec::Vec;

use mpkdump_core::channel::joybus::{
    self, CMD_ACCESSORY_READ, CMD_ACCESSORY_WRITE, READ_RX_LEN, READ_TX_LEN, WRITE_RX_LEN,
    WRITE_TX_LEN,
};
use mpkdump_core::channel::{status, JoybusBus, MempakBus, Port};
use mpkdump_core::error::TransportError;
use mpkdump_core::geometry::{
    page_address, Block, BANK_COUNT, BANK_SELECT_ADDR, BANK_SIZE, BLOCK_SIZE, DATA_END,
    IMAGE_SIZE,
};

#[cfg(feature = "std")]
use thiserror::Error;

/// Errors building a pak fixture
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Error))]
pub enum FixtureError {
    /// Fixture contents are not exactly one image long
    #[cfg_attr(
        feature = "std",
        error("fixture is {found} bytes, expected {expected}")
    )]
    WrongSize {
        /// Required length
        expected: usize,
        /// Provided length
        found: usize,
    },
}

/// A single injected failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Writing the bank-select register for `bank` gets no answer
    BankSelect {
        /// Bank whose selection fails
        bank: u8,
    },
    /// Reading the block at `address` in `bank` returns corrupt data
    BlockRead {
        /// Bank containing the block
        bank: u8,
        /// Block address inside the data window
        address: u16,
    },
}

impl Fault {
    /// Fail the first block of `page` in `bank`
    pub fn page(bank: u8, page: usize) -> Self {
        Self::block(bank, page, 0)
    }

    /// Fail block `block` (0..8) of `page` in `bank`
    pub fn block(bank: u8, page: usize, block: usize) -> Self {
        Self::BlockRead {
            bank,
            address: page_address(page) + (block * BLOCK_SIZE) as u16,
        }
    }
}

/// Configuration for the dummy pak
#[derive(Debug, Clone, Default)]
pub struct DummyPakConfig {
    /// Pak not inserted
    pub absent: bool,
    /// Optional injected failure
    pub fault: Option<Fault>,
}

impl DummyPakConfig {
    /// A pak that is not inserted
    pub fn absent() -> Self {
        Self {
            absent: true,
            fault: None,
        }
    }

    /// Inject a failure at one page
    pub fn fail_page(mut self, bank: u8, page: usize) -> Self {
        self.fault = Some(Fault::page(bank, page));
        self
    }

    /// Inject a failure when selecting `bank`
    pub fn fail_bank_select(mut self, bank: u8) -> Self {
        self.fault = Some(Fault::BankSelect { bank });
        self
    }

    /// Inject an arbitrary failure
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }
}

/// Counters for bus traffic seen by the pak
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Legacy init calls
    pub inits: usize,
    /// Block reads, including failed ones
    pub block_reads: usize,
    /// Block writes to the data window
    pub block_writes: usize,
    /// Writes to the bank-select register
    pub bank_selects: usize,
}

/// One bus transaction, in the order the pak saw them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// Legacy init
    Init,
    /// Bank-select register write
    BankSelect(u8),
    /// Block read
    Read {
        /// Bank selected at the time
        bank: u8,
        /// Block address
        address: u16,
    },
    /// Data window write
    Write {
        /// Bank selected at the time
        bank: u8,
        /// Block address
        address: u16,
    },
}

/// Why an emulated transaction failed
enum Failure {
    NotInserted,
    BadData(Block),
    NoAnswer,
}

/// Deterministic fixture byte at image `offset`
pub fn pattern_byte(offset: usize) -> u8 {
    let bank = (offset / BANK_SIZE) as u8;
    (offset as u8) ^ ((offset >> 8) as u8).rotate_left(3) ^ bank.wrapping_mul(0x47)
}

/// Emulated 4-bank controller pak
///
/// Speaks both the legacy block calls ([`MempakBus`]) and raw Joybus
/// accessory frames ([`JoybusBus`]).
pub struct DummyPak {
    config: DummyPakConfig,
    data: Vec<u8>,
    bank: u8,
    stats: BusStats,
    trace: Vec<BusEvent>,
}

impl DummyPak {
    /// Create a pak filled with [`pattern_byte`] contents
    pub fn new(config: DummyPakConfig) -> Self {
        let data = (0..IMAGE_SIZE).map(pattern_byte).collect();
        Self::from_vec(config, data)
    }

    /// Create a pak holding `contents`, which must be exactly one image long
    pub fn with_contents(config: DummyPakConfig, contents: &[u8]) -> Result<Self, FixtureError> {
        if contents.len() != IMAGE_SIZE {
            return Err(FixtureError::WrongSize {
                expected: IMAGE_SIZE,
                found: contents.len(),
            });
        }
        Ok(Self::from_vec(config, contents.to_vec()))
    }

    /// Create an erased pak (all 0xFF)
    pub fn erased(config: DummyPakConfig) -> Self {
        Self::from_vec(config, vec![0xFF; IMAGE_SIZE])
    }

    fn from_vec(config: DummyPakConfig, data: Vec<u8>) -> Self {
        Self {
            config,
            data,
            bank: 0,
            stats: BusStats::default(),
            trace: Vec::new(),
        }
    }

    /// Full pak contents in dump layout
    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    /// Currently selected bank
    pub fn selected_bank(&self) -> u8 {
        self.bank
    }

    /// Bus traffic counters
    pub fn stats(&self) -> BusStats {
        self.stats
    }

    /// Ordered transaction trace
    pub fn trace(&self) -> &[BusEvent] {
        &self.trace
    }

    /// Insert or remove the pak
    pub fn set_absent(&mut self, absent: bool) {
        self.config.absent = absent;
    }

    /// Replace the injected failure
    pub fn set_fault(&mut self, fault: Option<Fault>) {
        self.config.fault = fault;
    }

    fn window(&self, address: u16) -> usize {
        self.bank as usize * BANK_SIZE + address as usize
    }

    fn read(&mut self, address: u16) -> Result<Block, Failure> {
        self.stats.block_reads += 1;
        self.trace.push(BusEvent::Read {
            bank: self.bank,
            address,
        });

        if self.config.absent {
            return Err(Failure::NotInserted);
        }

        let mut block = [0u8; BLOCK_SIZE];
        if address <= DATA_END {
            let start = self.window(address);
            block.copy_from_slice(&self.data[start..start + BLOCK_SIZE]);
        }

        if self.config.fault
            == Some(Fault::BlockRead {
                bank: self.bank,
                address,
            })
        {
            log::debug!(
                "dummy pak: injected read fault at bank {} 0x{:04X}",
                self.bank,
                address
            );
            return Err(Failure::BadData(block));
        }
        Ok(block)
    }

    fn write(&mut self, address: u16, data: &Block) -> Result<(), Failure> {
        if address == BANK_SELECT_ADDR {
            let bank = data[0];
            self.stats.bank_selects += 1;
            self.trace.push(BusEvent::BankSelect(bank));
            if self.config.absent {
                return Err(Failure::NotInserted);
            }
            if self.config.fault == Some(Fault::BankSelect { bank }) {
                log::debug!("dummy pak: injected bank select fault for bank {}", bank);
                return Err(Failure::NoAnswer);
            }
            self.bank = bank % BANK_COUNT as u8;
            return Ok(());
        }

        self.stats.block_writes += 1;
        self.trace.push(BusEvent::Write {
            bank: self.bank,
            address,
        });
        if self.config.absent {
            return Err(Failure::NotInserted);
        }
        if address <= DATA_END {
            let start = self.window(address);
            self.data[start..start + BLOCK_SIZE].copy_from_slice(data);
        }
        Ok(())
    }
}

impl MempakBus for DummyPak {
    fn init(&mut self, _port: Port) -> bool {
        self.stats.inits += 1;
        self.trace.push(BusEvent::Init);
        !self.config.absent
    }

    fn read_address(&mut self, _port: Port, address: u16, data: &mut Block) -> i32 {
        match self.read(address) {
            Ok(block) => {
                *data = block;
                status::OK
            }
            Err(Failure::NotInserted) => status::NO_PAK,
            Err(Failure::BadData(_)) => status::BAD_CRC,
            Err(Failure::NoAnswer) => status::NO_CONTROLLER,
        }
    }

    fn write_address(&mut self, _port: Port, address: u16, data: &Block) -> i32 {
        match self.write(address, data) {
            Ok(()) => status::OK,
            Err(Failure::NotInserted) => status::NO_PAK,
            Err(Failure::BadData(_)) => status::BAD_CRC,
            Err(Failure::NoAnswer) => status::NO_CONTROLLER,
        }
    }
}

impl JoybusBus for DummyPak {
    fn exchange(&mut self, _port: Port, tx: &[u8], rx: &mut [u8]) -> Result<(), TransportError> {
        if tx.len() < 3 {
            log::warn!("dummy pak: short frame ({} bytes)", tx.len());
            return Err(TransportError::NoResponse);
        }
        let Some(address) = joybus::decode_address_word(u16::from_be_bytes([tx[1], tx[2]]))
        else {
            log::warn!("dummy pak: address CRC error in 0x{:02X}{:02X}", tx[1], tx[2]);
            return Err(TransportError::NoResponse);
        };

        match (tx[0], tx.len(), rx.len()) {
            (CMD_ACCESSORY_READ, READ_TX_LEN, READ_RX_LEN) => {
                let (block, crc) = match self.read(address) {
                    Ok(block) => (block, joybus::data_crc(&block)),
                    Err(Failure::NotInserted) => {
                        let empty = [0u8; BLOCK_SIZE];
                        (empty, !joybus::data_crc(&empty))
                    }
                    Err(Failure::BadData(block)) => (block, joybus::data_crc(&block) ^ 0x01),
                    Err(Failure::NoAnswer) => return Err(TransportError::NoResponse),
                };
                rx[..BLOCK_SIZE].copy_from_slice(&block);
                rx[BLOCK_SIZE] = crc;
                Ok(())
            }
            (CMD_ACCESSORY_WRITE, WRITE_TX_LEN, WRITE_RX_LEN) => {
                let mut block = [0u8; BLOCK_SIZE];
                block.copy_from_slice(&tx[3..]);
                let crc = joybus::data_crc(&block);
                rx[0] = match self.write(address, &block) {
                    Ok(()) => crc,
                    Err(Failure::NotInserted) => !crc,
                    Err(Failure::BadData(_)) => crc ^ 0x01,
                    Err(Failure::NoAnswer) => return Err(TransportError::NoResponse),
                };
                Ok(())
            }
            (cmd, tx_len, rx_len) => {
                log::warn!(
                    "dummy pak: unsupported frame cmd=0x{:02X} tx={} rx={}",
                    cmd,
                    tx_len,
                    rx_len
                );
                Err(TransportError::NoResponse)
            }
        }
    }
}
