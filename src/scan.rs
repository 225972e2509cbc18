//! `ScanPort` loads and unloads the chain of a device under test.  It owns a `ClockDriver` and
//! the scan pins, and keeps track of whether a scan is in progress.
//!
//! Chain positions count from the head: position 0 is the flip-flop fed by `scan_in` and the
//! last position drives `scan_out`.  `write(bits, offset)` leaves `bits[i]` at position
//! `offset + i`, and `read(offset, n)` returns the window in the same order, so a read of the
//! window just written returns the written bits.
//!
//! Both directions are destructive: every clock period with scan enabled moves the whole chain
//! one position toward `scan_out`.
use alloc::string::{String, ToString};

use log::trace;

use crate::chain::{Register, ScanChain};
use crate::clock::ClockDriver;
use crate::config::TestConfig;
use crate::dut::{resolve, DeviceUnderTest};
use crate::error::ScanError;

mod read;
mod write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    /// scan_en is low; clock edges update the design functionally
    Idle,
    /// scan_en is high; clock edges shift the chain
    Scanning,
}

pub struct ScanPort<D: DeviceUnderTest> {
    pub clock: ClockDriver<D>,
    chain: ScanChain,
    scan_en: D::Signal,
    scan_in: D::Signal,
    scan_out: D::Signal,
    scan_out_name: String,
    state: ScanState,
}

impl<D: DeviceUnderTest> ScanPort<D> {
    /// Resolve the clock and scan pins named in `config` and drive them all low
    pub fn new(dut: D, config: &TestConfig) -> Result<Self, ScanError> {
        let scan_en = resolve(&dut, &config.pins.scan_en)?;
        let scan_in = resolve(&dut, &config.pins.scan_in)?;
        let scan_out = resolve(&dut, &config.pins.scan_out)?;
        let mut clock = ClockDriver::new(dut, &config.pins.clk, &config.clock)?;

        clock.dut.set(scan_en, 0).map_err(ScanError::device)?;
        clock.dut.set(scan_in, 0).map_err(ScanError::device)?;

        Ok(Self {
            clock,
            chain: config.chain.clone(),
            scan_en,
            scan_in,
            scan_out,
            scan_out_name: config.pins.scan_out.clone(),
            state: ScanState::Idle,
        })
    }

    pub fn chain(&self) -> &ScanChain {
        &self.chain
    }

    pub fn chain_length(&self) -> usize {
        self.chain.chain_length()
    }

    /// `Scanning` outside of a scan operation means the last one failed part way through and
    /// scan_en may still be high.
    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn dut(&self) -> &D {
        &self.clock.dut
    }

    pub fn dut_mut(&mut self) -> &mut D {
        &mut self.clock.dut
    }

    pub fn into_inner(self) -> D {
        self.clock.into_inner()
    }

    /// One functional clock period with scan disabled
    pub async fn step(&mut self) -> Result<(), ScanError> {
        self.clock.dut.set(self.scan_en, 0).map_err(ScanError::device)?;
        self.state = ScanState::Idle;
        self.clock.advance().await
    }

    /// Drive a design specific input
    pub fn set_input(&mut self, name: &str, value: u64) -> Result<(), ScanError> {
        let signal = resolve(&self.clock.dut, name)?;
        self.clock.dut.set(signal, value).map_err(ScanError::device)
    }

    /// Sample a design specific output
    pub fn get_output(&mut self, name: &str) -> Result<u64, ScanError> {
        let signal = resolve(&self.clock.dut, name)?;
        self.clock.dut.get(signal).map_err(ScanError::device)
    }

    fn check_window(&self, offset: usize, length: usize) -> Result<(), ScanError> {
        let chain_length = self.chain.chain_length();
        match offset.checked_add(length) {
            Some(end) if end <= chain_length => Ok(()),
            _ => Err(ScanError::Range {
                offset,
                length,
                chain_length,
            }),
        }
    }

    /// Find a register that can be moved as a single window
    pub(crate) fn contiguous_register(&self, name: &str) -> Result<Register, ScanError> {
        let reg = self
            .chain
            .register(name)
            .ok_or_else(|| ScanError::UnknownRegister {
                name: name.to_string(),
            })?;
        if !reg.is_contiguous() {
            return Err(ScanError::NonContiguousRegister {
                name: name.to_string(),
            });
        }
        Ok(reg.clone())
    }

    fn begin(&mut self) -> Result<(), ScanError> {
        self.clock.dut.set(self.scan_en, 1).map_err(ScanError::device)?;
        self.state = ScanState::Scanning;
        Ok(())
    }

    fn end(&mut self) -> Result<(), ScanError> {
        self.clock.dut.set(self.scan_in, 0).map_err(ScanError::device)?;
        self.clock.dut.set(self.scan_en, 0).map_err(ScanError::device)?;
        self.state = ScanState::Idle;
        Ok(())
    }

    fn drive(&mut self, bit: u8) -> Result<(), ScanError> {
        trace!("scan_in <- {}", bit);
        self.clock
            .dut
            .set(self.scan_in, u64::from(bit != 0))
            .map_err(ScanError::device)
    }

    fn sample(&mut self) -> Result<u8, ScanError> {
        let value = self
            .clock
            .dut
            .get(self.scan_out)
            .map_err(ScanError::device)?;
        trace!("scan_out -> {}", value);
        match value {
            0 | 1 => Ok(value as u8),
            _ => Err(ScanError::Value {
                name: self.scan_out_name.clone(),
                value,
            }),
        }
    }
}
