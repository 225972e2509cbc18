//! Clock generation.  `ClockDriver::advance` is the only place where simulated time passes:
//! every scan operation is a sequence of pin assignments separated by calls to it.
use log::trace;

use crate::dut::{resolve, DeviceUnderTest};
use crate::error::ScanError;

/// Timing of the generated clock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockConfig {
    /// Time the clock is held in each phase, in the device's time units
    pub half_period: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { half_period: 10 }
    }
}

impl ClockConfig {
    /// Half period in nanoseconds for a clock of `freq_khz`
    pub fn from_khz(freq_khz: u32) -> Self {
        let period_ns = 1_000_000 / freq_khz.max(1);
        Self {
            half_period: period_ns / 2,
        }
    }
}

pub struct ClockDriver<D: DeviceUnderTest> {
    pub dut: D,
    clk: D::Signal,
    half_period: u32,
    cycles: u64,
}

impl<D: DeviceUnderTest> ClockDriver<D> {
    /// Take control of the signal named `clk`, which is driven low
    pub fn new(mut dut: D, clk: &str, config: &ClockConfig) -> Result<Self, ScanError> {
        let clk = resolve(&dut, clk)?;
        dut.set(clk, 0).map_err(ScanError::device)?;
        Ok(Self {
            dut,
            clk,
            half_period: config.half_period,
            cycles: 0,
        })
    }

    /// Run one clock period: high for the hold time, then low for the hold time
    pub async fn advance(&mut self) -> Result<(), ScanError> {
        self.dut.set(self.clk, 1).map_err(ScanError::device)?;
        self.dut.wait(self.half_period).await;
        self.dut.set(self.clk, 0).map_err(ScanError::device)?;
        self.dut.wait(self.half_period).await;
        self.cycles += 1;
        trace!("clock period {}", self.cycles);
        Ok(())
    }

    /// Number of clock periods completed so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn half_period(&self) -> u32 {
        self.half_period
    }

    pub fn into_inner(self) -> D {
        self.dut
    }
}
