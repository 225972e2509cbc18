//! The device under test is reached through named signals.  Backends implement the
//! `DeviceUnderTest` trait; the rest of the crate only ever resolves a signal by name, drives it,
//! samples it and lets simulated time pass.
use alloc::string::{String, ToString};
use core::future::Future;

use crate::error::ScanError;

pub mod gpio;
pub mod model;

pub trait DeviceUnderTest {
    /// A resolved handle to one signal of the device
    type Signal: Copy;
    type Error: embedded_hal::digital::Error;

    /// Resolve a signal by name, or `None` if the device has no such signal
    fn signal(&self, name: &str) -> Option<Self::Signal>;
    /// Drive `signal` to `value`.  The new value is seen by the design at the next clock edge.
    fn set(&mut self, signal: Self::Signal, value: u64) -> Result<(), Self::Error>;
    /// Sample the current value of `signal`
    fn get(&mut self, signal: Self::Signal) -> Result<u64, Self::Error>;
    /// Suspend until `duration` units of simulated time have passed
    fn wait(&mut self, duration: u32) -> impl Future<Output = ()>;
}

pub(crate) fn resolve<D: DeviceUnderTest + ?Sized>(dut: &D, name: &str) -> Result<D::Signal, ScanError> {
    dut.signal(name).ok_or_else(|| ScanError::UnknownSignal {
        name: name.to_string(),
    })
}

/// Names of the signals that operate the chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinNames {
    pub clk: String,
    pub scan_en: String,
    pub scan_in: String,
    pub scan_out: String,
}

impl Default for PinNames {
    fn default() -> Self {
        Self {
            clk: "clk".to_string(),
            scan_en: "scan_en".to_string(),
            scan_in: "scan_in".to_string(),
            scan_out: "scan_out".to_string(),
        }
    }
}
