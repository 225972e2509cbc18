//! Drive a physical scan chain through GPIO pins.  Only the four scan signals are available;
//! design specific ports have to be driven by other means.
use core::future::{self, Future};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error, ErrorKind, InputPin, OutputPin, PinState};

use crate::dut::{DeviceUnderTest, PinNames};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpioSignal {
    Clk,
    ScanEn,
    ScanIn,
    ScanOut,
}

/// `wait` blocks in `DelayNs` and hands back a future that is already complete, so a scan
/// through `Gpio` never yields to the executor.
pub struct Gpio<Clk, ScanEn, ScanIn, ScanOut, Delay>
where
    Clk: OutputPin,
    ScanEn: OutputPin,
    ScanIn: OutputPin,
    ScanOut: InputPin,
    Delay: DelayNs,
{
    pins: PinNames,
    delay: Delay,
    clock: Clk,
    scan_en: ScanEn,
    scan_in: ScanIn,
    scan_out: ScanOut,
    // last values driven on clk, scan_en, scan_in
    driven: [u64; 3],
}

impl<Clk, ScanEn, ScanIn, ScanOut, Delay> Gpio<Clk, ScanEn, ScanIn, ScanOut, Delay>
where
    Clk: OutputPin,
    ScanEn: OutputPin,
    ScanIn: OutputPin,
    ScanOut: InputPin,
    Delay: DelayNs,
{
    /// `wait` durations are passed to `delay` in nanoseconds, see `ClockConfig::from_khz`
    pub fn new(clock: Clk, scan_en: ScanEn, scan_in: ScanIn, scan_out: ScanOut, delay: Delay) -> Self {
        Gpio {
            pins: PinNames::default(),
            delay,
            clock,
            scan_en,
            scan_in,
            scan_out,
            driven: [0; 3],
        }
    }

    pub fn with_pins(mut self, pins: PinNames) -> Self {
        self.pins = pins;
        self
    }

    pub fn release(self) -> (Clk, ScanEn, ScanIn, ScanOut, Delay) {
        (self.clock, self.scan_en, self.scan_in, self.scan_out, self.delay)
    }
}

impl<Clk, ScanEn, ScanIn, ScanOut, Delay> DeviceUnderTest for Gpio<Clk, ScanEn, ScanIn, ScanOut, Delay>
where
    Clk: OutputPin,
    ScanEn: OutputPin,
    ScanIn: OutputPin,
    ScanOut: InputPin,
    Delay: DelayNs,
{
    type Signal = GpioSignal;
    type Error = ErrorKind;

    fn signal(&self, name: &str) -> Option<GpioSignal> {
        if name == self.pins.clk {
            Some(GpioSignal::Clk)
        } else if name == self.pins.scan_en {
            Some(GpioSignal::ScanEn)
        } else if name == self.pins.scan_in {
            Some(GpioSignal::ScanIn)
        } else if name == self.pins.scan_out {
            Some(GpioSignal::ScanOut)
        } else {
            None
        }
    }

    fn set(&mut self, signal: GpioSignal, value: u64) -> Result<(), ErrorKind> {
        let state = PinState::from(value != 0);
        let (result, slot) = match signal {
            GpioSignal::Clk => (self.clock.set_state(state).map_err(|e| e.kind()), 0),
            GpioSignal::ScanEn => (self.scan_en.set_state(state).map_err(|e| e.kind()), 1),
            GpioSignal::ScanIn => (self.scan_in.set_state(state).map_err(|e| e.kind()), 2),
            // an input on our side
            GpioSignal::ScanOut => return Err(ErrorKind::Other),
        };
        result?;
        self.driven[slot] = u64::from(value != 0);
        Ok(())
    }

    fn get(&mut self, signal: GpioSignal) -> Result<u64, ErrorKind> {
        match signal {
            GpioSignal::Clk => Ok(self.driven[0]),
            GpioSignal::ScanEn => Ok(self.driven[1]),
            GpioSignal::ScanIn => Ok(self.driven[2]),
            GpioSignal::ScanOut => self
                .scan_out
                .is_high()
                .map(u64::from)
                .map_err(|e| e.kind()),
        }
    }

    fn wait(&mut self, duration: u32) -> impl Future<Output = ()> {
        self.delay.delay_ns(duration);
        future::ready(())
    }
}
