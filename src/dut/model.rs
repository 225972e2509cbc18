//! An in-memory model of a scanned design.  The model owns the chain's flip-flops and a set of
//! named ports.  On a rising clock edge it either shifts the chain by one position (scan
//! enabled) or hands the flip-flops to a `Logic` implementation for a functional update.
//!
//! Position 0 is the chain head fed by `scan_in`; `scan_out` always shows the last position.
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use core::future::{self, Future};

use log::trace;

use crate::dut::{DeviceUnderTest, PinNames};

/// Behaviour of the design around its scan flip-flops
pub trait Logic {
    /// Rising clock edge with scan disabled
    fn clock(&mut self, state: &mut [u8], ports: &Ports);

    /// Recompute combinational outputs after the state or an input changed
    fn settle(&self, _state: &[u8], _ports: &mut Ports) {}
}

/// A bare shift register: functional clock edges leave the flip-flops alone
#[derive(Clone, Copy, Debug, Default)]
pub struct ShiftRegister;

impl Logic for ShiftRegister {
    fn clock(&mut self, _state: &mut [u8], _ports: &Ports) {}
}

/// Design specific inputs and outputs, by name
#[derive(Clone, Debug, Default)]
pub struct Ports {
    ports: Vec<(String, u64)>,
}

impl Ports {
    /// Current value of port `name`, 0 if it doesn't exist
    pub fn get(&self, name: &str) -> u64 {
        self.position(name).map(|i| self.ports[i].1).unwrap_or(0)
    }

    /// Set an existing port; unknown names are ignored
    pub fn set(&mut self, name: &str, value: u64) {
        if let Some(i) = self.position(name) {
            self.ports[i].1 = value;
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.ports.iter().position(|(n, _)| n == name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelSignal {
    Clk,
    ScanEn,
    ScanIn,
    ScanOut,
    Port(usize),
}

pub struct ScanModel<L> {
    pins: PinNames,
    ffs: Vec<u8>,
    ports: Ports,
    logic: L,
    clk: u64,
    scan_en: u64,
    scan_in: u64,
    time: u64,
    edges: u64,
}

impl<L: Logic> ScanModel<L> {
    /// Model a design whose chain has `chain_length` flip-flops, all initially zero
    pub fn new(chain_length: usize, logic: L) -> Self {
        Self {
            pins: PinNames::default(),
            ffs: vec![0; chain_length],
            ports: Ports::default(),
            logic,
            clk: 0,
            scan_en: 0,
            scan_in: 0,
            time: 0,
            edges: 0,
        }
    }

    pub fn with_pins(mut self, pins: PinNames) -> Self {
        self.pins = pins;
        self
    }

    /// Add a design specific port, initially zero
    pub fn with_port(mut self, name: &str) -> Self {
        self.ports.ports.push((name.to_string(), 0));
        self.logic.settle(&self.ffs, &mut self.ports);
        self
    }

    /// Contents of the flip-flops, indexed by chain position
    pub fn state(&self) -> &[u8] {
        &self.ffs
    }

    /// Overwrite the flip-flops directly, bypassing the chain
    pub fn load(&mut self, state: &[u8]) {
        for (ff, &bit) in self.ffs.iter_mut().zip(state) {
            *ff = bit & 1;
        }
        self.logic.settle(&self.ffs, &mut self.ports);
    }

    pub fn ports(&self) -> &Ports {
        &self.ports
    }

    /// Simulated time elapsed through `wait`
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Number of rising clock edges seen
    pub fn edges(&self) -> u64 {
        self.edges
    }

    pub fn logic(&self) -> &L {
        &self.logic
    }

    fn rising_edge(&mut self) {
        self.edges += 1;
        if self.scan_en != 0 {
            if !self.ffs.is_empty() {
                self.ffs.rotate_right(1);
                self.ffs[0] = (self.scan_in & 1) as u8;
            }
            trace!("shift in {} -> {:?}", self.scan_in & 1, self.ffs);
        } else {
            self.logic.clock(&mut self.ffs, &self.ports);
            trace!("functional edge -> {:?}", self.ffs);
        }
        self.logic.settle(&self.ffs, &mut self.ports);
    }
}

impl<L: Logic> DeviceUnderTest for ScanModel<L> {
    type Signal = ModelSignal;
    type Error = Infallible;

    fn signal(&self, name: &str) -> Option<ModelSignal> {
        if name == self.pins.clk {
            Some(ModelSignal::Clk)
        } else if name == self.pins.scan_en {
            Some(ModelSignal::ScanEn)
        } else if name == self.pins.scan_in {
            Some(ModelSignal::ScanIn)
        } else if name == self.pins.scan_out {
            Some(ModelSignal::ScanOut)
        } else {
            self.ports.position(name).map(ModelSignal::Port)
        }
    }

    fn set(&mut self, signal: ModelSignal, value: u64) -> Result<(), Infallible> {
        match signal {
            ModelSignal::Clk => {
                let rising = self.clk == 0 && value != 0;
                self.clk = value;
                if rising {
                    self.rising_edge();
                }
            }
            ModelSignal::ScanEn => self.scan_en = value,
            ModelSignal::ScanIn => self.scan_in = value,
            // driven by the design
            ModelSignal::ScanOut => {}
            ModelSignal::Port(i) => {
                self.ports.ports[i].1 = value;
                self.logic.settle(&self.ffs, &mut self.ports);
            }
        }
        Ok(())
    }

    fn get(&mut self, signal: ModelSignal) -> Result<u64, Infallible> {
        Ok(match signal {
            ModelSignal::Clk => self.clk,
            ModelSignal::ScanEn => self.scan_en,
            ModelSignal::ScanIn => self.scan_in,
            ModelSignal::ScanOut => self.ffs.last().copied().map(u64::from).unwrap_or(0),
            ModelSignal::Port(i) => self.ports.ports[i].1,
        })
    }

    fn wait(&mut self, duration: u32) -> impl Future<Output = ()> {
        self.time += u64::from(duration);
        future::ready(())
    }
}
