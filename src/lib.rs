//! This crate loads and unloads the internal state of a digital design through its scan chain:
//! the flip-flops of the design, wired in series between a `scan_in` and a `scan_out` pin, that
//! shift by one position per clock period while `scan_en` is high.
//!
//! At the lowest level, a `DeviceUnderTest` gives access to named signals and to simulated
//! time.  `dut::model::ScanModel` is an in-memory model of a scanned design and
//! `dut::gpio::Gpio` drives a real chain through `embedded-hal` pins.  `ClockDriver` generates
//! clock periods on top of that, and is the only thing that lets time pass.
//!
//! A `ScanChain`, parsed from a description that maps every chain position to a bit of a named
//! register, tells `ScanPort` how long the chain is and where each register lives.  `ScanPort`
//! shifts bit sequences into any window of the chain (`write`) and back out again (`read`), and
//! offers the same per register.  The `scenario` module builds test procedures on top.
//!
//! All operations that take time are `async` and only ever suspend inside `ClockDriver`, so any
//! executor will do.
//!
//! # Example
//! ```
//! use scan_chain::chain::ScanChain;
//! use scan_chain::config::TestConfig;
//! use scan_chain::dut::model::{ScanModel, ShiftRegister};
//! use scan_chain::scan::ScanPort;
//!
//! let chain = ScanChain::parse("0 acc 0\n1 acc 1\n2 acc 2\n3 acc 3").unwrap();
//! let config = TestConfig::new(chain);
//! let dut = ScanModel::new(config.chain_length(), ShiftRegister);
//! let mut port = ScanPort::new(dut, &config).unwrap();
//!
//! futures::executor::block_on(async {
//!     port.write(&[1, 0, 1, 1], 0).await.unwrap();
//!     assert_eq!(port.read(0, 4).await.unwrap(), vec![1, 0, 1, 1]);
//! });
//! ```

#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod bits;
pub mod chain;
pub mod clock;
pub mod config;
pub mod dut;
pub mod error;
pub mod scan;
pub mod scenario;
