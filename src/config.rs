//! Everything a test run needs to know about the chain and its pins, built once and passed to
//! `ScanPort::new`.
use crate::chain::ScanChain;
use crate::clock::ClockConfig;
use crate::dut::PinNames;

#[derive(Clone, Debug, Default)]
pub struct TestConfig {
    pub chain: ScanChain,
    pub clock: ClockConfig,
    pub pins: PinNames,
}

impl TestConfig {
    /// Default clock timing and pin names
    pub fn new(chain: ScanChain) -> Self {
        Self {
            chain,
            clock: ClockConfig::default(),
            pins: PinNames::default(),
        }
    }

    /// Parse the chain description at `path`
    #[cfg(feature = "std")]
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, crate::error::ParseError> {
        ScanChain::from_file(path).map(Self::new)
    }

    pub fn with_clock(mut self, clock: ClockConfig) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_pins(mut self, pins: PinNames) -> Self {
        self.pins = pins;
        self
    }

    pub fn chain_length(&self) -> usize {
        self.chain.chain_length()
    }
}
