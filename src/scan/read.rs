use alloc::vec::Vec;

use log::debug;

use super::ScanPort;
use crate::bits::from_bits;
use crate::dut::DeviceUnderTest;
use crate::error::ScanError;

impl<D: DeviceUnderTest> ScanPort<D> {
    /// Unload the `length` bits at positions `offset..offset + length`.  The chain is first
    /// shifted `chain_length - offset - length` times so the top of the window reaches
    /// `scan_out`, then `scan_out` is sampled before each of `length` further clock periods.
    /// Zeros are shifted in behind.
    ///
    /// Element `i` of the result is the bit that was at position `offset + i`, matching the
    /// order taken by `write`.  Fails with `ScanError::Range` before touching any pin if the
    /// window doesn't fit.
    pub async fn read(&mut self, offset: usize, length: usize) -> Result<Vec<u8>, ScanError> {
        self.check_window(offset, length)?;
        let align = self.chain.chain_length() - offset - length;
        debug!("scan out {} bits at offset {} after {} alignment cycles", length, offset, align);

        self.begin()?;
        self.drive(0)?;
        for _ in 0..align {
            self.clock.advance().await?;
        }

        let mut bits = Vec::with_capacity(length);
        for _ in 0..length {
            bits.push(self.sample()?);
            self.clock.advance().await?;
        }
        self.end()?;

        // sampled from the top of the window down
        bits.reverse();
        Ok(bits)
    }

    /// Unload the single bit at `position`
    pub async fn read_bit(&mut self, position: usize) -> Result<u8, ScanError> {
        let bits = self.read(position, 1).await?;
        Ok(bits[0])
    }

    /// Unload a register whose bits occupy consecutive chain positions
    pub async fn read_register(&mut self, name: &str) -> Result<u64, ScanError> {
        let reg = self.contiguous_register(name)?;
        let bits = self.read(reg.first(), reg.size()).await?;
        Ok(from_bits(&bits))
    }
}
