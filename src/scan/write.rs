use alloc::vec;

use log::debug;

use super::ScanPort;
use crate::bits::to_bits;
use crate::dut::DeviceUnderTest;
use crate::error::ScanError;

impl<D: DeviceUnderTest> ScanPort<D> {
    /// Shift `bits` into the chain so that `bits[i]` ends up at position `offset + i`.  The
    /// last bit goes in first, followed by `offset` zeros to push the window into place, so the
    /// load takes `bits.len() + offset` clock periods.  Positions below `offset` are left zero
    /// and whatever was in the chain before moves `bits.len() + offset` positions further on.
    ///
    /// Fails with `ScanError::Range` before touching any pin if the window doesn't fit.
    pub async fn write(&mut self, bits: &[u8], offset: usize) -> Result<(), ScanError> {
        self.check_window(offset, bits.len())?;
        debug!("scan in {} bits at offset {}", bits.len(), offset);

        self.begin()?;
        for &bit in bits.iter().rev() {
            self.drive(bit)?;
            self.clock.advance().await?;
        }
        self.drive(0)?;
        for _ in 0..offset {
            self.clock.advance().await?;
        }
        self.end()
    }

    /// Place a single bit at `position`
    pub async fn write_bit(&mut self, bit: u8, position: usize) -> Result<(), ScanError> {
        self.write(&[bit], position).await
    }

    /// Load `value` into a register whose bits occupy consecutive chain positions
    pub async fn write_register(&mut self, name: &str, value: u64) -> Result<(), ScanError> {
        let reg = self.contiguous_register(name)?;
        self.write(&to_bits(value, reg.size()), reg.first()).await
    }

    /// Load several registers with one pass over the chain.  The image starts at position 0
    /// and extends to the highest position of any listed register; positions that belong to no
    /// listed register are loaded with zero.  Registers don't need to be contiguous.
    pub async fn write_registers(&mut self, values: &[(&str, u64)]) -> Result<(), ScanError> {
        let mut regs = vec![];
        for &(name, value) in values {
            let reg = self
                .chain
                .register(name)
                .ok_or_else(|| ScanError::UnknownRegister { name: name.into() })?;
            regs.push((reg, value));
        }

        let length = regs
            .iter()
            .flat_map(|(reg, _)| reg.index_list().iter())
            .map(|&pos| pos + 1)
            .max()
            .unwrap_or(0);
        let mut image = vec![0u8; length];
        for (reg, value) in &regs {
            for (&pos, bit) in reg.index_list().iter().zip(to_bits(*value, reg.size())) {
                image[pos] = bit;
            }
        }

        self.write(&image, 0).await
    }
}
