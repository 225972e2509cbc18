//! Test procedures built on `ScanPort`: characterising a Moore machine through its state
//! register, and checking an adder whose operands and sum live in the chain.
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use log::{debug, info};

use crate::bits::{from_bits, truncate};
use crate::dut::{resolve, DeviceUnderTest};
use crate::error::ScanError;
use crate::scan::ScanPort;

/// Next state and sampled outputs for one (state, input) pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next_state: u64,
    pub outputs: Vec<u64>,
}

/// Transition table of a Moore machine, keyed by (state, input)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FsmTable {
    input: String,
    outputs: Vec<String>,
    entries: BTreeMap<(u64, u64), Transition>,
}

impl FsmTable {
    pub fn get(&self, state: u64, input: u64) -> Option<&Transition> {
        self.entries.get(&(state, input))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by state, then input
    pub fn iter(&self) -> impl Iterator<Item = (&(u64, u64), &Transition)> {
        self.entries.iter()
    }
}

impl fmt::Display for FsmTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state | {} | next", self.input)?;
        for name in &self.outputs {
            write!(f, " | {}", name)?;
        }
        writeln!(f)?;
        for ((state, input), t) in &self.entries {
            write!(
                f,
                "{:5} | {:w$} | {:4}",
                state,
                input,
                t.next_state,
                w = self.input.len()
            )?;
            for (name, value) in self.outputs.iter().zip(&t.outputs) {
                write!(f, " | {:w$}", value, w = name.len())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Enumerate every state of `state_register` against both values of the one bit `input`.
///
/// For each pair the state is loaded through the chain, the input is applied, the Moore
/// outputs are sampled before the clock edge, the design is clocked once with scan disabled
/// and the next state is unloaded.  `input` is returned to 0 after every pair.  The table has
/// `2 * 2^size` entries, so a register of 64 bits or more fails with `ScanError::TooWide`.
///
/// The register and every signal name are checked before any pin is driven.
pub async fn characterize_fsm<D: DeviceUnderTest>(
    port: &mut ScanPort<D>,
    state_register: &str,
    input: &str,
    outputs: &[&str],
) -> Result<FsmTable, ScanError> {
    let size = port.contiguous_register(state_register)?.size();
    if size >= 64 {
        return Err(ScanError::TooWide {
            name: state_register.to_string(),
            size,
        });
    }
    let input_signal = resolve(port.dut(), input)?;
    let output_signals = outputs
        .iter()
        .map(|name| resolve(port.dut(), name))
        .collect::<Result<Vec<_>, _>>()?;
    let mut entries = BTreeMap::new();

    for state in 0..(1u64 << size) {
        for value in [0, 1] {
            port.write_register(state_register, state).await?;
            port.dut_mut().set(input_signal, value).map_err(ScanError::device)?;

            let mut sampled = Vec::with_capacity(outputs.len());
            for &signal in &output_signals {
                sampled.push(port.dut_mut().get(signal).map_err(ScanError::device)?);
            }

            port.step().await?;
            let next_state = port.read_register(state_register).await?;
            debug!("state {} {}={} -> {} {:?}", state, input, value, next_state, sampled);

            entries.insert(
                (state, value),
                Transition {
                    next_state,
                    outputs: sampled,
                },
            );
            port.dut_mut().set(input_signal, 0).map_err(ScanError::device)?;
        }
    }

    info!("characterised {} transitions of {}", entries.len(), state_register);
    Ok(FsmTable {
        input: input.to_string(),
        outputs: outputs.iter().map(|s| s.to_string()).collect(),
        entries,
    })
}

/// Result of one adder check
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdderOutcome {
    pub a: u64,
    pub b: u64,
    pub expected: u64,
    pub actual: u64,
}

impl AdderOutcome {
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

impl fmt::Display for AdderOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {} = {}, expected {}", self.a, self.b, self.actual, self.expected)
    }
}

/// Load operand registers `a` and `b` with one pass over the chain, clock the design once with
/// scan disabled, and unload the `sum_width` bit window at `sum_offset`.
///
/// Operands are cut down to the width of their register as they are loaded, and the outcome
/// reports the values that actually went in.  The expected sum is taken modulo `2^sum_width`,
/// like the window it is compared against.
pub async fn check_adder<D: DeviceUnderTest>(
    port: &mut ScanPort<D>,
    a: (&str, u64),
    b: (&str, u64),
    sum_offset: usize,
    sum_width: usize,
) -> Result<AdderOutcome, ScanError> {
    let a = (a.0, operand(port, a)?);
    let b = (b.0, operand(port, b)?);

    port.write_registers(&[a, b]).await?;
    port.step().await?;
    let bits = port.read(sum_offset, sum_width).await?;

    let outcome = AdderOutcome {
        a: a.1,
        b: b.1,
        expected: truncate(a.1.wrapping_add(b.1), sum_width),
        actual: from_bits(&bits),
    };
    debug!("{}", outcome);
    Ok(outcome)
}

fn operand<D: DeviceUnderTest>(port: &ScanPort<D>, (name, value): (&str, u64)) -> Result<u64, ScanError> {
    let reg = port
        .chain()
        .register(name)
        .ok_or_else(|| ScanError::UnknownRegister {
            name: name.to_string(),
        })?;
    Ok(truncate(value, reg.size()))
}
