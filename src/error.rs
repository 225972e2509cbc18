//! Error types for chain description parsing and scan operations.
use alloc::string::String;

use embedded_hal::digital::ErrorKind;

/// A malformed or inconsistent chain description.  `line` is 1-based.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: missing {field} field")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: {field} `{text}` is not a non-negative integer")]
    InvalidInteger {
        line: usize,
        field: &'static str,
        text: String,
    },

    #[error("line {line}: register `{register}` maps bit {bit} more than once")]
    DuplicateBit {
        line: usize,
        register: String,
        bit: usize,
    },

    #[error("line {line}: chain position {position} is already taken by register `{register}`")]
    DuplicatePosition {
        line: usize,
        position: usize,
        register: String,
    },

    #[error("chain position {position} is not mapped to any register (chain length {chain_length})")]
    Gap { position: usize, chain_length: usize },

    #[cfg(feature = "std")]
    #[error("failed to read chain description")]
    Io(#[from] std::io::Error),
}

/// Failures of scan operations.  Everything except `Device` is detected before any pin is driven.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    #[error("window of {length} bits at offset {offset} exceeds chain length {chain_length}")]
    Range {
        offset: usize,
        length: usize,
        chain_length: usize,
    },

    #[error("device has no signal named `{name}`")]
    UnknownSignal { name: String },

    #[error("chain has no register named `{name}`")]
    UnknownRegister { name: String },

    #[error("register `{name}` does not occupy a contiguous ascending window of the chain")]
    NonContiguousRegister { name: String },

    #[error("register `{name}` has {size} bits, too many to enumerate every value")]
    TooWide { name: String, size: usize },

    #[error("signal `{name}` carried {value}, expected a single bit")]
    Value { name: String, value: u64 },

    #[error("device pin error: {0}")]
    Device(ErrorKind),
}

impl ScanError {
    pub(crate) fn device<E: embedded_hal::digital::Error>(err: E) -> Self {
        ScanError::Device(err.kind())
    }
}
