//! Scan chain descriptions.  A description maps every flip-flop of the chain, by its absolute
//! position, to a bit of a named register.  The textual form has one record per line:
//!
//! ```text
//! <chain position> <register name> <register bit>
//! ```
//!
//! Lines may appear in any order.  `ScanChain` groups the records by register and orders each
//! register's chain positions by register bit, so that `index_list()[i]` is where bit `i` lives.
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use log::{debug, info};

use crate::error::ParseError;

/// One line of a chain description
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub position: usize,
    pub register: String,
    pub bit: usize,
}

impl Record {
    pub fn new(position: usize, register: &str, bit: usize) -> Self {
        Self {
            position,
            register: register.to_string(),
            bit,
        }
    }

    fn parse(line: usize, text: &str) -> Result<Self, ParseError> {
        let mut fields = text.split_whitespace();
        let position = integer_field(line, "chain position", fields.next())?;
        let register = fields
            .next()
            .ok_or(ParseError::MissingField { line, field: "register name" })?;
        let bit = integer_field(line, "register bit", fields.next())?;
        Ok(Self::new(position, register, bit))
    }
}

fn integer_field(line: usize, field: &'static str, text: Option<&str>) -> Result<usize, ParseError> {
    let text = text.ok_or(ParseError::MissingField { line, field })?;
    text.parse().map_err(|_| ParseError::InvalidInteger {
        line,
        field,
        text: text.to_string(),
    })
}

/// A named register and the chain positions of its bits
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    name: String,
    index_list: Vec<usize>,
}

impl Register {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of bits in the register
    pub fn size(&self) -> usize {
        self.index_list.len()
    }

    /// Chain positions ordered by register bit, least significant bit first
    pub fn index_list(&self) -> &[usize] {
        &self.index_list
    }

    /// Chain position of the least significant bit
    pub fn first(&self) -> usize {
        self.index_list[0]
    }

    /// Chain position of the most significant bit
    pub fn last(&self) -> usize {
        self.index_list[self.index_list.len() - 1]
    }

    /// True if bit `i` sits at position `first() + i` for every bit, so that the register can be
    /// loaded and unloaded as a single window.
    pub fn is_contiguous(&self) -> bool {
        let first = self.first();
        self.index_list
            .iter()
            .enumerate()
            .all(|(i, &pos)| pos == first + i)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NAME:    {}", self.name)?;
        writeln!(f, "SIZE:    {}", self.size())?;
        write!(f, "INDICES: {:?}", self.index_list)
    }
}

/// Every register of a design and the total number of flip-flops in its chain.  Read-only once
/// built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanChain {
    registers: Vec<Register>,
    chain_length: usize,
}

impl ScanChain {
    /// Parse a whitespace separated chain description.  Blank lines are skipped and fields
    /// after the third are ignored.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let mut records = Vec::new();
        for (i, text) in source.lines().enumerate() {
            if text.trim().is_empty() {
                continue;
            }
            records.push((i + 1, Record::parse(i + 1, text)?));
        }
        Self::build(records)
    }

    /// Build a chain from records that have already been split into fields.  Errors report the
    /// 1-based index of the offending record as its line.
    pub fn from_records<I>(records: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = Record>,
    {
        Self::build(records.into_iter().enumerate().map(|(i, r)| (i + 1, r)))
    }

    /// Read and parse a chain description file
    #[cfg(feature = "std")]
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ParseError> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source)
    }

    fn build<I>(records: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = (usize, Record)>,
    {
        let mut order: Vec<String> = Vec::new();
        // register name -> (register bit -> chain position)
        let mut groups: BTreeMap<String, BTreeMap<usize, usize>> = BTreeMap::new();
        // chain position -> owning register
        let mut taken: BTreeMap<usize, String> = BTreeMap::new();

        for (line, record) in records {
            if let Some(owner) = taken.get(&record.position) {
                return Err(ParseError::DuplicatePosition {
                    line,
                    position: record.position,
                    register: owner.clone(),
                });
            }

            if !groups.contains_key(&record.register) {
                order.push(record.register.clone());
            }
            let group = groups.entry(record.register.clone()).or_default();
            if group.insert(record.bit, record.position).is_some() {
                return Err(ParseError::DuplicateBit {
                    line,
                    register: record.register,
                    bit: record.bit,
                });
            }
            taken.insert(record.position, record.register);
        }

        let chain_length = taken.len();
        if let Some(position) = (0..chain_length).find(|p| !taken.contains_key(p)) {
            return Err(ParseError::Gap { position, chain_length });
        }

        let registers: Vec<Register> = order
            .into_iter()
            .map(|name| {
                // BTreeMap iterates in ascending register bit order
                let index_list = groups
                    .remove(&name)
                    .map(|g| g.into_values().collect())
                    .unwrap_or_default();
                Register { name, index_list }
            })
            .collect();

        info!("scan chain: {} registers, {} flip-flops", registers.len(), chain_length);
        for reg in &registers {
            debug!("register {} -> {:?}", reg.name, reg.index_list);
        }

        Ok(Self { registers, chain_length })
    }

    /// Total number of flip-flops in the chain
    pub fn chain_length(&self) -> usize {
        self.chain_length
    }

    /// Look up a register by name
    pub fn register(&self, name: &str) -> Option<&Register> {
        self.registers.iter().find(|r| r.name == name)
    }

    /// Registers in the order they first appeared in the description
    pub fn registers(&self) -> impl Iterator<Item = &Register> {
        self.registers.iter()
    }
}

impl fmt::Display for ScanChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CHAIN SIZE: {}", self.chain_length)?;
        writeln!(f, "REGISTERS:")?;
        for reg in &self.registers {
            writeln!(f, "------------------")?;
            writeln!(f, "{}", reg)?;
        }
        write!(f, "------------------")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;

    #[test]
    fn groups_by_register_bit() {
        let chain = ScanChain::from_records(vec![
            Record::new(0, "R", 1),
            Record::new(1, "R", 0),
            Record::new(2, "S", 0),
        ])
        .unwrap();

        assert_eq!(chain.chain_length(), 3);
        let r = chain.register("R").unwrap();
        assert_eq!(r.size(), 2);
        assert_eq!(r.index_list(), &[1, 0]);
        assert_eq!(r.first(), 1);
        assert_eq!(r.last(), 0);
        assert!(!r.is_contiguous());

        let s = chain.register("S").unwrap();
        assert_eq!(s.index_list(), &[2]);
        assert!(s.is_contiguous());
    }

    #[test]
    fn parses_unsorted_text() {
        let text = "\
4 a 0
0 b 0
5 a 1
1 b 1

6 a 2
2 b 2
7 a 3
3 b 3
";
        let chain = ScanChain::parse(text).unwrap();
        assert_eq!(chain.chain_length(), 8);
        let names: Vec<&str> = chain.registers().map(|r| r.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(chain.register("a").unwrap().index_list(), &[4, 5, 6, 7]);
        assert_eq!(chain.register("b").unwrap().first(), 0);
        assert_eq!(chain.register("b").unwrap().last(), 3);
        assert!(chain.register("c").is_none());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let chain = ScanChain::parse("0 state 0 trailing\n1 state 1").unwrap();
        assert_eq!(chain.register("state").unwrap().index_list(), &[0, 1]);
    }

    #[test]
    fn empty_description() {
        let chain = ScanChain::parse("\n  \n").unwrap();
        assert_eq!(chain.chain_length(), 0);
        assert_eq!(chain.registers().count(), 0);
    }

    #[test]
    fn missing_field() {
        match ScanChain::parse("0 a 0\n1 a") {
            Err(ParseError::MissingField { line: 2, field: "register bit" }) => {}
            other => panic!("unexpected {:?}", other),
        }
        match ScanChain::parse("7") {
            Err(ParseError::MissingField { line: 1, field: "register name" }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn invalid_integer() {
        match ScanChain::parse("x a 0") {
            Err(ParseError::InvalidInteger { line: 1, field: "chain position", text }) => {
                assert_eq!(text, "x")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            ScanChain::parse("0 a -1"),
            Err(ParseError::InvalidInteger { field: "register bit", .. })
        ));
    }

    #[test]
    fn duplicate_bit_names_register() {
        let err = ScanChain::parse("0 acc 0\n1 acc 0").unwrap_err();
        match &err {
            ParseError::DuplicateBit { line: 2, register, bit: 0 } => assert_eq!(register, "acc"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(format!("{}", err).contains("acc"));
    }

    #[test]
    fn duplicate_position() {
        match ScanChain::parse("0 a 0\n0 b 0") {
            Err(ParseError::DuplicatePosition { line: 2, position: 0, register }) => {
                assert_eq!(register, "a")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn gap_in_positions() {
        match ScanChain::parse("0 a 0\n2 a 1") {
            Err(ParseError::Gap { position: 1, chain_length: 2 }) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn display_lists_registers() {
        let chain = ScanChain::parse("0 q 0\n1 q 1").unwrap();
        let text = format!("{}", chain);
        assert!(text.starts_with("CHAIN SIZE: 2"));
        assert!(text.contains("NAME:    q"));
        assert!(text.contains("INDICES: [0, 1]"));
    }
}
