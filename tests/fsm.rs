use futures::executor::block_on;

use scan_chain::bits::{from_bits, to_bits};
use scan_chain::chain::ScanChain;
use scan_chain::config::TestConfig;
use scan_chain::error::ScanError;
use scan_chain::dut::model::{Logic, Ports, ScanModel, ShiftRegister};
use scan_chain::scan::ScanPort;
use scan_chain::scenario::{characterize_fsm, Transition};

const OUTPUTS: [&str; 3] = ["buf_en", "out_sel", "out_writing"];

/// A buffer controller with a 3 bit state register at chain positions 0..3.  It counts up
/// while `data_avail` is high, holds otherwise, and wraps from 7 to 0 unconditionally.
struct Buffer;

fn next_state(state: u64, data_avail: u64) -> u64 {
    match (state, data_avail) {
        (7, _) => 0,
        (s, 1) => s + 1,
        (s, _) => s,
    }
}

fn outputs(state: u64) -> Vec<u64> {
    vec![
        u64::from((1..=3).contains(&state)),
        (state >> 2) & 1,
        u64::from(state == 7),
    ]
}

impl Logic for Buffer {
    fn clock(&mut self, state: &mut [u8], ports: &Ports) {
        let next = next_state(from_bits(&state[..3]), ports.get("data_avail"));
        state[..3].copy_from_slice(&to_bits(next, 3));
    }

    fn settle(&self, state: &[u8], ports: &mut Ports) {
        for (name, value) in OUTPUTS.iter().zip(outputs(from_bits(&state[..3]))) {
            ports.set(name, value);
        }
    }
}

fn port() -> ScanPort<ScanModel<Buffer>> {
    let _ = env_logger::builder().is_test(true).try_init();

    let config = TestConfig::new(ScanChain::parse("2 state 2\n0 state 0\n1 state 1").unwrap());
    let mut model = ScanModel::new(config.chain_length(), Buffer).with_port("data_avail");
    for name in OUTPUTS {
        model = model.with_port(name);
    }
    ScanPort::new(model, &config).unwrap()
}

#[test]
fn transition_table() {
    let mut port = port();
    let table = block_on(characterize_fsm(&mut port, "state", "data_avail", &OUTPUTS)).unwrap();

    assert_eq!(table.len(), 16);
    for state in 0..8 {
        for data_avail in 0..2 {
            assert_eq!(
                table.get(state, data_avail),
                Some(&Transition {
                    next_state: next_state(state, data_avail),
                    outputs: outputs(state),
                }),
                "state {} data_avail {}",
                state,
                data_avail
            );
        }
    }
    assert_eq!(port.get_output("data_avail").unwrap(), 0);
}

#[test]
fn characterisation_is_repeatable() {
    let mut port = port();
    let first = block_on(characterize_fsm(&mut port, "state", "data_avail", &OUTPUTS)).unwrap();
    let second = block_on(characterize_fsm(&mut port, "state", "data_avail", &OUTPUTS)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn table_prints_every_row() {
    let mut port = port();
    let table = block_on(characterize_fsm(&mut port, "state", "data_avail", &OUTPUTS)).unwrap();
    let text = table.to_string();

    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("state | data_avail | next | buf_en | out_sel | out_writing")
    );
    assert_eq!(lines.count(), 16);
    assert!(text.contains("    7 |          1 |    0 |      0 |       1 |           1"));
}

#[test]
fn unknown_input_fails() {
    let mut port = port();
    let err = block_on(characterize_fsm(&mut port, "state", "valid", &OUTPUTS)).unwrap_err();
    assert_eq!(err.to_string(), "device has no signal named `valid`");
    assert_eq!(port.dut().edges(), 0);

    let err = block_on(characterize_fsm(&mut port, "state", "data_avail", &["buf_en", "ready"]))
        .unwrap_err();
    assert_eq!(err, ScanError::UnknownSignal { name: "ready".into() });
    assert_eq!(port.dut().edges(), 0);
}

#[test]
fn state_register_too_wide() {
    let description: String = (0..64).map(|i| format!("{} state {}\n", i, i)).collect();
    let config = TestConfig::new(ScanChain::parse(&description).unwrap());
    let model = ScanModel::new(64, ShiftRegister).with_port("data_avail");
    let mut port = ScanPort::new(model, &config).unwrap();

    assert_eq!(
        block_on(characterize_fsm(&mut port, "state", "data_avail", &[])),
        Err(ScanError::TooWide { name: "state".into(), size: 64 })
    );
    assert_eq!(port.dut().edges(), 0);
}
