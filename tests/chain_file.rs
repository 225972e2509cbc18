use std::io::Write;

use scan_chain::chain::ScanChain;
use scan_chain::config::TestConfig;
use scan_chain::error::ParseError;

fn description_file(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_hidden_fsm_log() {
    let file = description_file("0 current_state 0\n1 current_state 1\n2 current_state 2\n");
    let config = TestConfig::from_file(file.path()).unwrap();
    assert_eq!(config.chain_length(), 3);
    let reg = config.chain.register("current_state").unwrap();
    assert_eq!(reg.index_list(), &[0, 1, 2]);
    assert_eq!(config.clock.half_period, 10);
    assert_eq!(config.pins.scan_out, "scan_out");
}

#[test]
fn errors_carry_line_numbers() {
    let file = description_file("0 a 0\n1 a 1\n2 a one\n");
    match ScanChain::from_file(file.path()) {
        Err(ParseError::InvalidInteger { line, text, .. }) => {
            assert_eq!(line, 3);
            assert_eq!(text, "one");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ScanChain::from_file(dir.path().join("adder.log")).unwrap_err();
    assert!(matches!(err, ParseError::Io(_)));
    assert_eq!(err.to_string(), "failed to read chain description");
}
