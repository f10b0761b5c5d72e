//! Test cases for the LoopbackGpib bus simulator.

use rstest::*;

use gpibrs::{GpibController, LoopbackGpib};

/// A function that creates a new `LoopbackGpib` with the given input and output vectors.
fn crt_lbk(from_host: Vec<&str>, from_inst: Vec<&str>) -> LoopbackGpib {
    let h2i: Vec<String> = from_host.iter().map(|s| s.to_string()).collect();
    let i2h: Vec<String> = from_inst.iter().map(|s| s.to_string()).collect();
    LoopbackGpib::new(h2i, i2h, "\n")
}

/// Create a loopback bus that contains no commands.
#[fixture]
fn emp_lbk() -> LoopbackGpib {
    crt_lbk(vec![], vec![])
}

/// Ensure `finalize` method passes if an empty loopback bus is used.
#[rstest]
fn finalize_test(mut emp_lbk: LoopbackGpib) {
    emp_lbk.finalize();
}

/// Ensure `finalize` method panics if commands are left in the loopback bus.
#[rstest]
#[case(vec!["cmd"], vec![])]
#[case(vec![], vec!["resp"])]
#[case(vec!["cmd"], vec!["resp"])]
#[should_panic]
fn finalize_test_panic(#[case] from_host: Vec<&str>, #[case] from_inst: Vec<&str>) {
    let mut lbk = crt_lbk(from_host, from_inst);
    lbk.finalize();
}

#[rstest]
fn sendcmd() {
    let mut lbk = crt_lbk(vec!["cmd1", "cmd2"], vec![]);
    lbk.sendcmd("cmd1").unwrap();
    lbk.sendcmd("cmd2").unwrap();
    lbk.finalize();
}

#[rstest]
#[should_panic]
fn sendcmd_mismatch() {
    let mut lbk = crt_lbk(vec!["cmd1"], vec![]);
    let _ = lbk.sendcmd("cmd3");
}

#[rstest]
fn terminator(mut emp_lbk: LoopbackGpib) {
    emp_lbk.test_terminator("\n");
    emp_lbk.set_terminator("\r\n");
    emp_lbk.test_terminator("\r\n");
}

#[rstest]
#[should_panic]
fn terminator_wrong(emp_lbk: LoopbackGpib) {
    emp_lbk.test_terminator("\r\n");
}

#[rstest]
fn query() {
    let mut lbk = crt_lbk(vec!["cmd1", "cmd2"], vec!["resp1", "resp2"]);
    let resp1 = lbk.query("cmd1").unwrap();
    assert_eq!(resp1, "resp1");
    let resp2 = lbk.query("cmd2").unwrap();
    assert_eq!(resp2, "resp2");
    lbk.finalize();
}

/// Address selection goes through the same wire checking as any other command.
#[rstest]
fn set_address() {
    let mut lbk = crt_lbk(vec!["++addr 7"], vec![]);
    assert_eq!(lbk.current_address(), None);
    lbk.set_address(7).unwrap();
    assert_eq!(lbk.current_address(), Some(7));
    lbk.finalize();
}

#[rstest]
fn get_idn() {
    let mut lbk = crt_lbk(vec!["*IDN?", "++read"], vec!["HEWLETT-PACKARD,6612C,0,A.01.04"]);
    assert_eq!(lbk.get_idn().unwrap(), "HEWLETT-PACKARD,6612C,0,A.01.04");
    lbk.finalize();
}

#[rstest]
fn local() {
    let mut lbk = crt_lbk(vec!["++loc"], vec![]);
    lbk.local().unwrap();
    lbk.finalize();
}
