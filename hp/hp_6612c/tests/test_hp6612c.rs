//! Tests for the HP 6612C power supply driver.

use std::sync::{Arc, Mutex};

use measurements::{Current, Voltage};
use rstest::*;

use gpibrs::{GpibError, LoopbackGpib};

use hp_6612c::*;

// GPIB address used for the instrument throughout the tests.
const ADDR: u8 = 5;

// Type alias for the loopback bus with the Hp6612c driver.
type Hp6612cLbk = Hp6612c<LoopbackGpib>;

/// Function that creates a new Hp6612c instance with the given input and output commands.
///
/// The first-time addressing traffic that construction puts on the wire (`++addr`, `++eor 2`)
/// is prepended to the expectations automatically.
fn crt_inst(host2inst: Vec<&str>, inst2host: Vec<&str>) -> Hp6612cLbk {
    let term = "\n";
    let mut h2i: Vec<String> = vec![format!("++addr {ADDR}"), "++eor 2".to_string()];
    h2i.extend(host2inst.iter().map(|s| s.to_string()));
    let i2h: Vec<String> = inst2host.iter().map(|s| s.to_string()).collect();
    let bus = LoopbackGpib::new(h2i, i2h, term);
    Hp6612c::try_new(bus, ADDR).unwrap()
}

/// A fixture that expects nothing but the construction traffic.
#[fixture]
fn emp_inst() -> Hp6612cLbk {
    crt_inst(vec![], vec![])
}

/// Construction selects the instrument and configures the adapter terminator, nothing else.
#[rstest]
fn test_initialization(_emp_inst: Hp6612cLbk) {}

/// An address outside the GPIB range is rejected at construction.
#[rstest]
fn test_initialization_address_out_of_range() {
    let bus = LoopbackGpib::new(vec![], vec![], "\n");
    match Hp6612c::try_new(bus, 31) {
        Err(GpibError::AddressOutOfRange { addr }) => assert_eq!(addr, 31),
        _ => panic!("Expected AddressOutOfRange error"),
    }
}

#[rstest]
fn test_get_idn() {
    let mut inst = crt_inst(
        vec!["*IDN?", "++read"],
        vec!["HEWLETT-PACKARD,6612C,0,A.01.04"],
    );
    assert_eq!(inst.get_idn().unwrap(), "HEWLETT-PACKARD,6612C,0,A.01.04");
}

#[rstest]
fn test_reset() {
    let mut inst = crt_inst(vec!["*CLS"], vec![]);
    inst.reset().unwrap();
}

#[rstest]
#[case(true, "OUTP ON")]
#[case(false, "OUTP OFF")]
fn test_set_output_state(#[case] on: bool, #[case] cmd: &str) {
    let mut inst = crt_inst(vec![cmd], vec![]);
    inst.set_output_state(on).unwrap();
}

#[rstest]
#[case("1", true)]
#[case("0", false)]
fn test_get_output_state(#[case] reply: &str, #[case] exp: bool) {
    let mut inst = crt_inst(vec!["OUTP?", "++read"], vec![reply]);
    assert_eq!(inst.get_output_state().unwrap(), exp);
}

/// Setpoints within range go out with exactly three decimal places.
#[rstest]
#[case(0.0, "VOLT 0.000")]
#[case(12.345, "VOLT 12.345")]
#[case(20.475, "VOLT 20.475")]
fn test_set_voltage(#[case] volts: f64, #[case] cmd: &str) {
    let mut inst = crt_inst(vec![cmd], vec![]);
    inst.set_voltage(Voltage::from_volts(volts)).unwrap();
}

/// Out-of-range setpoints are rejected locally; the fixture proves no traffic goes out.
#[rstest]
#[case(-0.1)]
#[case(20.5)]
fn test_set_voltage_out_of_range(mut emp_inst: Hp6612cLbk, #[case] volts: f64) {
    match emp_inst.set_voltage(Voltage::from_volts(volts)) {
        Err(GpibError::FloatValueOutOfRange { min, max, .. }) => {
            assert_eq!(min, 0.0);
            assert_eq!(max, VOLTAGE_MAX_V);
        }
        _ => panic!("Expected FloatValueOutOfRange error"),
    }
}

#[rstest]
#[case(0.0, "CURR 0.000")]
#[case(0.5, "CURR 0.500")]
#[case(2.0, "CURR 2.000")]
fn test_set_current(#[case] amps: f64, #[case] cmd: &str) {
    let mut inst = crt_inst(vec![cmd], vec![]);
    inst.set_current(Current::from_amperes(amps)).unwrap();
}

#[rstest]
#[case(-0.1)]
#[case(2.5)]
fn test_set_current_out_of_range(mut emp_inst: Hp6612cLbk, #[case] amps: f64) {
    match emp_inst.set_current(Current::from_amperes(amps)) {
        Err(GpibError::FloatValueOutOfRange { min, max, .. }) => {
            assert_eq!(min, 0.0);
            assert_eq!(max, CURRENT_MAX_A);
        }
        _ => panic!("Expected FloatValueOutOfRange error"),
    }
}

/// Both setpoints go out in one combined command.
#[rstest]
fn test_set_voltage_current() {
    let mut inst = crt_inst(vec!["VOLT 12.000;CURR 1.500"], vec![]);
    inst.set_voltage_current(Voltage::from_volts(12.0), Current::from_amperes(1.5))
        .unwrap();
}

/// The combined set is rejected as a whole if either value is out of range.
#[rstest]
#[case(21.0, 1.0)]
#[case(12.0, 2.5)]
#[case(-1.0, -1.0)]
fn test_set_voltage_current_out_of_range(
    mut emp_inst: Hp6612cLbk,
    #[case] volts: f64,
    #[case] amps: f64,
) {
    let result =
        emp_inst.set_voltage_current(Voltage::from_volts(volts), Current::from_amperes(amps));
    assert!(matches!(
        result,
        Err(GpibError::FloatValueOutOfRange { .. })
    ));
}

#[rstest]
fn test_get_voltage() {
    let mut inst = crt_inst(vec!["MEAS:VOLT?", "++read"], vec!["12.345"]);
    let voltage = inst.get_voltage().unwrap();
    assert_eq!(voltage.as_volts(), 12.345);
}

/// A malformed or empty measurement reply turns into a parse error, not a panic.
#[rstest]
#[case("ERR")]
#[case("")]
fn test_get_voltage_parse_error(#[case] reply: &str) {
    let mut inst = crt_inst(vec!["MEAS:VOLT?", "++read"], vec![reply]);
    match inst.get_voltage() {
        Err(GpibError::ResponseParseError(resp)) => assert_eq!(resp, reply),
        _ => panic!("Expected ResponseParseError"),
    }
}

#[rstest]
fn test_get_current() {
    let mut inst = crt_inst(vec!["MEAS:CURR?", "++read"], vec!["1.234"]);
    let current = inst.get_current().unwrap();
    assert_eq!(current.as_amperes(), 1.234);
}

#[rstest]
fn test_get_current_parse_error() {
    let mut inst = crt_inst(vec!["MEAS:CURR?", "++read"], vec!["ERR"]);
    assert!(inst.get_current().is_err());
}

#[rstest]
#[case(true, "DISP:STATE ON")]
#[case(false, "DISP:STATE OFF")]
fn test_set_display_state(#[case] on: bool, #[case] cmd: &str) {
    let mut inst = crt_inst(vec![cmd], vec![]);
    inst.set_display_state(on).unwrap();
}

/// The mode switch to text is only sent on the transition, not on every text update.
#[rstest]
fn test_set_display_text_mode_switch_once() {
    let mut inst = crt_inst(
        vec![
            "DISP:MODE TEXT",
            "DISP:TEXT \"HELLO\"",
            "DISP:TEXT \"WORLD\"",
        ],
        vec![],
    );
    assert_eq!(inst.display_mode(), DisplayMode::Normal);

    inst.set_display_text("HELLO").unwrap();
    inst.set_display_text("WORLD").unwrap();
    assert_eq!(inst.display_mode(), DisplayMode::Text);
}

/// Going back to normal mode resets the cache, so the next text sends the mode switch again.
#[rstest]
fn test_set_display_normal_resets_cache() {
    let mut inst = crt_inst(
        vec![
            "DISP:MODE TEXT",
            "DISP:TEXT \"X\"",
            "DISP:MODE NORM",
            "DISP:MODE TEXT",
            "DISP:TEXT \"Y\"",
        ],
        vec![],
    );
    inst.set_display_text("X").unwrap();
    inst.set_display_normal().unwrap();
    assert_eq!(inst.display_mode(), DisplayMode::Normal);
    inst.set_display_text("Y").unwrap();
}

/// Setting normal mode while already normal still sends the idempotent command.
#[rstest]
fn test_set_display_normal_when_normal() {
    let mut inst = crt_inst(vec!["DISP:MODE NORM"], vec![]);
    inst.set_display_normal().unwrap();
    assert_eq!(inst.display_mode(), DisplayMode::Normal);
}

/// The reply comes back in double quotes; they are stripped.
#[rstest]
fn test_get_display_text() {
    let mut inst = crt_inst(vec!["DISP:TEXT?", "++read"], vec!["\"HELLO\""]);
    assert_eq!(inst.get_display_text().unwrap(), "HELLO");
}

/// The error queue reply is passed through untouched, quotes included.
#[rstest]
fn test_get_error() {
    let mut inst = crt_inst(vec!["SYST:ERR?", "++read"], vec!["+0,\"No error\""]);
    assert_eq!(inst.get_error().unwrap(), "+0,\"No error\"");
}

#[rstest]
fn test_local() {
    let mut inst = crt_inst(vec!["++loc"], vec![]);
    inst.local().unwrap();
}

#[rstest]
fn test_display_impl(emp_inst: Hp6612cLbk) {
    assert_eq!(format!("{emp_inst}"), "HP 6612C address: 5");
    assert_eq!(emp_inst.address(), ADDR);
}

/// Two drivers on one shared bus: the driver re-addresses its instrument after another device
/// was selected in between, and skips the addressing when the bus is still on its address.
#[rstest]
fn test_shared_bus_readdressing() {
    let h2i: Vec<String> = vec![
        "++addr 5", "++eor 2", // psu1 construction
        "++addr 6", "++eor 2", // psu2 construction steals the bus
        "++addr 5", "++eor 2", "OUTP ON",  // psu1 re-addresses before its command
        "OUTP OFF", // bus still on 5, no addressing traffic
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let bus = Arc::new(Mutex::new(LoopbackGpib::new(h2i, vec![], "\n")));

    let mut psu1 = Hp6612c::try_new_shared(Arc::clone(&bus), 5).unwrap();
    let _psu2 = Hp6612c::try_new_shared(Arc::clone(&bus), 6).unwrap();

    psu1.set_output_state(true).unwrap();
    psu1.set_output_state(false).unwrap();
}

/// A rejected setpoint performs no bus traffic at all, not even re-addressing.
#[rstest]
fn test_out_of_range_setpoint_no_io() {
    let h2i: Vec<String> = vec!["++addr 5", "++eor 2", "++addr 6", "++eor 2"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let bus = Arc::new(Mutex::new(LoopbackGpib::new(h2i, vec![], "\n")));

    let mut psu1 = Hp6612c::try_new_shared(Arc::clone(&bus), 5).unwrap();
    let _psu2 = Hp6612c::try_new_shared(Arc::clone(&bus), 6).unwrap();

    // the bus is on address 6 now; a valid setpoint would have to re-address first
    assert!(psu1.set_voltage(Voltage::from_volts(21.0)).is_err());
}
