//! Tests for the [`PrologixGpib`] controller itself.
//!
//! Note that much of the functionality of the [`GpibController`] trait is tested in the
//! [`gpibrs::LoopbackGpib`] tests. A [`VecDeque<u8>`] serves as the byte port here: writes are
//! appended at the back, reads pop from the front.

use std::{collections::VecDeque, time::Duration};

use rstest::*;

use gpibrs::{GpibController, GpibError, PrologixGpib};

/// Set up an empty controller with default 3 second timeout.
#[fixture]
fn empt_bus() -> PrologixGpib<VecDeque<u8>> {
    PrologixGpib::new(VecDeque::new(), Duration::from_secs(3))
}

/// Set up a controller with no terminator in the port data and no timeout duration.
#[fixture]
fn no_term_bus() -> PrologixGpib<VecDeque<u8>> {
    PrologixGpib::new(
        VecDeque::from(vec![b'r', b'e', b's', b'p']),
        Duration::from_secs(0),
    )
}

#[rstest]
fn test_prologix_terminator(mut empt_bus: PrologixGpib<VecDeque<u8>>) {
    assert_eq!(empt_bus.get_terminator(), "\n");

    empt_bus.set_terminator("\r\n");
    assert_eq!(empt_bus.get_terminator(), "\r\n");
}

#[rstest]
fn test_prologix_timeout(empt_bus: PrologixGpib<VecDeque<u8>>) {
    assert_eq!(empt_bus.get_timeout(), Duration::from_secs(3));
}

#[rstest]
fn test_prologix_write_read(mut empt_bus: PrologixGpib<VecDeque<u8>>) {
    let data = b"Hello, GPIB!";
    empt_bus.write_raw(data).unwrap();

    let mut buf = vec![0; data.len()];
    empt_bus.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, data);
}

#[rstest]
fn test_prologix_read_until_terminator_timeout(mut no_term_bus: PrologixGpib<VecDeque<u8>>) {
    let timeout_exp = Duration::from_secs(0);

    match no_term_bus.read_until_terminator() {
        Err(GpibError::Timeout(timeout)) => {
            assert_eq!(timeout_exp, timeout);
        }
        _ => panic!("Expected timeout error, but got a different result."),
    }
}

#[rstest]
fn test_prologix_query_timeout(mut no_term_bus: PrologixGpib<VecDeque<u8>>) {
    let timeout_exp = Duration::from_secs(0);
    let query_exp = "QUERY";

    match no_term_bus.query(query_exp) {
        Err(GpibError::TimeoutQuery { query, timeout }) => {
            assert_eq!(query_exp, query);
            assert_eq!(timeout_exp, timeout);
        }
        _ => panic!("Expected timeout error, but got a different result."),
    }
}

/// Address selection puts `++addr` on the wire and records the selection.
#[rstest]
fn test_prologix_set_address(mut empt_bus: PrologixGpib<VecDeque<u8>>) {
    assert_eq!(empt_bus.current_address(), None);

    empt_bus.set_address(12).unwrap();
    assert_eq!(empt_bus.current_address(), Some(12));

    let exp = b"++addr 12\n";
    let mut buf = vec![0; exp.len()];
    empt_bus.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, exp);
}

#[rstest]
#[case(0)]
#[case(31)]
fn test_prologix_set_address_out_of_range(
    mut empt_bus: PrologixGpib<VecDeque<u8>>,
    #[case] addr: u8,
) {
    assert!(empt_bus.set_address(addr).is_err());
    assert_eq!(empt_bus.current_address(), None);
}

/// Controller initialization selects controller-in-charge mode without read-after-write.
#[rstest]
fn test_prologix_init_controller(mut empt_bus: PrologixGpib<VecDeque<u8>>) {
    empt_bus.init_controller().unwrap();

    let exp = b"++mode 1\n++auto 0\n";
    let mut buf = vec![0; exp.len()];
    empt_bus.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, exp);
}

#[rstest]
fn test_prologix_local(mut empt_bus: PrologixGpib<VecDeque<u8>>) {
    empt_bus.local().unwrap();

    let exp = b"++loc\n";
    let mut buf = vec![0; exp.len()];
    empt_bus.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, exp);
}
