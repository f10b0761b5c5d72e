//! Tests for the default implementation of the [`GpibController`] trait.

use std::{collections::VecDeque, io::Read, io::Write, time::Duration};

use rstest::*;

use gpibrs::{GpibController, GpibError};

struct TestController<P: Read + Write> {
    _port: P,
    address: Option<u8>,
}

impl<P: Read + Write> GpibController for TestController<P> {
    fn read_exact(&mut self, _buf: &mut [u8]) -> Result<(), GpibError> {
        Ok(())
    }

    fn write_raw(&mut self, _data: &[u8]) -> Result<(), GpibError> {
        Ok(())
    }

    fn current_address(&self) -> Option<u8> {
        self.address
    }

    fn record_address(&mut self, addr: u8) {
        self.address = Some(addr);
    }
}

#[fixture]
fn ctrl() -> TestController<VecDeque<u8>> {
    TestController {
        _port: VecDeque::new(),
        address: None,
    }
}

#[rstest]
fn test_default_get_terminator(ctrl: TestController<VecDeque<u8>>) {
    assert_eq!(ctrl.get_terminator(), "\n");
}

#[rstest]
fn test_default_get_timeout(ctrl: TestController<VecDeque<u8>>) {
    assert_eq!(ctrl.get_timeout(), Duration::from_secs(3));
}

#[rstest]
fn test_set_address_records(mut ctrl: TestController<VecDeque<u8>>) {
    assert_eq!(ctrl.current_address(), None);

    ctrl.set_address(12).unwrap();
    assert_eq!(ctrl.current_address(), Some(12));
}

#[rstest]
#[case(0)]
#[case(31)]
fn test_set_address_out_of_range(mut ctrl: TestController<VecDeque<u8>>, #[case] addr: u8) {
    match ctrl.set_address(addr) {
        Err(GpibError::AddressOutOfRange { addr: got }) => assert_eq!(addr, got),
        _ => panic!("Expected AddressOutOfRange error"),
    }
    // a rejected address must not change the bookkeeping
    assert_eq!(ctrl.current_address(), None);
}
