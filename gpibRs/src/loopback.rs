//! The loopback module provides a GPIB bus simulator for testing purposes.
//!
//! The [`LoopbackGpib`] allows to test instrument drivers without any hardware attached. It
//! checks every command the driver puts on the wire, in order, against a list of expectations,
//! and serves canned instrument replies. Adapter commands such as `++addr` go through the same
//! checking, so tests can also assert when the bus gets re-addressed.

use std::collections::VecDeque;

use crate::{GpibController, GpibError};

/// A self-incrementing index structure that by default starts at 0 and increments whenever
/// `next` is called.
#[derive(Debug, Default)]
struct IncrIndex {
    index: usize,
}

impl IncrIndex {
    fn next(&mut self) -> usize {
        let current = self.index;
        self.index += 1;
        current
    }
}

/// An interface that allows you to simply write tests for your instrument driver.
///
/// # Example
///
/// Let us build a simple instrument driver that asks the bus for the identity of the device and
/// then write a test for it using the [`LoopbackGpib`]. The driver itself would take any
/// controller that implements the [`GpibController`] trait.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use gpibrs::{GpibController, GpibError, LoopbackGpib};
///
/// struct MyInstrument<T: GpibController> {
///    bus: Arc<Mutex<T>>,
/// }
///
/// impl<T: GpibController> MyInstrument<T> {
///    fn new(bus: T) -> Self {
///        let bus = Arc::new(Mutex::new(bus));
///        MyInstrument { bus }
///    }
///
///    fn get_idn(&mut self) -> Result<String, GpibError> {
///        self.bus.lock().unwrap().get_idn()
///    }
/// }
///
/// #[cfg(test)]
/// mod tests {
///    use super::*;
///
///    /// Simple check to ensure the instrument returns its identity as expected.
///    #[test]
///    fn test_get_idn() {
///        let host2inst = vec!["*IDN?".to_string(), "++read".to_string()];
///        let inst2host = vec!["MyInstrument,1.0,1234".to_string()];
///        let terminator = "\n";  // the default terminator
///
///        // Create the loopback bus with the expected commands.
///        let loopback = LoopbackGpib::new(host2inst, inst2host, terminator);
///
///        // Create the instrument
///        let mut inst = MyInstrument::new(loopback);
///        assert_eq!("MyInstrument,1.0,1234", inst.get_idn().unwrap());
///    }
///
///    /// This test will panic as it expects a command from host to instrument that is never
///    /// sent.
///    #[test]
///    #[should_panic]
///    fn test_leftover_commands() {
///        let host2inst = vec!["*IDN?".to_string(), "++read".to_string()];
///        let inst2host = vec!["MyInstrument,1.0,1234".to_string()];
///
///        let loopback = LoopbackGpib::new(host2inst, inst2host, "\n");
///        let mut inst = MyInstrument::new(loopback);
///
///        // Instrument dropped here -> panics as host2inst and inst2host have unused commands.
///    }
/// }
/// ```
pub struct LoopbackGpib {
    from_host: Vec<String>,
    from_inst: Vec<String>,
    terminator_exp: String,
    from_host_index: IncrIndex,
    from_inst_index: IncrIndex,
    curr_bytes: VecDeque<u8>,
    terminator: String,
    current_address: Option<u8>,
}

impl LoopbackGpib {
    /// Create a new loopback bus with given commands to and from the instrument.
    ///
    /// The main purpose of this interface is to provide a simple loopback bus for testing of
    /// instrument drivers. To do so, you can provide a list of commands that are expected to go
    /// from the host to the instrument, and a list of replies that the instrument sends back to
    /// the host. The commands are read in order. At the end, when the [`LoopbackGpib`] is
    /// dropped, a `finalize` function is called that checks if all commands that you have
    /// provided have been used. If not, the program panics. During instrument calls, whenever
    /// something is sent to the bus that is not expected, the [`LoopbackGpib`] will panic as
    /// well. This way, your tests can ensure easily that all commands that you have provided
    /// are used in the correct order.
    ///
    /// # Arguments:
    /// * `from_host` - Commands from host to instrument, including `++` adapter commands.
    /// * `from_inst` - Replies from instrument to host.
    /// * `terminator_exp` - The expected terminator. This is required for every instantiation
    ///   of the loopback bus.
    pub fn new(from_host: Vec<String>, from_inst: Vec<String>, terminator_exp: &str) -> Self {
        LoopbackGpib {
            from_host,
            from_inst,
            terminator_exp: terminator_exp.to_string(),
            from_host_index: IncrIndex::default(),
            from_inst_index: IncrIndex::default(),
            curr_bytes: VecDeque::new(),
            terminator: "\n".to_string(), // default terminator of the controller layer
            current_address: None,
        }
    }

    /// This command panics if not all commands in the [`LoopbackGpib`] have been used.
    ///
    /// It is automatically called when the [`LoopbackGpib`] is dropped, but you can also call
    /// it manually to ensure that all commands have been used.
    pub fn finalize(&mut self) {
        let from_host_leftover = self.from_host.get(self.from_host_index.next());
        let from_inst_leftover = self.from_inst.get(self.from_inst_index.next());
        if let Some(fil) = from_host_leftover {
            panic!("Leftover expected commands found from host to instrument: {fil}");
        }
        if let Some(fil) = from_inst_leftover {
            panic!("Leftover expected commands found from instrument to host: {fil}");
        }
    }

    /// Test the controller's terminator and ensure the right one is set.
    ///
    /// The correct terminator can either be the default one or the one that is set when the
    /// bus was initialized via the `set_terminator` function.
    pub fn test_terminator(&self, expected_terminator: &str) {
        assert_eq!(
            expected_terminator, self.terminator,
            "Expected terminator '{expected_terminator}', got '{}'",
            self.terminator
        );
    }

    /// Get the next command from host to instrument, or panic.
    fn get_next_from_host(&mut self) -> &str {
        self.from_host
            .get(self.from_host_index.next())
            .expect("No more commands were expected from host to instrument.")
    }

    /// Get the next command from instrument to host, or panic.
    fn get_next_from_inst(&mut self) -> &str {
        self.from_inst
            .get(self.from_inst_index.next())
            .expect("No more commands were expected from instrument to host.")
    }

    /// Get the next command from host to instrument as a string including the terminator.
    fn get_next_from_host_with_terminator(&mut self) -> String {
        let cmd = self.get_next_from_host().to_string();
        format!("{cmd}{}", self.terminator_exp)
    }

    /// Get the next command from instrument to host as a string including the terminator.
    fn get_next_from_inst_with_terminator(&mut self) -> String {
        let cmd = self.get_next_from_inst().to_string();
        format!("{cmd}{}", self.terminator_exp)
    }

    /// Function to read exactly one byte from the next command from the instrument.
    ///
    /// This just panics if there are no more commands. If there are no more commands but one is
    /// required, the panic is justified as this is a test interface.
    fn read_one_byte(&mut self) -> u8 {
        match self.curr_bytes.pop_front() {
            Some(byte) => byte,
            None => {
                let next_cmd = self.get_next_from_inst_with_terminator();
                self.curr_bytes = next_cmd.as_bytes().iter().copied().collect();
                self.read_one_byte()
            }
        }
    }
}

impl GpibController for LoopbackGpib {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), GpibError> {
        for byte in buf.iter_mut() {
            *byte = self.read_one_byte();
        }
        Ok(())
    }

    fn get_terminator(&self) -> &str {
        self.terminator.as_str()
    }

    fn set_terminator(&mut self, terminator: &str) {
        self.terminator = terminator.to_string();
    }

    fn current_address(&self) -> Option<u8> {
        self.current_address
    }

    fn record_address(&mut self, addr: u8) {
        self.current_address = Some(addr);
    }

    fn write_raw(&mut self, cmd: &[u8]) -> Result<(), GpibError> {
        let exp = self.get_next_from_host_with_terminator();
        assert_eq!(
            exp.as_bytes(),
            cmd,
            "Expected sendcmd '{0}', got '{1:?}'",
            exp,
            str::from_utf8(cmd)
        );
        Ok(())
    }
}

impl Drop for LoopbackGpib {
    fn drop(&mut self) {
        // A second panic while unwinding would abort the whole test process.
        if !std::thread::panicking() {
            self.finalize();
        }
    }
}

// Tests of internal functionality
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incrementing_index() {
        let mut idx = IncrIndex::default();
        assert_eq!(0, idx.next());
        assert_eq!(1, idx.next());
        assert_eq!(2, idx.next());
    }
}
