//! This module provides constructors for a Prologix-style controller on a serial port.
//!
//! It uses the blocking implementation of the [`serialport`] crate. Prologix GPIB-USB and
//! AR488 adapters enumerate as a plain USB CDC serial device.

use std::time::Duration;

use serialport::{SerialPort, SerialPortBuilder};

use crate::{GpibError, PrologixGpib};

/// A serial port transport for a Prologix-style GPIB adapter.
///
/// Builds a [`PrologixGpib`] controller on top of a blocking serial port.
#[derive(Debug)]
pub struct SerialGpib {}

impl SerialGpib {
    /// Try to create a controller with a simple serial port configuration.
    ///
    /// The serial port is opened with a baud rate of 115200, eight data bits, no parity, one
    /// stop bit, and a timeout of 3 seconds. USB adapters ignore the baud rate setting, so this
    /// configuration works for all of them. If you need further configuration options, use the
    /// [`SerialGpib::full`] method.
    ///
    /// # Arguments
    /// * `port` - The name of the serial port, e.g., `"/dev/ttyUSB0"` or `"COM3"`.
    pub fn simple(port: &str) -> Result<PrologixGpib<Box<dyn SerialPort>>, GpibError> {
        let timeout = Duration::from_secs(3);
        let spb = serialport::new(port, 115200).timeout(timeout);
        SerialGpib::full(spb)
    }

    /// Try to create a controller from a fully configured [`serialport::SerialPortBuilder`].
    ///
    /// The timeout of the controller is taken over from the builder.
    ///
    /// # Arguments
    /// * `spb` - A `SerialPortBuilder` to configure the serial port. See
    ///   [`serialport::SerialPortBuilder`] and the [`serialport::new`] function for more
    ///   details.
    pub fn full(spb: SerialPortBuilder) -> Result<PrologixGpib<Box<dyn SerialPort>>, GpibError> {
        let port = spb.open()?;
        let timeout = port.timeout();
        Ok(PrologixGpib::new(port, timeout))
    }
}
