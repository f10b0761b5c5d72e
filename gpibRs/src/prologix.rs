//! This module provides the main controller implementation for Prologix-style GPIB adapters.
//!
//! It can be called with any type that implements [`std::io::Read`] and [`std::io::Write`],
//! such as [`std::net::TcpStream`] or [`serialport::SerialPort`].

use std::time::Duration;

use thiserror::Error;

use crate::GpibController;

/// A GPIB bus controller for Prologix GPIB-USB / GPIB-Ethernet and AR488 adapters.
///
/// These adapters expose the GPIB bus over a plain byte stream: lines starting with `++` are
/// commands to the adapter itself (address selection, read requests, ...), everything else is
/// forwarded verbatim to the currently addressed instrument. This struct can be built with any
/// transport that implements [`std::io::Read`] and [`std::io::Write`]. Handy shortcuts for
/// serial and TCP/IP transports are provided as well.
///
/// # Example
///
/// The following shows a simple example on how to create a [`PrologixGpib`] controller from
/// your own transport. Of course, to just use a simple [`std::net::TcpStream`] as shown here,
/// you can also use the [`crate::TcpIpGpib`] shortcut.
///
/// ```no_run
/// use std::{net::TcpStream, time::Duration};
///
/// use gpibrs::PrologixGpib;
///
/// let port = TcpStream::connect("192.168.10.1:1234").unwrap();
/// let mut bus = PrologixGpib::new(port, Duration::from_secs(3));
/// bus.init_controller().unwrap();
/// ```
pub struct PrologixGpib<P: std::io::Read + std::io::Write> {
    port: P,
    terminator: String,
    timeout: Duration,
    current_address: Option<u8>,
}

impl<P: std::io::Read + std::io::Write> PrologixGpib<P> {
    /// Create a new instance of [`PrologixGpib`] with a given transport.
    ///
    /// No commands are sent to the adapter here; call
    /// [`PrologixGpib::init_controller`] once after construction if the adapter state is
    /// unknown.
    pub fn new(port: P, timeout: Duration) -> Self {
        Self {
            port,
            terminator: "\n".to_string(),
            timeout,
            current_address: None,
        }
    }

    /// Put the adapter into controller-in-charge mode with read-after-write disabled.
    ///
    /// Sends `++mode 1` followed by `++auto 0`. With automatic read-after-write disabled,
    /// instrument replies are only fetched when a driver explicitly requests them with
    /// `++read`, which is the exchange pattern the drivers in this workspace use.
    pub fn init_controller(&mut self) -> Result<(), GpibError> {
        self.sendcmd("++mode 1")?;
        self.sendcmd("++auto 0")
    }
}

impl<P: std::io::Read + std::io::Write> GpibController for PrologixGpib<P> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), GpibError> {
        self.port.read_exact(buf)?;
        Ok(())
    }

    fn get_terminator(&self) -> &str {
        self.terminator.as_str()
    }

    fn set_terminator(&mut self, terminator: &str) {
        self.terminator = terminator.to_string();
    }

    fn get_timeout(&self) -> Duration {
        self.timeout
    }

    fn current_address(&self) -> Option<u8> {
        self.current_address
    }

    fn record_address(&mut self, addr: u8) {
        self.current_address = Some(addr);
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), GpibError> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }
}

/// The error enum for the GPIB controller layer and all instrument drivers.
///
/// For any command sending or querying, your instrument driver should return either an empty
/// result or a result with the query where this Error is the alternative. [`GpibError`] makes
/// it easy to propagate all the sending commands, querying errors forward with the `?` operator
/// such that errors propagate nicely. If this is not possible, it is considered a bug and
/// should be reported.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GpibError {
    /// The requested GPIB primary address is outside the valid range of 1 to 30. The error
    /// contains the address that was requested.
    #[error("GPIB address {addr} is out of range. Valid primary addresses are 1 to 30.")]
    AddressOutOfRange {
        /// The address that is out of range.
        addr: u8,
    },
    /// A given float value is out of the specified range. The error contains the value that was
    /// sent, the minimum value that is allowed, and the maximum value that is allowed.
    #[error("Float value {value} is out of range. Allowed range is [{min}, {max}]")]
    FloatValueOutOfRange {
        /// The value that is out of range.
        value: f64,
        /// The minimum value that is allowed.
        min: f64,
        /// The maximum value that is allowed.
        max: f64,
    },
    /// Error when reading from/writing to a transport. See [`std::io::Error`] for more details.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Instrument response could not be parsed because it was unexpected by the driver. This
    /// error contains the response that was received from the instrument.
    #[error("Response from instrument could not be parsed. Response was: {0}")]
    ResponseParseError(String),
    #[cfg(feature = "serial")]
    /// Serial port errors can occur when opening a serial interface. See the
    /// [`serialport::Error`] documentation for more information.
    #[error(transparent)]
    Serialport(#[from] serialport::Error),
    /// Timeout occurred while waiting for a response from the bus. The error contains the
    /// timeout that was exceeded.
    #[error(
        "Timeout occured while waiting for a response from the bus. Timeout was set to {0:?}."
    )]
    Timeout(Duration),
    /// Timeout occurred while waiting for a response to a query. The error contains the query
    /// that was sent and the timeout that was exceeded.
    #[error(
        "Timeout occured while waiting for a response to query: {query}. Timeout was set to {timeout:?}."
    )]
    TimeoutQuery {
        /// The query that timed out.
        query: String,
        /// The timeout that was set.
        timeout: Duration,
    },
}
