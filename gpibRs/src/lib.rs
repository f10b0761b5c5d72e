//! GpibRs: Talk to GPIB bus instruments from Rust
//!
//! The GpibRs library provides a standardized controller layer for instruments that sit on a
//! GPIB (IEEE-488) bus behind a Prologix-style bus adapter. To do so, it provides a
//! [`GpibController`] trait and its implementations. Furthermore, we also provide a [`GpibError`]
//! error type that instrument drivers should return.
//!
//! # Currently implemented controllers are:
//! - [`PrologixGpib`]: Prologix GPIB-USB / GPIB-Ethernet and AR488 adapters, generic over any
//!   blocking byte port. Serial ports (behind the `serial` feature, using the [`serialport`]
//!   crate) and TCP/IP sockets are supported through the [`SerialGpib`] and [`TcpIpGpib`]
//!   shortcuts.
//! - [`LoopbackGpib`]: a bus simulator for writing driver tests without hardware.
//!
//! # Goals and non-goals of this project
//!
//! GpibRs shall provide a simple framework that allows you to write your own GPIB instrument
//! driver and share it with the community. The controller owns the transport, the terminator,
//! the timeout, and the bookkeeping of which device address is currently selected on the bus.
//! Your driver only deals with the command set of its instrument and decides when the bus needs
//! to be re-addressed.
//!
//! Several driver instances can share one controller, since a GPIB bus multiplexes many
//! addressable devices over a single adapter. GpibRs does not serialize whole driver
//! transactions for you: individual bus calls are safe to share, but if you interleave drivers
//! from multiple threads you must serialize the public driver calls externally.
//!
//! # Inspiration
//!
//! This project is heavily inspired by the fantastic
//! [`instrumentkit`](https://github.com/instrumentkit/InstrumentKit) library that allows for
//! instrument control from python.
//!
//! # License
//!
//! Licensed under either of
//!
//! - Apache License, Version 2.0 ([LICENSE-APACHE](http://www.apache.org/licenses/LICENSE-2.0))
//! - MIT license ([LICENSE-MIT](http://opensource.org/licenses/MIT))
//!
//! at your option.
//!
//! # Contribution
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted
//! for inclusion in the work by you, as defined in the Apache-2.0 license, shall be
//! dual licensed as above, without any additional terms or conditions.

#![warn(missing_docs)]

mod loopback;
mod prologix;
#[cfg(feature = "serial")]
mod serial;
mod tcp_ip;

pub use loopback::LoopbackGpib;
pub use prologix::{GpibError, PrologixGpib};
#[cfg(feature = "serial")]
pub use serial::SerialGpib;
pub use tcp_ip::TcpIpGpib;

use std::time::{Duration, Instant};

/// The `GpibController` trait defines the interface for a GPIB bus controller.
///
/// A controller is the single shared gateway to a GPIB bus on which several addressable
/// instruments can live. Implementations provide the low-level byte transport plus the
/// bookkeeping of the currently selected device address; the trait supplies the line-oriented
/// command handling and the common bus verbs on top of that.
///
/// Timeouts and cancellation live in this layer. Instrument drivers are expected to propagate
/// [`GpibError`] with the `?` operator and not to retry on their own.
pub trait GpibController {
    /// Read exactly `buf.len()` bytes from the bus adapter into `buf`.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), GpibError>;

    /// Write raw bytes to the bus adapter and flush them out immediately.
    fn write_raw(&mut self, data: &[u8]) -> Result<(), GpibError>;

    /// Get the terminator that is appended to every command.
    fn get_terminator(&self) -> &str {
        "\n"
    }

    /// Set the terminator of the controller from a `&str`.
    ///
    /// # Arguments:
    /// - `_terminator` - A string slice that will be appended to commands and expected at the
    ///   end of responses.
    fn set_terminator(&mut self, _terminator: &str) {}

    /// Get the timeout for read operations.
    fn get_timeout(&self) -> Duration {
        Duration::from_secs(3)
    }

    /// The device address that was last selected on the bus.
    ///
    /// Returns `None` if no device has been selected since the controller was created. Drivers
    /// compare this against their own address to decide whether the bus must be re-addressed
    /// before a command goes out.
    fn current_address(&self) -> Option<u8>;

    /// Record the device address after an address selection went out on the wire.
    ///
    /// This is a bookkeeping hook used by [`GpibController::set_address`]; implementations only
    /// need to store the value and hand it back from [`GpibController::current_address`].
    fn record_address(&mut self, addr: u8);

    /// Send a command to the bus adapter.
    ///
    /// This function takes the command, appends the terminator, and writes it to the adapter.
    /// The transport is flushed to ensure that the command is sent immediately.
    ///
    /// # Arguments:
    /// - `cmd` - A string slice that will be sent over the bus.
    fn sendcmd(&mut self, cmd: &str) -> Result<(), GpibError> {
        let data = format!("{cmd}{}", self.get_terminator());
        self.write_raw(data.as_bytes())
    }

    /// Read from the bus until the terminator is found and return the trimmed response.
    ///
    /// The response is read character by character until it ends with the terminator. If no
    /// terminator is encountered within the timeout, a [`GpibError::Timeout`] is returned. If a
    /// non-UTF-8 byte is received, a note is printed to stderr and the byte is skipped.
    fn read_until_terminator(&mut self) -> Result<String, GpibError> {
        let mut response = String::new();
        let mut single_buf = [0u8];

        let tic = Instant::now();
        let mut timeout_occured = true;

        while (Instant::now() - tic) < self.get_timeout() {
            self.read_exact(&mut single_buf)?;
            if let Ok(val) = str::from_utf8(&single_buf) {
                response.push_str(val);
            } else {
                eprintln!("Received invalid UTF-8 data: {single_buf:?}");
            }
            if response.ends_with(self.get_terminator()) {
                timeout_occured = false;
                break;
            }
        }

        if timeout_occured {
            Err(GpibError::Timeout(self.get_timeout()))
        } else {
            response.truncate(response.len() - self.get_terminator().len());
            Ok(response.trim().to_string())
        }
    }

    /// Query the bus adapter with a command and return the response as a String.
    ///
    /// This function uses [`GpibController::sendcmd`] to send the command and then reads the
    /// response until the terminator is found.
    ///
    /// # Arguments
    /// * `cmd` - The command to send for which we expect a response.
    fn query(&mut self, cmd: &str) -> Result<String, GpibError> {
        self.sendcmd(cmd)?;
        match self.read_until_terminator() {
            Err(GpibError::Timeout(timeout)) => Err(GpibError::TimeoutQuery {
                query: cmd.to_string(),
                timeout,
            }),
            other => other,
        }
    }

    /// Select the device with the given primary address on the bus.
    ///
    /// Sends `++addr {addr}` to the adapter and records the address for
    /// [`GpibController::current_address`]. Valid primary addresses are 1 to 30; address 0
    /// belongs to the controller itself.
    ///
    /// # Arguments
    /// * `addr` - The primary GPIB address of the device to select.
    fn set_address(&mut self, addr: u8) -> Result<(), GpibError> {
        if !(1..=30).contains(&addr) {
            return Err(GpibError::AddressOutOfRange { addr });
        }
        self.sendcmd(&format!("++addr {addr}"))?;
        self.record_address(addr);
        Ok(())
    }

    /// Query the identity of the currently addressed device.
    ///
    /// Sends the `*IDN?` common command to the device and reads back its reply with `++read`.
    fn get_idn(&mut self) -> Result<String, GpibError> {
        self.sendcmd("*IDN?")?;
        self.query("++read")
    }

    /// Return the currently addressed device to local (front panel) control.
    fn local(&mut self) -> Result<(), GpibError> {
        self.sendcmd("++loc")
    }
}
