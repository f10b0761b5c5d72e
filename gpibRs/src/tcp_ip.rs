//! This module provides constructors for a Prologix-style controller over TCP/IP.
//!
//! It uses the blocking [`std::net::TcpStream`] struct. Prologix GPIB-Ethernet adapters listen
//! on TCP port 1234 and speak the same `++` command set as their USB siblings.

use std::{
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use crate::{GpibError, PrologixGpib};

/// A blocking TCP/IP transport for a Prologix-style GPIB adapter.
#[derive(Debug)]
pub struct TcpIpGpib {}

impl TcpIpGpib {
    /// Try to create a new controller connected to a GPIB-Ethernet adapter.
    ///
    /// The terminator is by default set to `"\n"`, but can be changed using the
    /// `set_terminator` function. A read and write timeout of three seconds is set on the
    /// stream, as we do not want to infinitely block on instrument communication.
    ///
    /// # Arguments
    /// * `sock_addr` - Socket address of the adapter, e.g., `"192.168.10.1:1234"`.
    pub fn try_new<A: ToSocketAddrs>(
        sock_addr: A,
    ) -> Result<PrologixGpib<TcpStream>, GpibError> {
        let stream = TcpStream::connect(sock_addr)?;
        let timeout = Duration::from_secs(3);
        stream.set_write_timeout(Some(timeout))?;
        stream.set_read_timeout(Some(timeout))?;
        Ok(PrologixGpib::new(stream, timeout))
    }
}
