//! A rust driver for the HP 6612C 20 V / 2 A power supply.
//!
//! The HP 6612C sits on a GPIB bus, so this driver talks through a [`GpibController`] that can
//! be shared with other instruments on the same bus. The driver re-selects its own address on
//! the bus whenever another device was addressed in between.
//!
//! # Example
//!
//! This example shows the usage via a Prologix GPIB-USB adapter on a serial port.
//! ```no_run
//! use gpibrs::SerialGpib;
//! use hp_6612c::Hp6612c;
//! use measurements::{Current, Voltage};
//!
//! // The port where the GPIB adapter is connected to
//! let port = "/dev/ttyUSB0";
//!
//! // Open the bus and create the power supply driver for GPIB address 5. The instrument is
//! // selected on the bus right away.
//! let bus = SerialGpib::simple(port).expect("Failed to open serial port");
//! let mut psu = Hp6612c::try_new(bus, 5).unwrap();
//!
//! // Query the identity of the instrument
//! println!("{}", psu.get_idn().unwrap());
//!
//! // Program 12 V / 0.5 A, enable the output, and read the measured voltage back
//! psu.set_voltage_current(Voltage::from_volts(12.0), Current::from_amperes(0.5))
//!     .unwrap();
//! psu.set_output_state(true).unwrap();
//! println!("Measured voltage: {}", psu.get_voltage().unwrap());
//! ```

#![warn(missing_docs)]

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use gpibrs::{GpibController, GpibError};

use measurements::{Current, Voltage};

/// The maximum programmable output voltage in volt.
pub const VOLTAGE_MAX_V: f64 = 20.475;

/// The maximum programmable output current in ampere.
pub const CURRENT_MAX_A: f64 = 2.0475;

/// Enum representing the mode the front panel display is in.
///
/// The driver keeps the last mode it set as a local cache and does not query it back from the
/// hardware.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// The display shows the measured output values.
    #[default]
    Normal,
    /// The display shows a user supplied text.
    Text,
}

impl Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayMode::Normal => write!(f, "normal"),
            DisplayMode::Text => write!(f, "text"),
        }
    }
}

/// A rust driver for the HP 6612C power supply.
///
/// The driver takes any controller that implements the [`GpibController`] trait. Since a GPIB
/// bus multiplexes several instruments over one controller, the driver checks before every
/// command whether the bus is still addressed to its instrument and re-selects it if not. See
/// the top-level documentation for an example on how to use this driver.
pub struct Hp6612c<T: GpibController> {
    bus: Arc<Mutex<T>>,
    address: u8,
    display_mode: DisplayMode,
    addressed: bool,
}

impl<T: GpibController> Hp6612c<T> {
    /// Create a new HP 6612C instance with the given GPIB controller.
    ///
    /// The instrument is selected on the bus and the end-of-response terminator of the adapter
    /// is configured before this function returns.
    ///
    /// # Arguments
    /// * `bus` - A GPIB controller that implements the [`GpibController`] trait.
    /// * `address` - The primary GPIB address of the instrument, 1 to 30.
    pub fn try_new(bus: T, address: u8) -> Result<Self, GpibError> {
        Self::try_new_shared(Arc::new(Mutex::new(bus)), address)
    }

    /// Create a new HP 6612C instance on a controller that is shared with other instruments.
    ///
    /// Use this constructor when several driver instances multiplex one physical bus. Note that
    /// the drivers re-address the bus between public calls, but a single call is not atomic
    /// across its round trips: callers on multiple threads must serialize the public calls
    /// externally.
    ///
    /// # Arguments
    /// * `bus` - The shared GPIB controller.
    /// * `address` - The primary GPIB address of the instrument, 1 to 30.
    pub fn try_new_shared(bus: Arc<Mutex<T>>, address: u8) -> Result<Self, GpibError> {
        let mut instrument = Hp6612c {
            bus,
            address,
            display_mode: DisplayMode::Normal,
            addressed: false,
        };
        instrument.select()?;
        Ok(instrument)
    }

    /// Get the primary GPIB address of this instrument.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Get the display mode the driver last set.
    ///
    /// This is the local cache, not a hardware query.
    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Query the identity of the instrument.
    ///
    /// Returns the `*IDN?` response of the instrument, e.g.,
    /// `HEWLETT-PACKARD,6612C,0,A.01.04`.
    pub fn get_idn(&mut self) -> Result<String, GpibError> {
        self.select()?;
        let mut bus = self.bus.lock().expect("Mutex should not be poisoned");
        bus.get_idn()
    }

    /// Reset the instrument to its default state.
    ///
    /// This clears the error and status registers of the instrument.
    pub fn reset(&mut self) -> Result<(), GpibError> {
        self.sendcmd("*CLS")
    }

    /// Switch the output on or off.
    ///
    /// # Arguments
    /// * `on` - `true` to enable the output, `false` to disable it.
    pub fn set_output_state(&mut self, on: bool) -> Result<(), GpibError> {
        self.sendcmd(if on { "OUTP ON" } else { "OUTP OFF" })
    }

    /// Get the output state.
    ///
    /// Returns `true` if the output is enabled, otherwise `false`.
    pub fn get_output_state(&mut self) -> Result<bool, GpibError> {
        Ok(self.query("OUTP?")? == "1")
    }

    /// Set the output voltage.
    ///
    /// The value is rejected locally, without any bus traffic, if it is outside the range of 0
    /// to 20.475 V that the instrument can program.
    ///
    /// # Arguments
    /// * `voltage` - The voltage to program.
    pub fn set_voltage(&mut self, voltage: Voltage) -> Result<(), GpibError> {
        let volts = check_voltage(&voltage)?;
        self.sendcmd(&format!("VOLT {volts:.3}"))
    }

    /// Return the measured output voltage.
    pub fn get_voltage(&mut self) -> Result<Voltage, GpibError> {
        let resp = self.query("MEAS:VOLT?")?;
        let val = resp
            .trim()
            .parse::<f64>()
            .map_err(|_| GpibError::ResponseParseError(resp))?;
        Ok(Voltage::from_volts(val))
    }

    /// Set the output current limit.
    ///
    /// The value is rejected locally, without any bus traffic, if it is outside the range of 0
    /// to 2.0475 A that the instrument can program.
    ///
    /// # Arguments
    /// * `current` - The current to program.
    pub fn set_current(&mut self, current: Current) -> Result<(), GpibError> {
        let amps = check_current(&current)?;
        self.sendcmd(&format!("CURR {amps:.3}"))
    }

    /// Return the measured output current.
    pub fn get_current(&mut self) -> Result<Current, GpibError> {
        let resp = self.query("MEAS:CURR?")?;
        let val = resp
            .trim()
            .parse::<f64>()
            .map_err(|_| GpibError::ResponseParseError(resp))?;
        Ok(Current::from_amperes(val))
    }

    /// Set the output voltage and current limit with a single command.
    ///
    /// Both values are range checked before anything goes out on the bus; if either is out of
    /// range, nothing is sent.
    ///
    /// # Arguments
    /// * `voltage` - The voltage to program.
    /// * `current` - The current to program.
    pub fn set_voltage_current(
        &mut self,
        voltage: Voltage,
        current: Current,
    ) -> Result<(), GpibError> {
        let volts = check_voltage(&voltage)?;
        let amps = check_current(&current)?;
        self.sendcmd(&format!("VOLT {volts:.3};CURR {amps:.3}"))
    }

    /// Switch the front panel display on or off.
    ///
    /// # Arguments
    /// * `on` - `true` to switch the display on, `false` to switch it off.
    pub fn set_display_state(&mut self, on: bool) -> Result<(), GpibError> {
        self.sendcmd(if on { "DISP:STATE ON" } else { "DISP:STATE OFF" })
    }

    /// Set the display to normal mode, showing the measured output values.
    pub fn set_display_normal(&mut self) -> Result<(), GpibError> {
        self.sendcmd("DISP:MODE NORM")?;
        self.display_mode = DisplayMode::Normal;
        Ok(())
    }

    /// Set a custom text on the display.
    ///
    /// The display fits at most 14 characters; longer texts are not rejected here but will be
    /// truncated by the instrument. Double quotes in the text are not escaped. The mode switch
    /// to text mode is only sent when the cached display mode is not already
    /// [`DisplayMode::Text`].
    ///
    /// # Arguments
    /// * `text` - The text to show on the display.
    pub fn set_display_text(&mut self, text: &str) -> Result<(), GpibError> {
        if self.display_mode != DisplayMode::Text {
            self.sendcmd("DISP:MODE TEXT")?;
            self.display_mode = DisplayMode::Text;
        }
        self.sendcmd(&format!("DISP:TEXT \"{text}\""))
    }

    /// Get the custom text currently on the display.
    ///
    /// The instrument replies with the text in double quotes; all double quotes are stripped
    /// from the reply.
    pub fn get_display_text(&mut self) -> Result<String, GpibError> {
        Ok(self.query("DISP:TEXT?")?.replace('"', ""))
    }

    /// Get the oldest entry from the error queue of the instrument.
    ///
    /// Returns the raw reply, e.g., `+0,"No error"`.
    pub fn get_error(&mut self) -> Result<String, GpibError> {
        self.query("SYST:ERR?")
    }

    /// Return the instrument to local mode, re-enabling the front panel controls.
    pub fn local(&mut self) -> Result<(), GpibError> {
        self.select()?;
        let mut bus = self.bus.lock().expect("Mutex should not be poisoned");
        bus.local()
    }

    /// Ensure the bus is addressed to this instrument before a command goes out.
    ///
    /// The bus can only be addressed to one device at a time. Whenever another device was
    /// selected in between, or this is the first command of this driver instance, the
    /// instrument is selected and the end-of-response terminator of the adapter is configured.
    /// The first-time flag is only cleared once both commands went through.
    fn select(&mut self) -> Result<(), GpibError> {
        let mut bus = self.bus.lock().expect("Mutex should not be poisoned");
        if bus.current_address() != Some(self.address) || !self.addressed {
            bus.set_address(self.address)?;
            bus.sendcmd("++eor 2")?;
            self.addressed = true;
        }
        Ok(())
    }

    /// Send a command to the instrument.
    fn sendcmd(&mut self, cmd: &str) -> Result<(), GpibError> {
        self.select()?;
        let mut bus = self.bus.lock().expect("Mutex should not be poisoned");
        bus.sendcmd(cmd)
    }

    /// Query the instrument with a command and return the response as a String.
    fn query(&mut self, cmd: &str) -> Result<String, GpibError> {
        self.sendcmd(cmd)?;
        let mut bus = self.bus.lock().expect("Mutex should not be poisoned");
        bus.query("++read")
    }
}

impl<T: GpibController> Display for Hp6612c<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HP 6612C address: {}", self.address)
    }
}

/// Range check a voltage setpoint and return it as volt.
fn check_voltage(voltage: &Voltage) -> Result<f64, GpibError> {
    let volts = voltage.as_volts();
    if !(0.0..=VOLTAGE_MAX_V).contains(&volts) {
        return Err(GpibError::FloatValueOutOfRange {
            value: volts,
            min: 0.0,
            max: VOLTAGE_MAX_V,
        });
    }
    Ok(volts)
}

/// Range check a current setpoint and return it as ampere.
fn check_current(current: &Current) -> Result<f64, GpibError> {
    let amps = current.as_amperes();
    if !(0.0..=CURRENT_MAX_A).contains(&amps) {
        return Err(GpibError::FloatValueOutOfRange {
            value: amps,
            min: 0.0,
            max: CURRENT_MAX_A,
        });
    }
    Ok(amps)
}
