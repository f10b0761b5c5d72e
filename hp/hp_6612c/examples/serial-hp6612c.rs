use gpibrs::SerialGpib;
use hp_6612c::Hp6612c;
use measurements::{Current, Voltage};

fn main() {
    let port = "/dev/ttyUSB0";

    // Open the Prologix GPIB-USB adapter and put it into controller mode.
    let mut bus = SerialGpib::simple(port).expect("Failed to open serial port");
    bus.init_controller().unwrap();

    // Now we can create the power supply driver for GPIB address 5.
    let mut psu = Hp6612c::try_new(bus, 5).unwrap();
    println!("Instrument ID: {}", psu.get_idn().unwrap());

    // Program 12 V with a 0.5 A current limit and enable the output.
    psu.set_voltage_current(Voltage::from_volts(12.0), Current::from_amperes(0.5))
        .unwrap();
    psu.set_output_state(true).unwrap();

    // Read the measured output back.
    println!("Measured voltage: {}", psu.get_voltage().unwrap());
    println!("Measured current: {}", psu.get_current().unwrap());

    // Put a greeting on the front panel, then hand control back to it.
    psu.set_display_text("HELLO GPIB").unwrap();
    psu.local().unwrap();
}
