use std::env;
use std::time::Duration;

use inquire::Select;
use tig_dc::command::{ActualKind, SetpointKind};
use tig_dc::serialport::SerialChannel;
use tig_dc::session::TigDc;
use tig_dc::transaction::ExchangeConfig;
use tig_dc::value::ControlMode;

// Configuration constants - adjust these for your setup
const BAUD_RATE: u32 = 9600;
const SETPOINT_PERMILLE: u16 = 500; // 50.0% of full scale
const MONITOR_SAMPLES: u32 = 5;
const MONITOR_DELAY_MS: u64 = 1000;

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init()
        .unwrap();

    // Get serial port from command line arg or interactive selection
    let port_name = env::args().nth(1).unwrap_or_else(|| {
        let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

        if ports.is_empty() {
            eprintln!("No serial ports found!");
            std::process::exit(1);
        }

        let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();

        Select::new("Select a serial port:", port_names)
            .prompt()
            .expect("Failed to select port")
    });

    println!("Using port: {}", port_name);

    // 8 data bits, 1 stop bit, no parity are the serialport defaults.
    let port = serialport::new(&port_name, BAUD_RATE)
        .timeout(Duration::from_millis(300))
        .open()
        .expect("Failed to open serial port");

    let mut tig = TigDc::new(SerialChannel::new(port), ExchangeConfig::default());

    // Check the device before touching anything.
    let status = tig.read_status().unwrap();
    println!("Initial status: {:#?}", status);

    if let Err(e) = tig.verify_fault_free() {
        eprintln!("Device reports an error, aborting: {}", e);
        return;
    }

    // Program power regulation at half scale and start the output.
    tig.set_mode(ControlMode::Pdc).unwrap();
    tig.set_setpoint(SetpointKind::Active, SETPOINT_PERMILLE).unwrap();
    println!("Setpoint programmed: {}‰", SETPOINT_PERMILLE);

    tig.set_run(true).unwrap();
    println!("Generator running");

    for i in 0..MONITOR_SAMPLES {
        std::thread::sleep(Duration::from_millis(MONITOR_DELAY_MS));
        let power = tig.read_actual(ActualKind::Power).unwrap();
        let frequency = tig.read_actual(ActualKind::Frequency).unwrap();
        println!(
            "[{}/{}] actual power: {}‰, frequency: {:.1} kHz",
            i + 1,
            MONITOR_SAMPLES,
            power,
            frequency as f32 / 10.0
        );
    }

    tig.set_run(false).unwrap();
    println!("Generator stopped");
}
