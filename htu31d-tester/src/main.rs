use std::{process::ExitCode, thread, time::Duration};

use clap::{Parser, Subcommand, ValueEnum};
use htu31d::{AddressPin, Htu31d, HumidityOsr, TemperatureOsr};
use linux_embedded_hal::{Delay, I2cdev};

mod basic;
mod selftest;

type BusError = <I2cdev as embedded_hal::i2c::ErrorType>::Error;

/// Tester for the HTU31D humidity and temperature sensor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to I2C bus (e.g., /dev/i2c-1)
    #[arg(short, long, default_value = "/dev/i2c-1")]
    path: String,
    /// Level of the address pin (0 or 1)
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    addr: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show chip information
    Info,
    /// Show the wiring of the chip pins
    Pins,
    /// Run a driver test against the sensor
    Test {
        #[arg(value_enum)]
        kind: TestKind,
        /// Number of samples
        #[arg(long, default_value_t = 3)]
        times: u32,
    },
    /// Run the basic read example
    Read {
        /// Number of samples
        #[arg(long, default_value_t = 3)]
        times: u32,
        /// Humidity oversampling level (0 to 3)
        #[arg(long, default_value_t = basic::BASIC_DEFAULT_HUMIDITY_OSR as u8)]
        hosr: u8,
        /// Temperature oversampling level (0 to 3)
        #[arg(long, default_value_t = basic::BASIC_DEFAULT_TEMPERATURE_OSR as u8)]
        tosr: u8,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TestKind {
    /// Exercise every command once
    Reg,
    /// Read samples at high and low oversampling
    Read,
}

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    let pin = match args.addr {
        0 => AddressPin::Low,
        _ => AddressPin::High,
    };
    match args.command {
        Command::Info => {
            print_info();
            ExitCode::SUCCESS
        }
        Command::Pins => {
            println!("htu31d: SCL connected to GPIO3(BCM).");
            println!("htu31d: SDA connected to GPIO2(BCM).");
            ExitCode::SUCCESS
        }
        Command::Test { kind, times } => {
            let Some(i2c) = open(&args.path) else {
                return ExitCode::FAILURE;
            };
            print_info();
            let mut htu = Htu31d::new(i2c, Delay);
            htu.set_address_pin(pin);
            let res = match kind {
                TestKind::Reg => selftest::register_test(&mut htu, pin),
                TestKind::Read => selftest::read_test(&mut htu, times, Duration::from_secs(2)),
            };
            match res {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    log::error!("[HTU] Test {kind:?} failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Read { times, hosr, tosr } => {
            let Some(i2c) = open(&args.path) else {
                return ExitCode::FAILURE;
            };
            match example_read(i2c, pin, times, hosr, tosr) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    log::error!("[HTU] Read failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn open(path: &str) -> Option<I2cdev> {
    log::info!("[HTU] Opening bus: {path}");
    I2cdev::new(path)
        .map_err(|e| log::error!("[HTU] Could not open {path}: {e}"))
        .ok()
}

fn print_info() {
    let info = htu31d::info();
    println!("htu31d: chip is {}.", info.chip_name);
    println!("htu31d: manufacturer is {}.", info.manufacturer_name);
    println!("htu31d: interface is {}.", info.interface);
    println!("htu31d: driver version is {}.", info.driver_version);
    println!("htu31d: min supply voltage is {:.1}V.", info.supply_voltage_min_v);
    println!("htu31d: max supply voltage is {:.1}V.", info.supply_voltage_max_v);
    println!("htu31d: max current is {:.2}mA.", info.max_current_ma);
    println!("htu31d: max temperature is {:.1}C.", info.temperature_max);
    println!("htu31d: min temperature is {:.1}C.", info.temperature_min);
}

fn example_read(
    i2c: I2cdev,
    pin: AddressPin,
    times: u32,
    hosr: u8,
    tosr: u8,
) -> Result<(), htu31d::Error<BusError>> {
    let hosr = HumidityOsr::try_from_bits::<BusError>(hosr)?;
    let tosr = TemperatureOsr::try_from_bits::<BusError>(tosr)?;
    let mut htu = basic::basic_init(i2c, Delay, pin, hosr, tosr)?;
    for i in 0..times {
        thread::sleep(Duration::from_secs(1));
        match basic::basic_read(&mut htu) {
            Ok((t, rh)) => {
                log::info!("[HTU] {}/{times}.", i + 1);
                log::info!("[HTU] Temperature is {t:.2}C.");
                log::info!("[HTU] Humidity is {rh:.2}%.");
            }
            Err(e) => {
                let _ = htu.deinit();
                return Err(e);
            }
        }
    }
    htu.deinit()
}
