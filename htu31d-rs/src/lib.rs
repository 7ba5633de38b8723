#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]
//!# HTU31D - Driver for the TE Connectivity HTU31D Humidity and Temperature Sensor
//! This crate provides a driver for the HTU31D sensor on top of the [`embedded-hal`] I2C
//! and delay traits, allowing you to read humidity and temperature data.
//! It supports oversampling selection, the on-chip heater, the diagnostic byte and the
//! factory serial number. Every response is CRC-checked.
//!
//! ```ignore
//! use htu31d::{AddressPin, Htu31dBuilder};
//!
//! let mut htu = Htu31dBuilder::default()
//!     .with_address_pin(AddressPin::Low)
//!     .build(i2c, delay);
//! htu.init()?;
//! let (t, rh) = htu.read_temperature_humidity()?;
//! log::info!("{:.2} °C, {:.2} %RH", t.celsius(), rh.percentage());
//! ```
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
mod address;
mod command;
mod device;
mod error;
mod info;

pub use address::{AddressPin, SlaveAddress};
pub use command::{
    Diagnostic, Humidity, HumidityOsr, SerialNumber, Temperature, TemperatureOsr, crc8,
};
pub use device::{Htu31d, Htu31dBuilder};
pub use error::Error;
pub use info::{DeviceInfo, info};
