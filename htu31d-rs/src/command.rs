use bitfield_struct::bitfield;

use crate::Error;

pub(crate) const HTU31D_CONVERSION: u8 = 0x1 << 6;
pub(crate) const HTU31D_READ_T_RH: u8 = 0x00;
pub(crate) const HTU31D_READ_RH: u8 = 0x1 << 4;
pub(crate) const HTU31D_RESET: u8 = 0x1E;
pub(crate) const HTU31D_HEATER_ON: u8 = 0x1 << 2;
pub(crate) const HTU31D_HEATER_OFF: u8 = 0x1 << 1;
pub(crate) const HTU31D_READ_SERIAL_NUMBER: u8 = 0x0A;
pub(crate) const HTU31D_READ_DIAGNOSTIC: u8 = 0x1 << 3;

/// CRC-8 generator x^8 + x^5 + x^4 + 1.
const CRC_POLYNOMIAL: u8 = 0x31;

/// Computes the HTU31D CRC-8 (init 0x00, no reflection, no final XOR).
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |crc, byte| {
        (0..8).fold(crc ^ byte, |crc, _| {
            if crc & 0x80 != 0 {
                (crc << 1) ^ CRC_POLYNOMIAL
            } else {
                crc << 1
            }
        })
    })
}

/// Splits a `[msb, lsb, crc]` chunk into a checked 16-bit word.
fn checked_word(chunk: &[u8]) -> Option<u16> {
    match chunk {
        [msb, lsb, crc] if crc8(&[*msb, *lsb]) == *crc => Some(u16::from_be_bytes([*msb, *lsb])),
        _ => None,
    }
}

/// A response the sensor returns after a read command.
pub(crate) trait Htu31dResponse: Sized {
    const COMMAND: u8;
    const RESPONSE_LEN: usize;

    /// Decodes `RESPONSE_LEN` bytes, returning `None` when a CRC does not match.
    fn decode(buf: &[u8]) -> Option<Self>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
/// Represents a temperature measurement from the HTU31D sensor.
pub struct Temperature {
    pub(crate) value: u16,
}

impl Temperature {
    /// Wraps a raw 16-bit ADC count.
    pub const fn from_raw(value: u16) -> Self {
        Self { value }
    }

    /// Raw 16-bit ADC count as sent by the sensor.
    pub fn raw(&self) -> u16 {
        self.value
    }

    /// Converts the raw temperature value to Celsius.
    pub fn celsius(&self) -> f32 {
        self.value as f32 / 65535.0 * 165.0 - 40.0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
/// Represents a relative humidity measurement from the HTU31D sensor.
pub struct Humidity {
    pub(crate) value: u16,
}

impl Humidity {
    /// Wraps a raw 16-bit ADC count.
    pub const fn from_raw(value: u16) -> Self {
        Self { value }
    }

    /// Raw 16-bit ADC count as sent by the sensor.
    pub fn raw(&self) -> u16 {
        self.value
    }

    /// Converts the raw humidity value to percentage (0-100).
    pub fn percentage(&self) -> f32 {
        self.value as f32 / 65535.0 * 100.0
    }
}

impl Htu31dResponse for Humidity {
    const COMMAND: u8 = HTU31D_READ_RH;
    const RESPONSE_LEN: usize = 3;

    fn decode(buf: &[u8]) -> Option<Self> {
        checked_word(buf).map(Humidity::from_raw)
    }
}

impl Htu31dResponse for (Temperature, Humidity) {
    const COMMAND: u8 = HTU31D_READ_T_RH;
    const RESPONSE_LEN: usize = 6;

    fn decode(buf: &[u8]) -> Option<Self> {
        let (t, rh) = buf.split_at(3);
        Some((
            Temperature::from_raw(checked_word(t)?),
            Humidity::from_raw(checked_word(rh)?),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
/// Humidity oversampling ratio of the HTU31D sensor.
pub enum HumidityOsr {
    /// 0.020 %RH resolution, 2 ms conversion.
    Low = 0b00,
    /// 0.014 %RH resolution, 3 ms conversion.
    Middle = 0b01,
    /// 0.010 %RH resolution, 5 ms conversion.
    High = 0b10,
    #[default]
    /// 0.007 %RH resolution, 9 ms conversion.
    VeryHigh = 0b11,
}

impl HumidityOsr {
    /// Maps a numeric level (0 to 3) to an oversampling setting.
    pub fn try_from_bits<E>(bits: u8) -> Result<Self, Error<E>> {
        match bits {
            0b00 => Ok(HumidityOsr::Low),
            0b01 => Ok(HumidityOsr::Middle),
            0b10 => Ok(HumidityOsr::High),
            0b11 => Ok(HumidityOsr::VeryHigh),
            _ => Err(Error::InvalidParameter),
        }
    }

    pub(crate) const fn into_bits(self) -> u8 {
        self as u8
    }

    /// Resolution in percent relative humidity.
    pub fn resolution(self) -> f32 {
        match self {
            HumidityOsr::Low => 0.020,
            HumidityOsr::Middle => 0.014,
            HumidityOsr::High => 0.010,
            HumidityOsr::VeryHigh => 0.007,
        }
    }

    /// Returns the conversion time in milliseconds for the given humidity oversampling.
    pub(crate) fn delay_ms(self) -> u32 {
        match self {
            HumidityOsr::Low => 2,
            HumidityOsr::Middle => 3,
            HumidityOsr::High => 5,
            HumidityOsr::VeryHigh => 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
/// Temperature oversampling ratio of the HTU31D sensor.
pub enum TemperatureOsr {
    /// 0.040 °C resolution, 2 ms conversion.
    Low = 0b00,
    /// 0.025 °C resolution, 4 ms conversion.
    Middle = 0b01,
    /// 0.016 °C resolution, 7 ms conversion.
    High = 0b10,
    #[default]
    /// 0.012 °C resolution, 13 ms conversion.
    VeryHigh = 0b11,
}

impl TemperatureOsr {
    /// Maps a numeric level (0 to 3) to an oversampling setting.
    pub fn try_from_bits<E>(bits: u8) -> Result<Self, Error<E>> {
        match bits {
            0b00 => Ok(TemperatureOsr::Low),
            0b01 => Ok(TemperatureOsr::Middle),
            0b10 => Ok(TemperatureOsr::High),
            0b11 => Ok(TemperatureOsr::VeryHigh),
            _ => Err(Error::InvalidParameter),
        }
    }

    pub(crate) const fn into_bits(self) -> u8 {
        self as u8
    }

    /// Resolution in degrees Celsius.
    pub fn resolution(self) -> f32 {
        match self {
            TemperatureOsr::Low => 0.040,
            TemperatureOsr::Middle => 0.025,
            TemperatureOsr::High => 0.016,
            TemperatureOsr::VeryHigh => 0.012,
        }
    }

    /// Returns the conversion time in milliseconds for the given temperature oversampling.
    pub(crate) fn delay_ms(self) -> u32 {
        match self {
            TemperatureOsr::Low => 2,
            TemperatureOsr::Middle => 4,
            TemperatureOsr::High => 7,
            TemperatureOsr::VeryHigh => 13,
        }
    }
}

/// Builds the conversion command for the given oversampling pair.
pub(crate) const fn conversion_command(hosr: HumidityOsr, tosr: TemperatureOsr) -> u8 {
    HTU31D_CONVERSION | (hosr.into_bits() & 0x3) << 3 | (tosr.into_bits() & 0x3) << 1
}

#[bitfield(u8)]
#[derive(PartialEq, Eq)]
/// Diagnostic byte of the HTU31D sensor.
pub struct Diagnostic {
    /// The heater is switched on.
    pub heater_on: bool,
    /// Temperature below the low limit.
    pub temperature_low_error: bool,
    /// Temperature above the high limit.
    pub temperature_high_error: bool,
    /// Temperature ADC under- or overrun.
    pub temperature_under_overrun: bool,
    /// Humidity below the low limit.
    pub humidity_low_error: bool,
    /// Humidity above the high limit.
    pub humidity_high_error: bool,
    /// Humidity ADC under- or overrun.
    pub humidity_under_overrun: bool,
    /// Factory calibration could not be loaded from NVM.
    pub nvm_error: bool,
}

impl Diagnostic {
    /// Returns `true` if any fault bit is set. The heater bit is not a fault.
    pub fn has_fault(&self) -> bool {
        self.into_bits() & !0x1 != 0
    }
}

impl Htu31dResponse for Diagnostic {
    const COMMAND: u8 = HTU31D_READ_DIAGNOSTIC;
    const RESPONSE_LEN: usize = 2;

    fn decode(buf: &[u8]) -> Option<Self> {
        match buf {
            [diag, crc] if crc8(&[*diag]) == *crc => Some(Diagnostic::from_bits(*diag)),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Factory-programmed 24-bit serial number.
pub struct SerialNumber([u8; 3]);

impl SerialNumber {
    /// Serial number bytes in the order the sensor sends them.
    pub fn bytes(&self) -> [u8; 3] {
        self.0
    }

    /// Serial number as a big-endian integer.
    pub fn value(&self) -> u32 {
        u32::from_be_bytes([0, self.0[0], self.0[1], self.0[2]])
    }
}

impl Htu31dResponse for SerialNumber {
    const COMMAND: u8 = HTU31D_READ_SERIAL_NUMBER;
    const RESPONSE_LEN: usize = 4;

    fn decode(buf: &[u8]) -> Option<Self> {
        match buf {
            [a, b, c, crc] if crc8(&[*a, *b, *c]) == *crc => Some(SerialNumber([*a, *b, *c])),
            _ => None,
        }
    }
}
