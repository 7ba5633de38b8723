use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};
use htu31d::{AddressPin, Error, Htu31d, Htu31dBuilder, HumidityOsr, TemperatureOsr};

/// Default humidity oversampling of the basic example.
pub const BASIC_DEFAULT_HUMIDITY_OSR: HumidityOsr = HumidityOsr::VeryHigh;
/// Default temperature oversampling of the basic example.
pub const BASIC_DEFAULT_TEMPERATURE_OSR: TemperatureOsr = TemperatureOsr::VeryHigh;

/// Opens the sensor with the basic example settings: the given
/// oversampling and the heater switched off.
pub fn basic_init<T: I2c<SevenBitAddress>, D: DelayNs>(
    i2c: T,
    delay: D,
    pin: AddressPin,
    hosr: HumidityOsr,
    tosr: TemperatureOsr,
) -> Result<Htu31d<T, D>, Error<T::Error>> {
    let mut htu = Htu31dBuilder::default()
        .with_address_pin(pin)
        .with_humidity_osr(hosr)
        .with_temperature_osr(tosr)
        .build(i2c, delay);
    htu.init()?;
    if let Err(e) = htu.set_heater_off() {
        log::warn!("[HTU] Sensor 0x{:02x}: Could not switch heater off.", htu.get_address());
        let _ = htu.deinit();
        return Err(e);
    }
    Ok(htu)
}

/// Reads temperature in °C and relative humidity in %.
pub fn basic_read<T: I2c<SevenBitAddress>, D: DelayNs>(
    htu: &mut Htu31d<T, D>,
) -> Result<(f32, f32), Error<T::Error>> {
    let (t, rh) = htu.read_temperature_humidity()?;
    Ok((t.celsius(), rh.percentage()))
}
