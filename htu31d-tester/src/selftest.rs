use std::{fmt, thread, time::Duration};

use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};
use htu31d::{AddressPin, Error, Htu31d, HumidityOsr, TemperatureOsr};

#[derive(Debug)]
pub enum TestError<E> {
    Driver(Error<E>),
    Mismatch(&'static str),
}

impl<E> From<Error<E>> for TestError<E> {
    fn from(e: Error<E>) -> Self {
        TestError::Driver(e)
    }
}

impl<E: fmt::Debug> fmt::Display for TestError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestError::Driver(e) => write!(f, "{e}"),
            TestError::Mismatch(what) => write!(f, "{what} check failed"),
        }
    }
}

fn check<E>(ok: bool, what: &'static str) -> Result<(), TestError<E>> {
    if ok {
        log::info!("[HTU] Check {what} ok.");
        Ok(())
    } else {
        log::error!("[HTU] Check {what} error.");
        Err(TestError::Mismatch(what))
    }
}

/// Walks through every command of the driver once.
pub fn register_test<T: I2c<SevenBitAddress>, D: DelayNs>(
    htu: &mut Htu31d<T, D>,
    pin: AddressPin,
) -> Result<(), TestError<T::Error>> {
    log::info!("[HTU] Start register test.");

    htu.set_address_pin(AddressPin::Low);
    check::<T::Error>(htu.get_address_pin() == AddressPin::Low, "addr pin low")?;
    htu.set_address_pin(AddressPin::High);
    check::<T::Error>(htu.get_address_pin() == AddressPin::High, "addr pin high")?;
    htu.set_address_pin(pin);

    htu.init()?;
    let res = run_commands(htu);
    if res.is_err() {
        let _ = htu.deinit();
        return res;
    }
    htu.deinit()?;
    log::info!("[HTU] Finish register test.");
    Ok(())
}

fn run_commands<T: I2c<SevenBitAddress>, D: DelayNs>(
    htu: &mut Htu31d<T, D>,
) -> Result<(), TestError<T::Error>> {
    for osr in [
        HumidityOsr::VeryHigh,
        HumidityOsr::High,
        HumidityOsr::Middle,
        HumidityOsr::Low,
    ] {
        htu.set_humidity_osr(osr)?;
        log::info!("[HTU] Set humidity osr {osr:?}.");
        check::<T::Error>(htu.get_humidity_osr()? == osr, "humidity osr")?;
    }
    for osr in [
        TemperatureOsr::VeryHigh,
        TemperatureOsr::High,
        TemperatureOsr::Middle,
        TemperatureOsr::Low,
    ] {
        htu.set_temperature_osr(osr)?;
        log::info!("[HTU] Set temperature osr {osr:?}.");
        check::<T::Error>(htu.get_temperature_osr()? == osr, "temperature osr")?;
    }

    htu.set_heater_on()?;
    log::info!("[HTU] Heater on.");
    htu.set_heater_off()?;
    log::info!("[HTU] Heater off.");

    let sn = htu.get_serial_number()?;
    let [a, b, c] = sn.bytes();
    log::info!("[HTU] Serial number is 0x{a:02X} 0x{b:02X} 0x{c:02X}.");

    let diag = htu.get_diagnostic()?;
    log::info!("[HTU] Diagnostic is {diag:?}.");

    htu.soft_reset()?;
    log::info!("[HTU] Soft reset.");
    Ok(())
}

/// Reads `times` combined samples at the highest oversampling, then
/// `times` humidity samples at the lowest.
pub fn read_test<T: I2c<SevenBitAddress>, D: DelayNs>(
    htu: &mut Htu31d<T, D>,
    times: u32,
    interval: Duration,
) -> Result<(), TestError<T::Error>> {
    log::info!("[HTU] Start read test.");
    htu.init()?;
    let res = run_reads(htu, times, interval);
    if res.is_err() {
        let _ = htu.deinit();
        return res;
    }
    htu.deinit()?;
    log::info!("[HTU] Finish read test.");
    Ok(())
}

fn run_reads<T: I2c<SevenBitAddress>, D: DelayNs>(
    htu: &mut Htu31d<T, D>,
    times: u32,
    interval: Duration,
) -> Result<(), TestError<T::Error>> {
    htu.set_heater_off()?;
    htu.set_humidity_osr(HumidityOsr::VeryHigh)?;
    htu.set_temperature_osr(TemperatureOsr::VeryHigh)?;
    log::info!("[HTU] Set humidity and temperature osr very high.");
    for _ in 0..times {
        let (t, rh) = htu.read_temperature_humidity()?;
        log::info!("[HTU] Temperature is {:.2}C.", t.celsius());
        log::info!("[HTU] Humidity is {:.2}%.", rh.percentage());
        thread::sleep(interval);
    }

    htu.set_humidity_osr(HumidityOsr::Low)?;
    htu.set_temperature_osr(TemperatureOsr::Low)?;
    log::info!("[HTU] Set humidity and temperature osr low.");
    for _ in 0..times {
        let rh = htu.read_humidity()?;
        log::info!("[HTU] Humidity is {:.2}%.", rh.percentage());
        thread::sleep(interval);
    }
    Ok(())
}
