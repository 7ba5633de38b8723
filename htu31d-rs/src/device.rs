use embedded_hal::{
    delay::DelayNs,
    i2c::{Error as _, ErrorKind, I2c, Operation, SevenBitAddress},
};

use crate::{
    Error, Humidity, Temperature,
    address::{AddressPin, SlaveAddress},
    command::{
        self, Diagnostic, HTU31D_HEATER_OFF, HTU31D_HEATER_ON, HTU31D_RESET, Htu31dResponse,
        HumidityOsr, SerialNumber, TemperatureOsr,
    },
};

/// Time the sensor needs to reload its calibration after a reset.
const RESET_DELAY_MS: u32 = 15;
/// Attempts at getting a reset command acknowledged.
const RESET_RETRIES: u8 = 3;
/// Attempts at reading a result the sensor is still converting.
const READ_RETRIES: u8 = 5;
const RETRY_INTERVAL_MS: u32 = 1;

/// Represents the HTU31D sensor.
pub struct Htu31d<I2C, D> {
    pub(crate) i2c: I2C,
    pub(crate) delay: D,
    pub(crate) address: SlaveAddress,
    pub(crate) hosr: HumidityOsr,
    pub(crate) tosr: TemperatureOsr,
    pub(crate) inited: bool,
}

#[derive(Debug, Default, Clone, Copy)]
/// Builder for a HTU31D sensor.
pub struct Htu31dBuilder {
    pub(crate) address: SlaveAddress,
    pub(crate) hosr: HumidityOsr,
    pub(crate) tosr: TemperatureOsr,
}

impl Htu31dBuilder {
    /// Set the address of the HTU31D sensor.
    pub fn with_address(mut self, address: SlaveAddress) -> Self {
        self.address = address;
        self
    }

    /// Set the address of the HTU31D sensor from the level of its address pin.
    pub fn with_address_pin(mut self, pin: AddressPin) -> Self {
        self.address = self.address.with_pin(pin);
        self
    }

    /// Set the humidity oversampling for the HTU31D sensor.
    pub fn with_humidity_osr(mut self, osr: HumidityOsr) -> Self {
        self.hosr = osr;
        self
    }

    /// Set the temperature oversampling for the HTU31D sensor.
    pub fn with_temperature_osr(mut self, osr: TemperatureOsr) -> Self {
        self.tosr = osr;
        self
    }

    /// Build the HTU31D handle with the specified configuration.
    ///
    /// The returned handle is not initialized; call [`Htu31d::init`] before
    /// any other transaction.
    pub fn build<T: I2c<SevenBitAddress>, D: DelayNs>(self, i2c: T, delay: D) -> Htu31d<T, D> {
        Htu31d {
            i2c,
            delay,
            address: self.address,
            hosr: self.hosr,
            tosr: self.tosr,
            inited: false,
        }
    }
}

impl<I2C: I2c<SevenBitAddress>, D: DelayNs> Htu31d<I2C, D> {
    /// Creates a handle with the default configuration: address pin low and
    /// very high oversampling on both channels.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Htu31dBuilder::default().build(i2c, delay)
    }

    /// Get the address of the device.
    pub fn get_address(&self) -> u8 {
        self.address.into_bits()
    }

    /// Get the level of the address pin the handle talks to.
    pub fn get_address_pin(&self) -> AddressPin {
        self.address.pin()
    }

    /// Set the level of the address pin. Subsequent transactions use the new address.
    pub fn set_address_pin(&mut self, pin: AddressPin) {
        self.address = self.address.with_pin(pin);
    }

    /// Returns `true` once [`init`](Self::init) has succeeded and until
    /// [`deinit`](Self::deinit) is called.
    pub fn is_initialized(&self) -> bool {
        self.inited
    }

    /// Initialize the sensor.
    ///
    /// Resets the device and reads its diagnostic byte to confirm it is
    /// present on the bus.
    pub fn init(&mut self) -> Result<(), Error<I2C::Error>> {
        self.inited = false;
        if let Err(e) = self.i2c.write(self.address.into_bits(), &[HTU31D_RESET]) {
            log::debug!(
                "htu31d 0x{:02x}: soft reset failed: {e:?}",
                self.address.into_bits()
            );
            return Err(Error::I2c(e));
        }
        self.delay.delay_ms(RESET_DELAY_MS);
        // Check if the device is present by reading its diagnostic byte
        let diag = self.fetch::<Diagnostic>()?;
        log::debug!(
            "htu31d 0x{:02x}: initialized, diagnostic {:#010b}",
            self.address.into_bits(),
            diag.into_bits()
        );
        self.inited = true;
        Ok(())
    }

    /// Deinitialize the sensor.
    ///
    /// The device is reset and the handle must be initialized again before
    /// further use.
    pub fn deinit(&mut self) -> Result<(), Error<I2C::Error>> {
        self.ensure_init()?;
        self.command(HTU31D_RESET)?;
        self.delay.delay_ms(RESET_DELAY_MS);
        self.inited = false;
        Ok(())
    }

    /// Consumes the handle, returning the I2C bus and the delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Set the humidity oversampling used by subsequent conversions.
    pub fn set_humidity_osr(&mut self, osr: HumidityOsr) -> Result<(), Error<I2C::Error>> {
        self.ensure_init()?;
        self.hosr = osr;
        Ok(())
    }

    /// Get the humidity oversampling.
    pub fn get_humidity_osr(&self) -> Result<HumidityOsr, Error<I2C::Error>> {
        self.ensure_init()?;
        Ok(self.hosr)
    }

    /// Set the temperature oversampling used by subsequent conversions.
    pub fn set_temperature_osr(&mut self, osr: TemperatureOsr) -> Result<(), Error<I2C::Error>> {
        self.ensure_init()?;
        self.tosr = osr;
        Ok(())
    }

    /// Get the temperature oversampling.
    pub fn get_temperature_osr(&self) -> Result<TemperatureOsr, Error<I2C::Error>> {
        self.ensure_init()?;
        Ok(self.tosr)
    }

    /// Time in milliseconds a conversion takes with the current oversampling.
    pub fn conversion_time_ms(&self) -> u32 {
        self.hosr.delay_ms() + self.tosr.delay_ms()
    }

    /// Trigger a conversion and read both temperature and humidity.
    ///
    /// # Returns:
    /// - [`Temperature`] and [`Humidity`] carrying the raw counts; use
    ///   [`Temperature::celsius`] and [`Humidity::percentage`] for physical units.
    ///
    /// # Errors:
    /// - [`Error::Checksum`] if either word fails its CRC.
    /// - [`Error::Timeout`] if the sensor keeps refusing the read.
    pub fn read_temperature_humidity(
        &mut self,
    ) -> Result<(Temperature, Humidity), Error<I2C::Error>> {
        self.ensure_init()?;
        self.convert()?;
        self.fetch_converted::<(Temperature, Humidity)>()
    }

    /// Trigger a conversion and read only the humidity.
    pub fn read_humidity(&mut self) -> Result<Humidity, Error<I2C::Error>> {
        self.ensure_init()?;
        self.convert()?;
        self.fetch_converted::<Humidity>()
    }

    /// Perform a soft reset of the HTU31D sensor.
    ///
    /// The reset command is retried a few times if the sensor does not
    /// acknowledge it, after which [`Error::Timeout`] is returned. Any other
    /// bus error is returned as is.
    pub fn soft_reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.ensure_init()?;
        for attempt in 1..=RESET_RETRIES {
            match self.i2c.write(self.address.into_bits(), &[HTU31D_RESET]) {
                Ok(()) => {
                    self.delay.delay_ms(RESET_DELAY_MS);
                    return Ok(());
                }
                Err(e) if matches!(e.kind(), ErrorKind::NoAcknowledge(_)) => {
                    log::warn!(
                        "htu31d 0x{:02x}: reset not acknowledged ({attempt}/{RESET_RETRIES})",
                        self.address.into_bits()
                    );
                    if attempt < RESET_RETRIES {
                        self.delay.delay_ms(RETRY_INTERVAL_MS);
                    }
                }
                Err(e) => return Err(Error::I2c(e)),
            }
        }
        Err(Error::Timeout)
    }

    /// Switch the on-chip heater on. It stays on until [`set_heater_off`](Self::set_heater_off).
    pub fn set_heater_on(&mut self) -> Result<(), Error<I2C::Error>> {
        self.ensure_init()?;
        self.command(HTU31D_HEATER_ON)
    }

    /// Switch the on-chip heater off.
    pub fn set_heater_off(&mut self) -> Result<(), Error<I2C::Error>> {
        self.ensure_init()?;
        self.command(HTU31D_HEATER_OFF)
    }

    /// Get the serial number of the HTU31D sensor.
    pub fn get_serial_number(&mut self) -> Result<SerialNumber, Error<I2C::Error>> {
        self.ensure_init()?;
        self.fetch()
    }

    /// Read and decode the diagnostic byte.
    pub fn get_diagnostic(&mut self) -> Result<Diagnostic, Error<I2C::Error>> {
        self.ensure_init()?;
        self.fetch()
    }

    /// Write a raw command followed by optional payload bytes.
    pub fn set_reg(&mut self, cmd: u8, buf: &[u8]) -> Result<(), Error<I2C::Error>> {
        self.ensure_init()?;
        if buf.is_empty() {
            return self.command(cmd);
        }
        self.i2c.transaction(
            self.address.into_bits(),
            &mut [Operation::Write(&[cmd]), Operation::Write(buf)],
        )?;
        Ok(())
    }

    /// Write a raw command and read the response into `buf`, without CRC checking.
    pub fn get_reg(&mut self, cmd: u8, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.ensure_init()?;
        self.i2c.write_read(self.address.into_bits(), &[cmd], buf)?;
        Ok(())
    }

    fn ensure_init(&self) -> Result<(), Error<I2C::Error>> {
        if self.inited {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn command(&mut self, cmd: u8) -> Result<(), Error<I2C::Error>> {
        log::debug!("htu31d 0x{:02x}: command 0x{cmd:02x}", self.address.into_bits());
        self.i2c.write(self.address.into_bits(), &[cmd])?;
        Ok(())
    }

    /// Start a conversion and wait until both channels are done.
    fn convert(&mut self) -> Result<(), Error<I2C::Error>> {
        self.command(command::conversion_command(self.hosr, self.tosr))?;
        self.delay.delay_ms(self.hosr.delay_ms());
        self.delay.delay_ms(self.tosr.delay_ms());
        Ok(())
    }

    fn fetch<R: Htu31dResponse>(&mut self) -> Result<R, Error<I2C::Error>> {
        let mut buf = [0u8; 6];
        let buf = &mut buf[..R::RESPONSE_LEN];
        self.i2c.write_read(self.address.into_bits(), &[R::COMMAND], buf)?;
        R::decode(buf).ok_or_else(|| {
            log::warn!(
                "htu31d 0x{:02x}: crc check failed for command 0x{:02x}",
                self.address.into_bits(),
                R::COMMAND
            );
            Error::Checksum
        })
    }

    /// Fetch a conversion result, retrying while the sensor NACKs the read.
    fn fetch_converted<R: Htu31dResponse>(&mut self) -> Result<R, Error<I2C::Error>> {
        for attempt in 1..=READ_RETRIES {
            match self.fetch::<R>() {
                Err(Error::I2c(e)) if matches!(e.kind(), ErrorKind::NoAcknowledge(_)) => {
                    log::warn!(
                        "htu31d 0x{:02x}: result not ready ({attempt}/{READ_RETRIES})",
                        self.address.into_bits()
                    );
                    if attempt < READ_RETRIES {
                        self.delay.delay_ms(RETRY_INTERVAL_MS);
                    }
                }
                other => return other,
            }
        }
        Err(Error::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::NoAcknowledgeSource;
    use embedded_hal_mock::eh1::delay::{CheckedDelay, NoopDelay, Transaction as DelayTx};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTx};

    const ADDR: u8 = 0x40;

    fn init_sequence(addr: u8) -> Vec<I2cTx> {
        vec![
            I2cTx::write(addr, vec![0x1E]),
            I2cTx::write_read(addr, vec![0x08], vec![0x00, 0x00]),
        ]
    }

    fn nack() -> ErrorKind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    }

    #[test]
    fn test_init_and_deinit() {
        let mut expect = init_sequence(ADDR);
        expect.push(I2cTx::write(ADDR, vec![0x1E]));
        let i2c = I2cMock::new(&expect);
        let delay = CheckedDelay::new(&[DelayTx::delay_ms(15), DelayTx::delay_ms(15)]);

        let mut dev = Htu31d::new(i2c, delay);
        assert!(!dev.is_initialized());
        dev.init().unwrap();
        assert!(dev.is_initialized());
        dev.deinit().unwrap();
        assert!(!dev.is_initialized());
        assert_eq!(dev.deinit(), Err(Error::NotInitialized));

        let (mut i2c, mut delay) = dev.release();
        i2c.done();
        delay.done();
    }

    #[test]
    fn test_init_twice_resets_again() {
        let mut expect = init_sequence(ADDR);
        expect.extend(init_sequence(ADDR));
        let i2c = I2cMock::new(&expect);
        let delay = CheckedDelay::new(&[DelayTx::delay_ms(15), DelayTx::delay_ms(15)]);

        let mut dev = Htu31d::new(i2c, delay);
        dev.init().unwrap();
        dev.init().unwrap();
        assert!(dev.is_initialized());

        let (mut i2c, mut delay) = dev.release();
        i2c.done();
        delay.done();
    }

    #[test]
    fn test_deinit_failure_keeps_init() {
        let mut expect = init_sequence(ADDR);
        expect.extend_from_slice(&[
            I2cTx::write(ADDR, vec![0x1E]).with_error(ErrorKind::Bus),
            I2cTx::write(ADDR, vec![0x02]),
        ]);
        let i2c = I2cMock::new(&expect);

        let mut dev = Htu31d::new(i2c, NoopDelay);
        dev.init().unwrap();
        assert_eq!(dev.deinit(), Err(Error::I2c(ErrorKind::Bus)));
        assert!(dev.is_initialized());
        dev.set_heater_off().unwrap();

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn test_reinit_after_deinit() {
        let mut expect = init_sequence(ADDR);
        expect.push(I2cTx::write(ADDR, vec![0x1E]));
        expect.extend(init_sequence(ADDR));
        expect.push(I2cTx::write(ADDR, vec![0x04]));
        let i2c = I2cMock::new(&expect);

        let mut dev = Htu31d::new(i2c, NoopDelay);
        dev.init().unwrap();
        dev.deinit().unwrap();
        assert_eq!(dev.set_heater_on(), Err(Error::NotInitialized));
        dev.init().unwrap();
        assert!(dev.is_initialized());
        dev.set_heater_on().unwrap();

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn test_init_transport_error() {
        let expect = [I2cTx::write(ADDR, vec![0x1E]).with_error(nack())];
        let i2c = I2cMock::new(&expect);

        let mut dev = Htu31d::new(i2c, NoopDelay);
        assert_eq!(dev.init(), Err(Error::I2c(nack())));
        assert!(!dev.is_initialized());

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn test_init_bad_crc() {
        let expect = [
            I2cTx::write(ADDR, vec![0x1E]),
            I2cTx::write_read(ADDR, vec![0x08], vec![0x00, 0x31]),
        ];
        let i2c = I2cMock::new(&expect);

        let mut dev = Htu31d::new(i2c, NoopDelay);
        assert_eq!(dev.init(), Err(Error::Checksum));
        assert!(!dev.is_initialized());

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn test_requires_init() {
        let i2c = I2cMock::new(&[]);

        let mut dev = Htu31d::new(i2c, NoopDelay);
        assert_eq!(dev.read_temperature_humidity(), Err(Error::NotInitialized));
        assert_eq!(dev.read_humidity(), Err(Error::NotInitialized));
        assert_eq!(dev.set_heater_on(), Err(Error::NotInitialized));
        assert_eq!(dev.soft_reset(), Err(Error::NotInitialized));
        assert_eq!(dev.get_diagnostic(), Err(Error::NotInitialized));
        assert_eq!(dev.get_serial_number(), Err(Error::NotInitialized));
        assert_eq!(dev.get_humidity_osr(), Err(Error::NotInitialized));
        assert_eq!(
            dev.set_temperature_osr(TemperatureOsr::Low),
            Err(Error::NotInitialized)
        );

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn test_osr_round_trip() {
        let i2c = I2cMock::new(&init_sequence(ADDR));

        let mut dev = Htu31d::new(i2c, NoopDelay);
        dev.init().unwrap();
        for osr in [
            HumidityOsr::Low,
            HumidityOsr::Middle,
            HumidityOsr::High,
            HumidityOsr::VeryHigh,
        ] {
            dev.set_humidity_osr(osr).unwrap();
            assert_eq!(dev.get_humidity_osr().unwrap(), osr);
        }
        for osr in [
            TemperatureOsr::Low,
            TemperatureOsr::Middle,
            TemperatureOsr::High,
            TemperatureOsr::VeryHigh,
        ] {
            dev.set_temperature_osr(osr).unwrap();
            assert_eq!(dev.get_temperature_osr().unwrap(), osr);
        }

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn test_address_pin() {
        let i2c = I2cMock::new(&init_sequence(0x41));

        let mut dev = Htu31dBuilder::default()
            .with_address_pin(AddressPin::High)
            .build(i2c, NoopDelay);
        assert_eq!(dev.get_address(), 0x41);
        assert_eq!(dev.get_address_pin(), AddressPin::High);
        dev.init().unwrap();
        dev.set_address_pin(AddressPin::Low);
        assert_eq!(dev.get_address(), 0x40);

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn test_read_temperature_humidity() {
        let mut expect = init_sequence(ADDR);
        expect.extend_from_slice(&[
            I2cTx::write(ADDR, vec![0x5E]),
            I2cTx::write_read(ADDR, vec![0x00], vec![0x66, 0x66, 0x12, 0x66, 0x66, 0x12]),
        ]);
        let i2c = I2cMock::new(&expect);
        let delay = CheckedDelay::new(&[
            DelayTx::delay_ms(15),
            DelayTx::delay_ms(9),
            DelayTx::delay_ms(13),
        ]);

        let mut dev = Htu31d::new(i2c, delay);
        dev.init().unwrap();
        assert_eq!(dev.conversion_time_ms(), 22);
        let (t, rh) = dev.read_temperature_humidity().unwrap();
        assert_eq!(t.raw(), 0x6666);
        assert_eq!(rh.raw(), 0x6666);
        assert!((t.celsius() - 26.0).abs() < 1e-3);
        assert!((rh.percentage() - 40.0).abs() < 1e-3);

        let (mut i2c, mut delay) = dev.release();
        i2c.done();
        delay.done();
    }

    #[test]
    fn test_read_humidity_low_osr() {
        let mut expect = init_sequence(ADDR);
        expect.extend_from_slice(&[
            I2cTx::write(ADDR, vec![0x40]),
            I2cTx::write_read(ADDR, vec![0x10], vec![0xff, 0xff, 0x2d]),
        ]);
        let i2c = I2cMock::new(&expect);
        let delay = CheckedDelay::new(&[
            DelayTx::delay_ms(15),
            DelayTx::delay_ms(2),
            DelayTx::delay_ms(2),
        ]);

        let mut dev = Htu31dBuilder::default()
            .with_humidity_osr(HumidityOsr::Low)
            .with_temperature_osr(TemperatureOsr::Low)
            .build(i2c, delay);
        dev.init().unwrap();
        let rh = dev.read_humidity().unwrap();
        assert_eq!(rh.percentage(), 100.0);

        let (mut i2c, mut delay) = dev.release();
        i2c.done();
        delay.done();
    }

    #[test]
    fn test_read_checksum_error() {
        let mut expect = init_sequence(ADDR);
        expect.extend_from_slice(&[
            I2cTx::write(ADDR, vec![0x5E]),
            I2cTx::write_read(ADDR, vec![0x00], vec![0x66, 0x66, 0x12, 0x66, 0x66, 0x13]),
        ]);
        let i2c = I2cMock::new(&expect);

        let mut dev = Htu31d::new(i2c, NoopDelay);
        dev.init().unwrap();
        assert_eq!(dev.read_temperature_humidity(), Err(Error::Checksum));

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn test_read_retries_then_succeeds() {
        let mut expect = init_sequence(ADDR);
        expect.extend_from_slice(&[
            I2cTx::write(ADDR, vec![0x5E]),
            I2cTx::write_read(ADDR, vec![0x00], vec![0; 6]).with_error(nack()),
            I2cTx::write_read(ADDR, vec![0x00], vec![0x80, 0x00, 0x23, 0x80, 0x00, 0x23]),
        ]);
        let i2c = I2cMock::new(&expect);
        let delay = CheckedDelay::new(&[
            DelayTx::delay_ms(15),
            DelayTx::delay_ms(9),
            DelayTx::delay_ms(13),
            DelayTx::delay_ms(1),
        ]);

        let mut dev = Htu31d::new(i2c, delay);
        dev.init().unwrap();
        let (t, rh) = dev.read_temperature_humidity().unwrap();
        assert_eq!(t.raw(), 0x8000);
        assert_eq!(rh.raw(), 0x8000);

        let (mut i2c, mut delay) = dev.release();
        i2c.done();
        delay.done();
    }

    #[test]
    fn test_read_timeout() {
        let mut expect = init_sequence(ADDR);
        expect.push(I2cTx::write(ADDR, vec![0x5E]));
        expect.extend(
            (0..READ_RETRIES)
                .map(|_| I2cTx::write_read(ADDR, vec![0x00], vec![0; 6]).with_error(nack())),
        );
        let i2c = I2cMock::new(&expect);
        let mut delays = vec![
            DelayTx::delay_ms(15),
            DelayTx::delay_ms(9),
            DelayTx::delay_ms(13),
        ];
        delays.extend(std::iter::repeat_n(DelayTx::delay_ms(1), READ_RETRIES as usize - 1));
        let delay = CheckedDelay::new(&delays);

        let mut dev = Htu31d::new(i2c, delay);
        dev.init().unwrap();
        assert_eq!(dev.read_temperature_humidity(), Err(Error::Timeout));

        let (mut i2c, mut delay) = dev.release();
        i2c.done();
        delay.done();
    }

    #[test]
    fn test_read_other_bus_error_is_not_retried() {
        let mut expect = init_sequence(ADDR);
        expect.extend_from_slice(&[
            I2cTx::write(ADDR, vec![0x5E]),
            I2cTx::write_read(ADDR, vec![0x00], vec![0; 6]).with_error(ErrorKind::Bus),
        ]);
        let i2c = I2cMock::new(&expect);

        let mut dev = Htu31d::new(i2c, NoopDelay);
        dev.init().unwrap();
        assert_eq!(
            dev.read_temperature_humidity(),
            Err(Error::I2c(ErrorKind::Bus))
        );

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn test_heater() {
        let mut expect = init_sequence(ADDR);
        expect.extend_from_slice(&[
            I2cTx::write(ADDR, vec![0x04]),
            I2cTx::write(ADDR, vec![0x02]),
        ]);
        let i2c = I2cMock::new(&expect);

        let mut dev = Htu31d::new(i2c, NoopDelay);
        dev.init().unwrap();
        dev.set_heater_on().unwrap();
        dev.set_heater_off().unwrap();

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn test_serial_number() {
        let mut expect = init_sequence(ADDR);
        expect.push(I2cTx::write_read(
            ADDR,
            vec![0x0A],
            vec![0x12, 0x34, 0x56, 0xc1],
        ));
        let i2c = I2cMock::new(&expect);

        let mut dev = Htu31d::new(i2c, NoopDelay);
        dev.init().unwrap();
        let sn = dev.get_serial_number().unwrap();
        assert_eq!(sn.bytes(), [0x12, 0x34, 0x56]);
        assert_eq!(sn.value(), 0x0012_3456);

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn test_diagnostic() {
        let mut expect = init_sequence(ADDR);
        expect.push(I2cTx::write_read(ADDR, vec![0x08], vec![0x81, 0x4b]));
        let i2c = I2cMock::new(&expect);

        let mut dev = Htu31d::new(i2c, NoopDelay);
        dev.init().unwrap();
        let diag = dev.get_diagnostic().unwrap();
        assert!(diag.nvm_error());
        assert!(diag.heater_on());
        assert!(!diag.temperature_low_error());
        assert_eq!(diag, Diagnostic::from_bits(0x81));

        let (mut i2c, _) = dev.release();
        i2c.done();
    }

    #[test]
    fn test_soft_reset_retries() {
        let mut expect = init_sequence(ADDR);
        expect.extend_from_slice(&[
            I2cTx::write(ADDR, vec![0x1E]).with_error(nack()),
            I2cTx::write(ADDR, vec![0x1E]),
        ]);
        let i2c = I2cMock::new(&expect);
        let delay = CheckedDelay::new(&[
            DelayTx::delay_ms(15),
            DelayTx::delay_ms(1),
            DelayTx::delay_ms(15),
        ]);

        let mut dev = Htu31d::new(i2c, delay);
        dev.init().unwrap();
        dev.soft_reset().unwrap();

        let (mut i2c, mut delay) = dev.release();
        i2c.done();
        delay.done();
    }

    #[test]
    fn test_soft_reset_timeout() {
        let mut expect = init_sequence(ADDR);
        expect.extend(
            (0..RESET_RETRIES).map(|_| I2cTx::write(ADDR, vec![0x1E]).with_error(nack())),
        );
        let i2c = I2cMock::new(&expect);
        let delay = CheckedDelay::new(&[
            DelayTx::delay_ms(15),
            DelayTx::delay_ms(1),
            DelayTx::delay_ms(1),
        ]);

        let mut dev = Htu31d::new(i2c, delay);
        dev.init().unwrap();
        assert_eq!(dev.soft_reset(), Err(Error::Timeout));

        let (mut i2c, mut delay) = dev.release();
        i2c.done();
        delay.done();
    }

    #[test]
    fn test_soft_reset_bus_error_is_not_retried() {
        let mut expect = init_sequence(ADDR);
        expect.push(I2cTx::write(ADDR, vec![0x1E]).with_error(ErrorKind::Bus));
        let i2c = I2cMock::new(&expect);
        let delay = CheckedDelay::new(&[DelayTx::delay_ms(15)]);

        let mut dev = Htu31d::new(i2c, delay);
        dev.init().unwrap();
        assert_eq!(dev.soft_reset(), Err(Error::I2c(ErrorKind::Bus)));
        assert!(dev.is_initialized());

        let (mut i2c, mut delay) = dev.release();
        i2c.done();
        delay.done();
    }

    #[test]
    fn test_raw_registers() {
        let mut expect = init_sequence(ADDR);
        expect.extend_from_slice(&[
            I2cTx::write(ADDR, vec![0x04]),
            I2cTx::transaction_start(ADDR),
            I2cTx::write(ADDR, vec![0x1E]),
            I2cTx::write(ADDR, vec![0xAA]),
            I2cTx::transaction_end(ADDR),
            I2cTx::write_read(ADDR, vec![0x0A], vec![0x01, 0x02, 0x03, 0x04]),
        ]);
        let i2c = I2cMock::new(&expect);

        let mut dev = Htu31d::new(i2c, NoopDelay);
        dev.init().unwrap();
        dev.set_reg(0x04, &[]).unwrap();
        dev.set_reg(0x1E, &[0xAA]).unwrap();
        let mut buf = [0u8; 4];
        dev.get_reg(0x0A, &mut buf).unwrap();
        assert_eq!(buf, [0x01, 0x02, 0x03, 0x04]);

        let (mut i2c, _) = dev.release();
        i2c.done();
    }
}
