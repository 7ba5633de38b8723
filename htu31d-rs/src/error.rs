use core::fmt;

#[derive(Debug, PartialEq, Eq)]
/// Represents errors that can occur while interacting with the HTU31D sensor.
pub enum Error<E> {
    /// An error occurred while communicating with the I2C bus.
    I2c(E),
    /// The handle was used before [`init`](crate::Htu31d::init) succeeded.
    NotInitialized,
    /// The CRC byte sent by the sensor does not match the received data.
    Checksum,
    /// The sensor did not acknowledge within the retry window.
    Timeout,
    /// A numeric value does not map to a valid setting.
    InvalidParameter,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::I2c(e)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "I2C transport error: {e:?}"),
            Error::NotInitialized => f.write_str("device handle is not initialized"),
            Error::Checksum => f.write_str("CRC check failed"),
            Error::Timeout => f.write_str("device did not respond in time"),
            Error::InvalidParameter => f.write_str("invalid parameter"),
        }
    }
}
