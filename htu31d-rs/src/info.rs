#[derive(Debug, Clone, Copy, PartialEq)]
/// Static description of the HTU31D chip and this driver.
pub struct DeviceInfo {
    /// Chip name.
    pub chip_name: &'static str,
    /// Manufacturer name.
    pub manufacturer_name: &'static str,
    /// Bus interface.
    pub interface: &'static str,
    /// Minimum supply voltage in volts.
    pub supply_voltage_min_v: f32,
    /// Maximum supply voltage in volts.
    pub supply_voltage_max_v: f32,
    /// Maximum supply current in milliamperes.
    pub max_current_ma: f32,
    /// Minimum operating temperature in degrees Celsius.
    pub temperature_min: f32,
    /// Maximum operating temperature in degrees Celsius.
    pub temperature_max: f32,
    /// Driver version.
    pub driver_version: &'static str,
}

const HTU31D_INFO: DeviceInfo = DeviceInfo {
    chip_name: "TE HTU31D",
    manufacturer_name: "TE",
    interface: "IIC",
    supply_voltage_min_v: 3.0,
    supply_voltage_max_v: 5.5,
    max_current_ma: 0.414,
    temperature_min: -40.0,
    temperature_max: 125.0,
    driver_version: env!("CARGO_PKG_VERSION"),
};

/// Returns the chip information record.
pub const fn info() -> DeviceInfo {
    HTU31D_INFO
}
