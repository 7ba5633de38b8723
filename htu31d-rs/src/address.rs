use bitfield_struct::bitfield;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
/// Level of the HTU31D address pin.
pub enum AddressPin {
    #[default]
    /// Address pin tied to GND, device answers at 0x40.
    Low = 0b0,
    /// Address pin tied to VCC, device answers at 0x41.
    High = 0b1,
}

impl AddressPin {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits & 0b1 {
            0b0 => AddressPin::Low,
            _ => AddressPin::High,
        }
    }

    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            AddressPin::Low => 0b0,
            AddressPin::High => 0b1,
        }
    }
}

#[bitfield(u8)]
/// Represents the 7-bit slave address for the HTU31D sensor.
/// The default address is 0x40. The least significant bit follows the
/// level of the address pin, which moves the device to 0x41.
pub struct SlaveAddress {
    /// Level of the address pin.
    #[bits(1, default = AddressPin::Low)]
    pub pin: AddressPin,
    #[bits(6, default = 0x40 >> 1, access = RO)]
    base: u8,
    #[bits(1, default = false, access = RO)]
    reserved: bool,
}

impl From<AddressPin> for SlaveAddress {
    fn from(pin: AddressPin) -> Self {
        SlaveAddress::default().with_pin(pin)
    }
}
