#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Configuration {
    pub peer_address: u8,
    pub max_write_length: usize,
}

impl Configuration {
    pub fn deserialize_bincode(data: &[u8]) -> bincode::Result<Configuration> {
        bincode::deserialize(data)
    }

    /// Largest data payload that fits in one write after the two address bytes
    pub fn payload_length(&self) -> usize {
        self.max_write_length.saturating_sub(2)
    }
}

/// Byte-oriented addressed bus
///
/// Calls issued sequentially by one owner must reach the peer in order.
pub trait Transport {
    type Error: std::fmt::Debug;

    fn write(&mut self, peer_address: u8, bytes: &[u8]) -> Result<(), Self::Error>;

    fn write_read(
        &mut self,
        peer_address: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn write(&mut self, peer_address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(peer_address, bytes)
    }

    fn write_read(
        &mut self,
        peer_address: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        (**self).write_read(peer_address, bytes, buffer)
    }
}

pub struct I2c<Bus> {
    bus: Bus,
}

impl<Bus> I2c<Bus> {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn release(self) -> Bus {
        self.bus
    }
}

impl<Bus, BusError> Transport for I2c<Bus>
where
    Bus: embedded_hal::blocking::i2c::Write<Error = BusError>
        + embedded_hal::blocking::i2c::WriteRead<Error = BusError>,
    BusError: std::fmt::Debug,
{
    type Error = BusError;

    fn write(&mut self, peer_address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        embedded_hal::blocking::i2c::Write::write(&mut self.bus, peer_address, bytes)
    }

    fn write_read(
        &mut self,
        peer_address: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        embedded_hal::blocking::i2c::WriteRead::write_read(
            &mut self.bus,
            peer_address,
            bytes,
            buffer,
        )
    }
}

/// Blocking millisecond delay backed by the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct Sleep;

impl embedded_hal::blocking::delay::DelayMs<u32> for Sleep {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }
}
