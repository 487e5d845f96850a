#![allow(dead_code)]

use hdmi_bridge_drivers::registers;
use hdmi_bridge_drivers::transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusError {
    pub attempt: usize,
}

#[derive(Debug, Default)]
pub struct Chip {
    pub memory: std::collections::HashMap<u16, u8>,
    pub writes: Vec<(u8, Vec<u8>)>,
    pub reads: Vec<(u8, u16, usize)>,
    pub attempts: usize,
    pub fail_at: Option<usize>,
}

impl Chip {
    pub fn set(&mut self, address: u16, bytes: &[u8]) {
        for (offset, byte) in bytes.iter().enumerate() {
            self.memory.insert(address + offset as u16, *byte);
        }
    }

    pub fn get(&self, address: u16) -> u8 {
        self.memory.get(&address).copied().unwrap_or(0)
    }

    /// Register writes as (address, little-endian value)
    pub fn register_writes(&self) -> Vec<(u16, u32)> {
        self.writes
            .iter()
            .map(|(_, bytes)| {
                let address = u16::from_be_bytes([bytes[0], bytes[1]]);
                let mut value = [0u8; 4];
                let length = (bytes.len() - 2).min(4);
                value[0..length].copy_from_slice(&bytes[2..2 + length]);
                (address, u32::from_le_bytes(value))
            })
            .collect()
    }

    pub fn writes_to(&self, address: u16) -> Vec<u32> {
        self.register_writes()
            .into_iter()
            .filter(|(write_address, _)| *write_address == address)
            .map(|(_, value)| value)
            .collect()
    }

    pub fn signal(&mut self, width: u16, height: u16, frame_count: u16, interlaced: bool) {
        self.set(0x8582, &width.to_le_bytes());
        self.set(0x8588, &height.to_le_bytes());
        self.set(0x85a1, &frame_count.to_le_bytes());
        self.set(0x8522, &[if interlaced { 0x04 } else { 0x00 }]);
    }
}

#[derive(Clone, Default)]
pub struct Bus {
    pub chip: std::rc::Rc<std::cell::RefCell<Chip>>,
}

impl Bus {
    /// A bus with a TC358743 (chip identifier 0x47) answering
    pub fn new() -> Self {
        let bus = Self::default();
        bus.chip.borrow_mut().set(0x0000, &[0x00, 0x47]);
        bus
    }
}

impl embedded_hal::blocking::i2c::Write for Bus {
    type Error = BusError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut chip = self.chip.borrow_mut();
        chip.attempts += 1;
        if chip.fail_at == Some(chip.attempts) {
            return Err(BusError {
                attempt: chip.attempts,
            });
        }
        let register = u16::from_be_bytes([bytes[0], bytes[1]]);
        chip.set(register, &bytes[2..]);
        chip.writes.push((address, bytes.to_vec()));
        Ok(())
    }
}

impl embedded_hal::blocking::i2c::WriteRead for Bus {
    type Error = BusError;

    fn write_read(
        &mut self,
        address: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        let mut chip = self.chip.borrow_mut();
        let register = u16::from_be_bytes([bytes[0], bytes[1]]);
        for (offset, byte) in buffer.iter_mut().enumerate() {
            *byte = chip.get(register + offset as u16);
        }
        chip.reads.push((address, register, buffer.len()));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct Delay {
    pub log: std::rc::Rc<std::cell::RefCell<Vec<u32>>>,
}

impl Delay {
    pub fn total_ms(&self) -> u64 {
        self.log.borrow().iter().map(|ms| *ms as u64).sum()
    }
}

impl embedded_hal::blocking::delay::DelayMs<u32> for Delay {
    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(ms);
    }
}

pub fn transport_configuration() -> transport::Configuration {
    transport::Configuration {
        peer_address: 0x0f,
        max_write_length: 10,
    }
}

pub fn registers(bus: &Bus) -> registers::Registers<transport::I2c<Bus>> {
    registers::Registers::new(transport::I2c::new(bus.clone()), transport_configuration())
}
