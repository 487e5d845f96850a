use crate::error::Error;
use crate::registers;
use crate::transport;

/// One register write of a table
///
/// `flags` packs the post-write delay in milliseconds (bits 0..16), the repeat count
/// (bits 16..24) and the repeat distance (bits 24..32).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub address: u16,
    pub value: u32,
    pub flags: u32,
}

impl Entry {
    pub const fn new(address: u16, value: u32) -> Self {
        Self {
            address,
            value,
            flags: 0,
        }
    }

    pub const fn delay(self, milliseconds: u16) -> Self {
        Self {
            flags: (self.flags & !0xffff) | milliseconds as u32,
            ..self
        }
    }

    /// Runs the `distance` entries that end with this one `count` times in total
    pub const fn repeat(self, count: u8, distance: u8) -> Self {
        Self {
            flags: (self.flags & 0xffff) | ((count as u32) << 16) | ((distance as u32) << 24),
            ..self
        }
    }

    pub fn delay_ms(&self) -> u16 {
        (self.flags & 0xffff) as u16
    }

    pub fn repeat_count(&self) -> u8 {
        ((self.flags >> 16) & 0xff) as u8
    }

    pub fn repeat_distance(&self) -> u8 {
        ((self.flags >> 24) & 0xff) as u8
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub entries: &'static [Entry],
}

impl Table {
    /// Number of writes a complete run issues
    pub fn writes(&self) -> Result<usize, Error> {
        validate(self.entries)?;
        Ok(self.entries.len()
            + self
                .entries
                .iter()
                .map(|entry| {
                    (entry.repeat_count() as usize).saturating_sub(1)
                        * entry.repeat_distance() as usize
                })
                .sum::<usize>())
    }
}

/// Checks that every repeat block stays inside the table and holds no other repeat
pub fn validate(entries: &[Entry]) -> Result<(), Error> {
    let mut previous: Option<usize> = None;
    for (index, entry) in entries.iter().enumerate() {
        if entry.repeat_count() > 0 {
            let distance = entry.repeat_distance();
            if distance == 0 || distance as usize > index + 1 {
                return Err(Error::RepeatOutOfRange { index, distance });
            }
            let start = index + 1 - distance as usize;
            if let Some(inner) = previous.filter(|inner| *inner >= start) {
                return Err(Error::NestedRepeat { index, inner });
            }
            previous = Some(index);
        }
    }
    Ok(())
}

pub fn run<Transport, Delay>(
    registers: &mut registers::Registers<Transport>,
    delay: &mut Delay,
    table: &Table,
) -> Result<(), Error>
where
    Transport: transport::Transport,
    Delay: embedded_hal::blocking::delay::DelayMs<u32>,
{
    let writes = table.writes()?;
    log::debug!("running table {} ({} writes)", table.name, writes);
    let mut repeats = 0u8;
    let mut distance = 0usize;
    let mut index = 0;
    while index < table.entries.len() {
        let entry = &table.entries[index];
        if let Err(error) = registers.write(entry.address, entry.value) {
            log::error!(
                "table {} stopped at entry {} ({:#06x}): {}",
                table.name,
                index,
                entry.address,
                error
            );
            return Err(error);
        }
        if entry.delay_ms() > 0 {
            delay.delay_ms(entry.delay_ms() as u32);
        }
        if entry.repeat_count() > 0 {
            if repeats == 0 {
                repeats = entry.repeat_count();
                distance = entry.repeat_distance() as usize;
            }
            repeats -= 1;
            if repeats > 0 {
                index = (index + 1)
                    .checked_sub(distance)
                    .ok_or(Error::RepeatOutOfRange {
                        index,
                        distance: distance as u8,
                    })?;
                continue;
            }
        }
        index += 1;
    }
    Ok(())
}
