use crate::error::Error;
use crate::registers;
use crate::registers::Register;
use crate::transport;

pub const BASE: u16 = 0x8c00;

pub const CAPACITY: usize = 1024;

pub const BLOCK_LENGTH: usize = 128;

/// Internal EDID RAM served over DDC2B
pub const MODE_DDC2B: u32 = 1;

pub const DEFAULT_HOTPLUG_SETTLE_MS: u32 = 500;

/// BenQ G2220HD
pub const DEFAULT: [u8; 128] = [
    0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x09, 0xd1, 0x21, 0x78, 0x45, 0x54, 0x00, 0x00,
    0x26, 0x14, 0x01, 0x03, 0x80, 0x30, 0x1b, 0x78, 0x2e, 0x35, 0x81, 0xa6, 0x56, 0x48, 0x9a, 0x24,
    0x12, 0x50, 0x54, 0xa5, 0x6b, 0x80, 0x71, 0x00, 0x81, 0xc0, 0x81, 0x40, 0x81, 0x80, 0xa9, 0xc0,
    0xb3, 0x00, 0xd1, 0xc0, 0x01, 0x01, 0x02, 0x3a, 0x80, 0x18, 0x71, 0x38, 0x2d, 0x40, 0x58, 0x2c,
    0x45, 0x00, 0xdd, 0x0c, 0x11, 0x00, 0x00, 0x1e, 0x00, 0x00, 0x00, 0xff, 0x00, 0x48, 0x39, 0x41,
    0x30, 0x30, 0x34, 0x35, 0x35, 0x53, 0x4c, 0x30, 0x0a, 0x0a, 0x00, 0x00, 0x00, 0xfd, 0x00, 0x32,
    0x4c, 0x18, 0x53, 0x11, 0x00, 0x0a, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x00, 0x00, 0x00, 0xfc,
    0x00, 0x42, 0x65, 0x6e, 0x51, 0x20, 0x47, 0x32, 0x32, 0x32, 0x30, 0x48, 0x44, 0x0a, 0x00, 0xd7,
];

/// Number of bytes advertised to the source (whole 128-byte blocks)
pub fn advertised_length(length: usize) -> usize {
    length.div_ceil(BLOCK_LENGTH) * BLOCK_LENGTH
}

/// Copies `edid` into the EDID window and enables the DDC responder
///
/// Returns the number of chunks written.
pub fn publish_edid<Transport>(
    registers: &mut registers::Registers<Transport>,
    edid: &[u8],
) -> Result<usize, Error>
where
    Transport: transport::Transport,
{
    if edid.len() > CAPACITY {
        return Err(Error::EdidTooLong {
            length: edid.len(),
            capacity: CAPACITY,
        });
    }
    let chunk_length = registers.configuration().payload_length().max(1);
    let mut chunks = 0;
    for (index, chunk) in edid.chunks(chunk_length).enumerate() {
        registers.write_burst(BASE + (index * chunk_length) as u16, chunk)?;
        chunks += 1;
    }
    let advertised = advertised_length(edid.len()) as u32;
    registers::EdidMode {
        mode: MODE_DDC2B,
        reserved_2_8: 0,
    }
    .write(registers)?;
    registers::EdidLen1 {
        value: advertised & 0xff,
    }
    .write(registers)?;
    registers::EdidLen2 {
        value: advertised >> 8,
    }
    .write(registers)?;
    log::debug!(
        "published {} EDID bytes in {} chunks ({} advertised)",
        edid.len(),
        chunks,
        advertised
    );
    Ok(chunks)
}

/// Drives hot-plug detect to the opposite level, holds it, then drives the requested level
pub fn toggle_hotplug<Transport, Delay>(
    registers: &mut registers::Registers<Transport>,
    delay: &mut Delay,
    active: bool,
    settle_ms: u32,
) -> Result<(), Error>
where
    Transport: transport::Transport,
    Delay: embedded_hal::blocking::delay::DelayMs<u32>,
{
    registers::HpdCtl {
        output: (!active) as u32,
        ..Default::default()
    }
    .write(registers)?;
    delay.delay_ms(settle_ms);
    registers::HpdCtl {
        output: active as u32,
        ..Default::default()
    }
    .write(registers)?;
    log::debug!(
        "hot-plug detect {}",
        if active { "asserted" } else { "released" }
    );
    Ok(())
}
