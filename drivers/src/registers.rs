use crate::error::Error;
use crate::transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: u16,
    pub end: u16,
    pub width: u8,
}

/// Access width of every addressable register, sorted by address
pub const WIDTHS: [Range; 12] = [
    Range {
        start: 0x0000,
        end: 0x005a,
        width: 2,
    },
    Range {
        start: 0x0140,
        end: 0x0150,
        width: 4,
    },
    Range {
        start: 0x0204,
        end: 0x0238,
        width: 4,
    },
    Range {
        start: 0x040c,
        end: 0x0418,
        width: 4,
    },
    Range {
        start: 0x044c,
        end: 0x0454,
        width: 4,
    },
    Range {
        start: 0x0500,
        end: 0x0518,
        width: 4,
    },
    Range {
        start: 0x0600,
        end: 0x06cc,
        width: 4,
    },
    Range {
        start: 0x7000,
        end: 0x7100,
        width: 2,
    },
    Range {
        start: 0x8500,
        end: 0x8bff,
        width: 1,
    },
    Range {
        start: 0x8c00,
        end: 0x8fff,
        width: 4,
    },
    Range {
        start: 0x9000,
        end: 0x90ff,
        width: 1,
    },
    Range {
        start: 0x9100,
        end: 0x92ff,
        width: 1,
    },
];

// 24-bit registers sit in 32-bit windows, so transfers are 1, 2 or 4 bytes
const _: () = {
    let mut index = 0;
    while index < WIDTHS.len() {
        let range = WIDTHS[index];
        assert!(range.start <= range.end);
        assert!(range.width == 1 || range.width == 2 || range.width == 4);
        if index > 0 {
            assert!(WIDTHS[index - 1].end < range.start);
        }
        index += 1;
    }
};

pub fn range(address: u16) -> Result<&'static Range, Error> {
    let index = WIDTHS.partition_point(|range| range.end < address);
    match WIDTHS.get(index) {
        Some(range) if range.start <= address => Ok(range),
        _ => Err(Error::UnknownRegister(address)),
    }
}

/// Number of payload bytes transferred for the register at `address`
pub fn resolve_width(address: u16) -> Result<u8, Error> {
    Ok(range(address)?.width)
}

fn transport_error<TransportError: std::fmt::Debug>(
    address: u16,
    error: TransportError,
) -> Error {
    Error::Transport {
        address,
        message: format!("{error:?}"),
    }
}

pub struct Registers<Transport> {
    transport: Transport,
    configuration: transport::Configuration,
}

impl<Transport: transport::Transport> Registers<Transport> {
    pub fn new(transport: Transport, configuration: transport::Configuration) -> Self {
        Self {
            transport,
            configuration,
        }
    }

    pub fn configuration(&self) -> &transport::Configuration {
        &self.configuration
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn release(self) -> Transport {
        self.transport
    }

    pub fn read(&mut self, address: u16) -> Result<u32, Error> {
        let width = resolve_width(address)? as usize;
        let mut buffer = [0u8; 4];
        self.transport
            .write_read(
                self.configuration.peer_address,
                &address.to_be_bytes(),
                &mut buffer[0..width],
            )
            .map_err(|error| transport_error(address, error))?;
        let value = u32::from_le_bytes(buffer);
        log::trace!("read {address:#06x} -> {value:#x}");
        Ok(value)
    }

    pub fn write(&mut self, address: u16, value: u32) -> Result<(), Error> {
        let width = resolve_width(address)?;
        if width < 4 && (value >> (width as u32 * 8)) != 0 {
            return Err(Error::ValueOverflow {
                address,
                value,
                width,
            });
        }
        let mut buffer = [0u8; 6];
        buffer[0..2].copy_from_slice(&address.to_be_bytes());
        buffer[2..6].copy_from_slice(&value.to_le_bytes());
        log::trace!("write {address:#06x} <- {value:#x}");
        self.transport
            .write(
                self.configuration.peer_address,
                &buffer[0..2 + width as usize],
            )
            .map_err(|error| transport_error(address, error))
    }

    /// Writes `bytes` at consecutive addresses in a single transfer
    ///
    /// The span must stay inside one range of [`WIDTHS`], which is how RAM windows are filled.
    pub fn write_burst(&mut self, address: u16, bytes: &[u8]) -> Result<(), Error> {
        let range = range(address)?;
        let last = address as usize + bytes.len().max(1) - 1;
        if bytes.len() + 2 > self.configuration.max_write_length || last > range.end as usize {
            return Err(Error::BurstTooLong {
                address,
                length: bytes.len(),
            });
        }
        let mut buffer = Vec::with_capacity(bytes.len() + 2);
        buffer.extend_from_slice(&address.to_be_bytes());
        buffer.extend_from_slice(bytes);
        log::trace!("burst {address:#06x} <- {} bytes", bytes.len());
        self.transport
            .write(self.configuration.peer_address, &buffer)
            .map_err(|error| transport_error(address, error))
    }
}

pub trait Register {
    fn address(&self) -> u16;

    fn value(&self) -> u32;

    fn read<Transport: transport::Transport>(
        &self,
        registers: &mut Registers<Transport>,
    ) -> Result<u32, Error> {
        registers.read(self.address())
    }

    fn write<Transport: transport::Transport>(
        &self,
        registers: &mut Registers<Transport>,
    ) -> Result<(), Error> {
        registers.write(self.address(), self.value())
    }
}

macro_rules! register {
    ($name:ident, $address:literal, {$($subname:ident: $substart:literal..$subend:literal),+ $(,)?}) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            $(
                pub $subname: u32,
            )+
        }
        $(
            const _: () = assert!($substart < $subend && $subend <= 32);
        )+
        impl $name {
            pub const ADDRESS: u16 = $address;

            pub fn from_value(value: u32) -> Self {
                Self {
                    $(
                        $subname: (value >> $substart) & (((1u64 << ($subend - $substart)) - 1) as u32),
                    )+
                }
            }
        }
        impl Register for $name {
            fn address(&self) -> u16 {
                $address
            }
            fn value(&self) -> u32 {
                0u32
                $(
                    | ((self.$subname & (((1u64 << ($subend - $substart)) - 1) as u32)) << $substart)
                )+
            }
        }
    };
}

register! { ChipId, 0x0000, {
    revision: 0..8,
    chip: 8..16,
} }
register! { FifoCtl, 0x0006, { level: 0..16 } }
register! { IntStatus, 0x0014, { value: 0..16 } }
register! { IntMask, 0x0016, { value: 0..16 } }
register! { PllCtl0, 0x0020, {
    fbd: 0..9,
    reserved_9_12: 9..12,
    prd: 12..16,
} }
register! { PllCtl1, 0x0022, {
    pll_en: 0..1,
    resetb: 1..2,
    reserved_2_4: 2..4,
    cken: 4..5,
    bypcken: 5..6,
    lfbren: 6..7,
    reserved_7_8: 7..8,
    lbws: 8..10,
    frs: 10..12,
    reserved_12_16: 12..16,
} }
register! { LineInitCnt, 0x0210, { value: 0..16 } }
register! { LpTxTimeCnt, 0x0214, { value: 0..11 } }
register! { TclkHeaderCnt, 0x0218, {
    prepare: 0..7,
    reserved_7_8: 7..8,
    zero: 8..16,
} }
register! { TclkTrailCnt, 0x021c, { value: 0..8 } }
register! { ThsHeaderCnt, 0x0220, {
    prepare: 0..7,
    reserved_7_8: 7..8,
    zero: 8..15,
} }
register! { Twakeup, 0x0224, { value: 0..16 } }
register! { TclkPostCnt, 0x0228, { value: 0..11 } }
register! { ThsTrailCnt, 0x022c, { value: 0..4 } }
register! { HpdCtl, 0x8544, {
    reserved_0_4: 0..4,
    output: 4..5,
    reserved_5_8: 5..8,
} }
register! { EdidMode, 0x85c7, {
    mode: 0..2,
    reserved_2_8: 2..8,
} }
register! { EdidLen1, 0x85ca, { value: 0..8 } }
register! { EdidLen2, 0x85cb, { value: 0..8 } }
register! { SysStatus, 0x8520, {
    ddc5v: 0..1,
    tmds: 1..2,
    phy_pll: 2..3,
    phy_scdt: 3..4,
    hdmi: 4..5,
    hdcp: 5..6,
    avmute: 6..7,
    sync: 7..8,
} }
register! { ViStatus1, 0x8522, {
    reserved_0_2: 0..2,
    interlaced: 2..3,
    reserved_3_8: 3..8,
} }
register! { DeWidthHLo, 0x8582, { value: 0..8 } }
register! { DeWidthHHi, 0x8583, {
    value: 0..5,
    reserved_5_8: 5..8,
} }
register! { DeWidthVLo, 0x8588, { value: 0..8 } }
register! { DeWidthVHi, 0x8589, {
    value: 0..5,
    reserved_5_8: 5..8,
} }
register! { FvCntLo, 0x85a1, { value: 0..8 } }
register! { FvCntHi, 0x85a2, {
    value: 0..2,
    reserved_2_8: 2..8,
} }
