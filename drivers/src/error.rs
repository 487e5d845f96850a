#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoSignal,
    NoFrameRate,
    WidthMismatch { requested: u32, measured: u32 },
    LockTimeout { timeout_ms: u32 },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSignal => write!(formatter, "no active video on the HDMI input"),
            Self::NoFrameRate => write!(formatter, "the frame rate is not measurable"),
            Self::WidthMismatch {
                requested,
                measured,
            } => write!(
                formatter,
                "measured width {measured} does not match requested width {requested}"
            ),
            Self::LockTimeout { timeout_ms } => {
                write!(formatter, "no sync lock after {timeout_ms} ms")
            }
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("transport error while accessing register {address:#06x} ({message})")]
    Transport { address: u16, message: String },

    #[error("register {0:#06x} is not covered by the address width table")]
    UnknownRegister(u16),

    #[error("value {value:#x} does not fit in register {address:#06x} ({width} bytes)")]
    ValueOverflow { address: u16, value: u32, width: u8 },

    #[error("burst of {length} bytes at {address:#06x} does not fit in a single transfer or range")]
    BurstTooLong { address: u16, length: usize },

    #[error("repeat block of entry {index} jumps back {distance} entries")]
    RepeatOutOfRange { index: usize, distance: u8 },

    #[error("repeat block of entry {index} contains the repeat of entry {inner}")]
    NestedRepeat { index: usize, inner: usize },

    #[error("{width}x{height} is not a supported mode")]
    UnsupportedMode { width: u32, height: u32 },

    #[error("{0} MHz is outside the PLL range")]
    UnsupportedFrequency(u32),

    #[error("measurement rejected ({0})")]
    MeasurementRejected(Rejection),

    #[error("EDID is {length} bytes long but the EDID window holds {capacity} bytes")]
    EdidTooLong { length: usize, capacity: usize },

    #[error("chip identifier {read:#04x} does not match {expected:#04x}")]
    UnexpectedChipId { expected: u8, read: u8 },

    #[error("the bridge is faulted and must be reset")]
    Faulted,
}
