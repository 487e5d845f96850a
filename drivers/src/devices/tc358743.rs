use crate::device;
use crate::edid;
use crate::error::Error;
use crate::error::Rejection;
use crate::properties;
use crate::registers;
use crate::registers::Register;
use crate::table;
use crate::timing;
use crate::transport;
use crate::types;

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum LockWait {
    /// Sleeps for a fixed duration and assumes the receiver has locked
    Fixed { delay_ms: u32 },

    /// Polls the sync bit of SYS_STATUS until it is set or `timeout_ms` elapses
    Poll { interval_ms: u32, timeout_ms: u32 },
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Configuration {
    pub lock_wait: LockWait,
    pub hotplug_settle_ms: u32,
    pub edid: std::borrow::Cow<'static, [u8]>,
}

impl Configuration {
    pub fn deserialize_bincode(data: &[u8]) -> bincode::Result<Configuration> {
        bincode::deserialize(data)
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub enum State {
    Idle,
    Resetting,
    AwaitingLock,
    Measuring,
    Validating,
    Reconfiguring,
    Streaming,
    Faulted,
}

/// CSI-2 link used to carry a standard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub frequency: u32,
    pub lanes: u8,
}

pub const CHIP_ID: u8 = 0x47;

pub const FRAME_SIZES: [types::FrameSize; 4] = [
    types::FrameSize {
        width: 640,
        height: 480,
    },
    types::FrameSize {
        width: 1280,
        height: 720,
    },
    types::FrameSize {
        width: 1280,
        height: 1024,
    },
    types::FrameSize {
        width: 1920,
        height: 1080,
    },
];

pub const DEFAULT_FORMAT: types::Format = types::Format {
    width: 640,
    height: 480,
    encoding: types::PixelEncoding::Uyvy8_2x8,
};

pub const PROPERTIES: properties::Bridge<Configuration> = properties::Bridge {
    name: "Toshiba TC358743",
    frame_sizes: &FRAME_SIZES,
    default_configuration: Configuration {
        lock_wait: LockWait::Fixed { delay_ms: 100 },
        hotplug_settle_ms: edid::DEFAULT_HOTPLUG_SETTLE_MS,
        edid: std::borrow::Cow::Borrowed(&edid::DEFAULT),
    },
};

pub const DEFAULT_TRANSPORT_CONFIGURATION: transport::Configuration = transport::Configuration {
    peer_address: 0x0f,
    max_write_length: 10,
};

// 720p and SXGA share a width, heights at or above this are SXGA
pub const SXGA_MINIMUM_HEIGHT: u32 = 872;

// FV_CNT counts 100 us periods per frame
pub const FRAME_COUNT_SCALE: u32 = 10000;

pub static RESET: table::Table = table::Table {
    name: "reset",
    entries: &[
        table::Entry::new(0x7080, 0x0000),
        table::Entry::new(0x0004, 0x0004),
        table::Entry::new(0x0002, 0x0f00).delay(100),
        table::Entry::new(0x0002, 0x0000).delay(1000),
        // HDMI PHY power cycle
        table::Entry::new(0x8534, 0x00).delay(1),
        table::Entry::new(0x8535, 0x00).delay(1),
        table::Entry::new(0x8535, 0x01),
        table::Entry::new(0x8534, 0x01),
    ],
};

pub static HDMI_RECEIVER: table::Table = table::Table {
    name: "hdmi receiver",
    entries: &[
        // interrupt masks
        table::Entry::new(0x8502, 0x01),
        table::Entry::new(0x8512, 0xfe),
        table::Entry::new(0x8514, 0x00),
        table::Entry::new(0x8515, 0x00),
        table::Entry::new(0x8516, 0x00),
        // 27 MHz system clock
        table::Entry::new(0x8531, 0x01),
        table::Entry::new(0x8540, 0x8c),
        table::Entry::new(0x8541, 0x0a),
        // PHY
        table::Entry::new(0x8532, 0x80),
        table::Entry::new(0x8536, 0x40),
        table::Entry::new(0x853f, 0x0a),
        // DDC and hot-plug
        table::Entry::new(0x8543, 0x32),
        table::Entry::new(0x8544, 0x00).delay(100),
        table::Entry::new(0x8545, 0x31),
        table::Entry::new(0x8546, 0x2d),
        table::Entry::new(0x85c7, 0x01),
        // HDCP off
        table::Entry::new(0x85d1, 0x01),
        table::Entry::new(0x8560, 0x24),
        table::Entry::new(0x8563, 0x11),
        table::Entry::new(0x8564, 0x0f),
        // RGB to YUV 4:2:2
        table::Entry::new(0x8571, 0x02),
        table::Entry::new(0x8573, 0x81),
        table::Entry::new(0x8576, 0x60),
        // InfoFrame extraction
        table::Entry::new(0x8709, 0xff),
        table::Entry::new(0x870b, 0x2c),
        table::Entry::new(0x870c, 0x53),
        table::Entry::new(0x870d, 0x01),
        table::Entry::new(0x870e, 0x30),
        table::Entry::new(0x9007, 0x10),
        table::Entry::new(0x854a, 0x01),
    ],
};

pub static LANES_2: table::Table = table::Table {
    name: "2 lanes",
    entries: &[
        table::Entry::new(0x0140, 0x00000000),
        table::Entry::new(0x0144, 0x00000000),
        table::Entry::new(0x0148, 0x00000000),
        table::Entry::new(0x014c, 0x00000001),
        table::Entry::new(0x0150, 0x00000001),
        table::Entry::new(0x0234, 0x00000007),
        // continuous clock
        table::Entry::new(0x0238, 0x00000001),
        table::Entry::new(0x0204, 0x00000001),
        table::Entry::new(0x0518, 0x00000001),
        table::Entry::new(0x0500, 0xa30080a2),
        table::Entry::new(0x0004, 0x0cf7),
    ],
};

pub static LANES_4: table::Table = table::Table {
    name: "4 lanes",
    entries: &[
        table::Entry::new(0x0140, 0x00000000),
        table::Entry::new(0x0144, 0x00000000),
        table::Entry::new(0x0148, 0x00000000),
        table::Entry::new(0x014c, 0x00000000),
        table::Entry::new(0x0150, 0x00000000),
        table::Entry::new(0x0234, 0x0000001f),
        // continuous clock
        table::Entry::new(0x0238, 0x00000001),
        table::Entry::new(0x0204, 0x00000001),
        table::Entry::new(0x0518, 0x00000001),
        table::Entry::new(0x0500, 0xa30080a6),
        table::Entry::new(0x0004, 0x0cf7),
    ],
};

pub static STREAM_OFF: table::Table = table::Table {
    name: "stream off",
    entries: &[table::Entry::new(0x0004, 0x0cf4)],
};

pub static COLOR_BAR_640_480: table::Table = table::Table {
    name: "color bar 640x480",
    entries: &[
        table::Entry::new(0x000a, 0x0500),
        table::Entry::new(0x7080, 0x0082),
        // black
        table::Entry::new(0x7000, 0x007f).repeat(80, 1),
        // blue
        table::Entry::new(0x7000, 0x00ff),
        table::Entry::new(0x7000, 0x0000).repeat(40, 2),
        // red
        table::Entry::new(0x7000, 0x0000),
        table::Entry::new(0x7000, 0x00ff).repeat(40, 2),
        // pink
        table::Entry::new(0x7000, 0x7fff),
        table::Entry::new(0x7000, 0x7fff).repeat(40, 2),
        // green
        table::Entry::new(0x7000, 0x7f00),
        table::Entry::new(0x7000, 0x7f00).repeat(40, 2),
        // light blue
        table::Entry::new(0x7000, 0xc0ff),
        table::Entry::new(0x7000, 0xc000).repeat(40, 2),
        // yellow
        table::Entry::new(0x7000, 0xff00),
        table::Entry::new(0x7000, 0xffff).repeat(40, 2),
        // white
        table::Entry::new(0x7000, 0xff7f),
        table::Entry::new(0x7000, 0xff7f).repeat(40, 2),
        table::Entry::new(0x7090, 0x01df),
        table::Entry::new(0x7092, 0x0898),
        table::Entry::new(0x7094, 0x0285),
        table::Entry::new(0x7080, 0x0083),
    ],
};

pub static COLOR_BAR_1280_720: table::Table = table::Table {
    name: "color bar 1280x720",
    entries: &[
        table::Entry::new(0x000a, 0x0a00),
        table::Entry::new(0x7080, 0x0082),
        // black
        table::Entry::new(0x7000, 0x007f).repeat(160, 1),
        // blue
        table::Entry::new(0x7000, 0x00ff),
        table::Entry::new(0x7000, 0x0000).repeat(80, 2),
        // red
        table::Entry::new(0x7000, 0x0000),
        table::Entry::new(0x7000, 0x00ff).repeat(80, 2),
        // pink
        table::Entry::new(0x7000, 0x7fff),
        table::Entry::new(0x7000, 0x7fff).repeat(80, 2),
        // green
        table::Entry::new(0x7000, 0x7f00),
        table::Entry::new(0x7000, 0x7f00).repeat(80, 2),
        // light blue
        table::Entry::new(0x7000, 0xc0ff),
        table::Entry::new(0x7000, 0xc000).repeat(80, 2),
        // yellow
        table::Entry::new(0x7000, 0xff00),
        table::Entry::new(0x7000, 0xffff).repeat(80, 2),
        // white
        table::Entry::new(0x7000, 0xff7f),
        table::Entry::new(0x7000, 0xff7f).repeat(80, 2),
        table::Entry::new(0x7090, 0x02cf),
        table::Entry::new(0x7092, 0x06b8),
        table::Entry::new(0x7094, 0x0010),
        table::Entry::new(0x7080, 0x0083),
    ],
};

/// Rounds a request up to the smallest supported frame size
///
/// The chip only outputs UYVY, other encodings are coerced.
pub fn try_format(
    width: u32,
    height: u32,
    encoding: types::PixelEncoding,
) -> Result<types::Format, Error> {
    let frame_size = FRAME_SIZES
        .iter()
        .find(|frame_size| frame_size.width >= width && frame_size.height >= height)
        .ok_or(Error::UnsupportedMode { width, height })?;
    if encoding != types::PixelEncoding::Uyvy8_2x8 {
        log::debug!("{:?} is not supported, using UYVY", encoding);
    }
    Ok(types::Format {
        width: frame_size.width,
        height: frame_size.height,
        encoding: types::PixelEncoding::Uyvy8_2x8,
    })
}

pub fn standard(width: u32, height: u32) -> Result<types::Standard, Error> {
    match width {
        640 => Ok(types::Standard::Vga),
        1280 if height < SXGA_MINIMUM_HEIGHT => Ok(types::Standard::Hd720),
        1280 => Ok(types::Standard::Sxga),
        1920 => Ok(types::Standard::FullHd1080),
        _ => Err(Error::UnsupportedMode { width, height }),
    }
}

pub fn link(standard: types::Standard) -> Link {
    match standard {
        types::Standard::Vga => Link {
            frequency: 500,
            lanes: 2,
        },
        types::Standard::Hd720 => Link {
            frequency: 350,
            lanes: 4,
        },
        types::Standard::Sxga => Link {
            frequency: 450,
            lanes: 4,
        },
        types::Standard::FullHd1080 => Link {
            frequency: 600,
            lanes: 4,
        },
    }
}

pub fn lanes_table(lanes: u8) -> &'static table::Table {
    if lanes <= 2 {
        &LANES_2
    } else {
        &LANES_4
    }
}

pub fn test_pattern(standard: types::Standard) -> Option<&'static table::Table> {
    match standard {
        types::Standard::Vga => Some(&COLOR_BAR_640_480),
        types::Standard::Hd720 => Some(&COLOR_BAR_1280_720),
        _ => None,
    }
}

pub fn frame_rate(frame_count: u32) -> Option<u32> {
    if frame_count == 0 {
        None
    } else {
        Some((FRAME_COUNT_SCALE + frame_count / 2) / frame_count)
    }
}

/// Reads the sensed input geometry, without side effects
pub fn measure<Transport>(
    registers: &mut registers::Registers<Transport>,
) -> Result<types::DetectedMode, Error>
where
    Transport: transport::Transport,
{
    let width = registers.read(registers::DeWidthHLo::ADDRESS)?
        | (registers::DeWidthHHi::from_value(registers.read(registers::DeWidthHHi::ADDRESS)?)
            .value
            << 8);
    let height = registers.read(registers::DeWidthVLo::ADDRESS)?
        | (registers::DeWidthVHi::from_value(registers.read(registers::DeWidthVHi::ADDRESS)?)
            .value
            << 8);
    let interlaced = registers::ViStatus1::from_value(
        registers.read(registers::ViStatus1::ADDRESS)?,
    )
    .interlaced
        != 0;
    let frame_count = registers.read(registers::FvCntLo::ADDRESS)?
        | (registers::FvCntHi::from_value(registers.read(registers::FvCntHi::ADDRESS)?).value
            << 8);
    Ok(types::DetectedMode {
        width,
        height: if interlaced { height * 2 } else { height },
        frame_rate: frame_rate(frame_count),
        interlaced,
    })
}

/// Height is not checked, it only selects between standards that share a width
pub fn validate(requested: &types::Format, mode: &types::DetectedMode) -> Result<(), Rejection> {
    if mode.width == 0 {
        return Err(Rejection::NoSignal);
    }
    match mode.frame_rate {
        None | Some(0) => return Err(Rejection::NoFrameRate),
        Some(_) => (),
    }
    if mode.width != requested.width {
        return Err(Rejection::WidthMismatch {
            requested: requested.width,
            measured: mode.width,
        });
    }
    Ok(())
}

pub struct Device<Transport, Delay> {
    registers: registers::Registers<Transport>,
    delay: Delay,
    configuration: Configuration,
    format: types::Format,
    state: State,
    detected: Option<types::DetectedMode>,
    standard: Option<types::Standard>,
    generation: u64,
}

impl<Transport, Delay> Device<Transport, Delay>
where
    Transport: transport::Transport,
    Delay: embedded_hal::blocking::delay::DelayMs<u32>,
{
    pub fn state(&self) -> State {
        self.state
    }

    pub fn format(&self) -> types::Format {
        self.format
    }

    pub fn detected_mode(&self) -> Option<types::DetectedMode> {
        self.detected
    }

    /// Number of format requests received since open
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn release(self) -> (Transport, Delay) {
        (self.registers.release(), self.delay)
    }

    fn transition(&mut self, state: State) {
        log::debug!("{:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn reject(&mut self, rejection: Rejection) {
        log::warn!("measurement rejected ({})", rejection);
        self.transition(State::Idle);
    }

    fn fault(&mut self, error: Error) -> Error {
        log::error!("{}", error);
        self.transition(State::Faulted);
        error
    }

    fn initialize(&mut self) -> Result<(), Error> {
        table::run(&mut self.registers, &mut self.delay, &RESET)?;
        table::run(&mut self.registers, &mut self.delay, &HDMI_RECEIVER)?;
        edid::publish_edid(&mut self.registers, &self.configuration.edid)?;
        edid::toggle_hotplug(
            &mut self.registers,
            &mut self.delay,
            true,
            self.configuration.hotplug_settle_ms,
        )?;
        Ok(())
    }

    fn await_lock(&mut self) -> Result<(), Error> {
        match self.configuration.lock_wait {
            LockWait::Fixed { delay_ms } => {
                self.delay.delay_ms(delay_ms);
                Ok(())
            }
            LockWait::Poll {
                interval_ms,
                timeout_ms,
            } => {
                let interval_ms = interval_ms.max(1);
                let mut waited_ms = 0u32;
                loop {
                    let status = registers::SysStatus::from_value(
                        registers::SysStatus::default().read(&mut self.registers)?,
                    );
                    if status.sync == 1 {
                        log::debug!("sync lock after {} ms", waited_ms);
                        return Ok(());
                    }
                    if waited_ms >= timeout_ms {
                        return Err(Error::MeasurementRejected(Rejection::LockTimeout {
                            timeout_ms,
                        }));
                    }
                    self.delay.delay_ms(interval_ms);
                    waited_ms = waited_ms.saturating_add(interval_ms);
                }
            }
        }
    }

    fn detect(&mut self) -> Result<types::Standard, Error> {
        self.detected = None;
        self.standard = None;
        self.transition(State::Resetting);
        self.initialize()?;
        self.transition(State::AwaitingLock);
        self.await_lock()?;
        self.transition(State::Measuring);
        let mode = measure(&mut self.registers)?;
        log::debug!(
            "measured {}x{} at {:?} fps{}",
            mode.width,
            mode.height,
            mode.frame_rate,
            if mode.interlaced { " (interlaced)" } else { "" }
        );
        self.detected = Some(mode);
        self.transition(State::Validating);
        validate(&self.format, &mode).map_err(Error::MeasurementRejected)?;
        self.transition(State::Reconfiguring);
        let standard = standard(mode.width, mode.height)?;
        let link = link(standard);
        timing::select_and_apply(&mut self.registers, &mut self.delay, link.frequency)?;
        table::run(&mut self.registers, &mut self.delay, lanes_table(link.lanes))?;
        self.standard = Some(standard);
        self.transition(State::Streaming);
        log::info!(
            "streaming {} over {} lanes at {} MHz",
            standard,
            link.lanes,
            link.frequency
        );
        Ok(standard)
    }

    fn generate(
        &mut self,
        standard: types::Standard,
        pattern: &'static table::Table,
    ) -> Result<(), Error> {
        let link = link(standard);
        table::run(&mut self.registers, &mut self.delay, &RESET)?;
        timing::select_and_apply(&mut self.registers, &mut self.delay, link.frequency)?;
        table::run(&mut self.registers, &mut self.delay, lanes_table(link.lanes))?;
        table::run(&mut self.registers, &mut self.delay, pattern)?;
        Ok(())
    }
}

impl<Transport, Delay> device::Bridge for Device<Transport, Delay>
where
    Transport: transport::Transport,
    Delay: embedded_hal::blocking::delay::DelayMs<u32>,
{
    type Transport = Transport;

    type Delay = Delay;

    type Configuration = Configuration;

    type Error = Error;

    type Properties = properties::Bridge<Self::Configuration>;

    const CHIP_ID: u8 = CHIP_ID;

    const PROPERTIES: Self::Properties = PROPERTIES;

    const DEFAULT_TRANSPORT_CONFIGURATION: transport::Configuration =
        DEFAULT_TRANSPORT_CONFIGURATION;

    fn open(
        transport: Self::Transport,
        delay: Self::Delay,
        configuration: Self::Configuration,
        transport_configuration: &transport::Configuration,
    ) -> Result<Self, Self::Error> {
        let mut registers = registers::Registers::new(transport, transport_configuration.clone());
        let chip_id =
            registers::ChipId::from_value(registers::ChipId::default().read(&mut registers)?);
        if chip_id.chip != CHIP_ID as u32 {
            return Err(Error::UnexpectedChipId {
                expected: CHIP_ID,
                read: chip_id.chip as u8,
            });
        }
        log::debug!("TC358743 revision {}", chip_id.revision);
        let mut device = Self {
            registers,
            delay,
            configuration,
            format: DEFAULT_FORMAT,
            state: State::Resetting,
            detected: None,
            standard: None,
            generation: 0,
        };
        device.initialize()?;
        device.transition(State::Idle);
        Ok(device)
    }

    fn update_configuration(&mut self, configuration: Self::Configuration) {
        log::debug!("configuration updated, applied on the next reset");
        self.configuration = configuration;
    }

    fn set_format(
        &mut self,
        width: u32,
        height: u32,
        encoding: types::PixelEncoding,
    ) -> Result<types::Format, Self::Error> {
        if self.state == State::Faulted {
            return Err(Error::Faulted);
        }
        let format = try_format(width, height, encoding)?;
        self.format = format;
        self.generation += 1;
        log::debug!(
            "format request {}: {}x{}",
            self.generation,
            format.width,
            format.height
        );
        match self.detect() {
            Ok(_) => Ok(format),
            Err(Error::MeasurementRejected(rejection)) => {
                self.reject(rejection);
                Ok(format)
            }
            Err(error) => Err(self.fault(error)),
        }
    }

    fn set_streaming(&mut self, enabled: bool) -> Result<(), Self::Error> {
        if self.state == State::Faulted {
            return Err(Error::Faulted);
        }
        if enabled {
            if self.state == State::Streaming {
                return Ok(());
            }
            match self.detect() {
                Ok(_) => Ok(()),
                Err(Error::MeasurementRejected(rejection)) => {
                    self.reject(rejection);
                    Err(Error::MeasurementRejected(rejection))
                }
                Err(error) => Err(self.fault(error)),
            }
        } else {
            if let Err(error) = table::run(&mut self.registers, &mut self.delay, &STREAM_OFF) {
                return Err(self.fault(error));
            }
            self.format = DEFAULT_FORMAT;
            self.standard = None;
            self.transition(State::Idle);
            Ok(())
        }
    }

    fn detected_standard(&self) -> Option<types::Standard> {
        self.standard
    }

    fn signal_status(&self) -> types::SignalStatus {
        match self.detected {
            Some(mode) if mode.width > 0 && mode.frame_rate.is_some() => {
                types::SignalStatus::Locked
            }
            _ => types::SignalStatus::NoSignal,
        }
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.detected = None;
        self.standard = None;
        self.format = DEFAULT_FORMAT;
        self.transition(State::Resetting);
        match self.initialize() {
            Ok(()) => {
                self.transition(State::Idle);
                Ok(())
            }
            Err(error) => Err(self.fault(error)),
        }
    }

    fn publish_edid(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.state == State::Faulted {
            return Err(Error::Faulted);
        }
        if bytes.len() > edid::CAPACITY {
            return Err(Error::EdidTooLong {
                length: bytes.len(),
                capacity: edid::CAPACITY,
            });
        }
        if let Err(error) = edid::publish_edid(&mut self.registers, bytes).and_then(|_| {
            edid::toggle_hotplug(
                &mut self.registers,
                &mut self.delay,
                true,
                self.configuration.hotplug_settle_ms,
            )
        }) {
            return Err(self.fault(error));
        }
        self.configuration.edid = std::borrow::Cow::Owned(bytes.to_vec());
        Ok(())
    }

    fn show_test_pattern(&mut self, standard: types::Standard) -> Result<(), Self::Error> {
        if self.state == State::Faulted {
            return Err(Error::Faulted);
        }
        let frame_size = standard.frame_size();
        let pattern = test_pattern(standard).ok_or(Error::UnsupportedMode {
            width: frame_size.width,
            height: frame_size.height,
        })?;
        self.detected = None;
        self.standard = None;
        self.transition(State::Resetting);
        if let Err(error) = self.generate(standard, pattern) {
            return Err(self.fault(error));
        }
        self.format = types::Format {
            width: frame_size.width,
            height: frame_size.height,
            encoding: types::PixelEncoding::Uyvy8_2x8,
        };
        self.standard = Some(standard);
        self.transition(State::Streaming);
        log::info!("color bars {}", standard);
        Ok(())
    }
}
