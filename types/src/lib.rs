#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PixelEncoding {
    Uyvy8_2x8,
    Yuyv8_2x8,
    Rgb888_1x24,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

/// Format accepted by a bridge, after rounding to a supported frame size
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Format {
    pub width: u32,
    pub height: u32,
    pub encoding: PixelEncoding,
}

impl Format {
    pub fn frame_size(&self) -> FrameSize {
        FrameSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Geometry sensed on the HDMI input
///
/// `frame_rate` is `None` when the frame counter reads zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DetectedMode {
    pub width: u32,
    pub height: u32,
    pub frame_rate: Option<u32>,
    pub interlaced: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Standard {
    Vga,
    Hd720,
    Sxga,
    FullHd1080,
}

impl Standard {
    pub fn frame_size(self) -> FrameSize {
        match self {
            Self::Vga => FrameSize {
                width: 640,
                height: 480,
            },
            Self::Hd720 => FrameSize {
                width: 1280,
                height: 720,
            },
            Self::Sxga => FrameSize {
                width: 1280,
                height: 1024,
            },
            Self::FullHd1080 => FrameSize {
                width: 1920,
                height: 1080,
            },
        }
    }
}

impl std::fmt::Display for Standard {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let frame_size = self.frame_size();
        write!(formatter, "{}x{}", frame_size.width, frame_size.height)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SignalStatus {
    Locked,
    NoSignal,
}
