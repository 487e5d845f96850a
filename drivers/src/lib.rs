pub mod device;
pub mod devices;
pub mod edid;
pub mod error;
pub mod properties;
pub mod registers;
pub mod table;
pub mod timing;
pub mod transport;

pub use crate::device::Bridge;
pub use crate::devices::open;
pub use crate::devices::Configuration;
pub use crate::devices::Device;
pub use crate::devices::Error;
pub use crate::devices::Properties;
pub use crate::devices::Type;
pub use crate::transport::Configuration as TransportConfiguration;

pub use bincode;
pub use embedded_hal;
pub use hdmi_bridge_types as types;
