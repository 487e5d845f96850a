use crate::error;
use crate::registers;
use crate::registers::Register;
use crate::transport;
use crate::types;

pub trait Bridge: Sized {
    type Transport: transport::Transport;
    type Delay: embedded_hal::blocking::delay::DelayMs<u32>;
    type Configuration;
    type Error;
    type Properties;

    const CHIP_ID: u8;

    const PROPERTIES: Self::Properties;

    const DEFAULT_TRANSPORT_CONFIGURATION: transport::Configuration;

    fn open(
        transport: Self::Transport,
        delay: Self::Delay,
        configuration: Self::Configuration,
        transport_configuration: &transport::Configuration,
    ) -> Result<Self, Self::Error>;

    fn update_configuration(&mut self, configuration: Self::Configuration);

    fn set_format(
        &mut self,
        width: u32,
        height: u32,
        encoding: types::PixelEncoding,
    ) -> Result<types::Format, Self::Error>;

    fn set_streaming(&mut self, enabled: bool) -> Result<(), Self::Error>;

    fn detected_standard(&self) -> Option<types::Standard>;

    fn signal_status(&self) -> types::SignalStatus;

    fn reset(&mut self) -> Result<(), Self::Error>;

    fn publish_edid(&mut self, edid: &[u8]) -> Result<(), Self::Error>;

    fn show_test_pattern(&mut self, standard: types::Standard) -> Result<(), Self::Error>;

    fn probe(
        transport: &mut Self::Transport,
        transport_configuration: &transport::Configuration,
    ) -> Result<bool, error::Error> {
        let mut registers =
            registers::Registers::new(transport, transport_configuration.clone());
        let chip_id =
            registers::ChipId::from_value(registers::ChipId::default().read(&mut registers)?);
        Ok(chip_id.chip == Self::CHIP_ID as u32)
    }
}
