use crate::device::Bridge;
use crate::error;
use crate::properties;
use crate::transport;
use crate::types;

macro_rules! register {
    ($($module:ident),+) => {
        paste::paste! {
            $(
                pub mod $module;
            )+

            #[derive(Debug, Copy, Clone, PartialEq, Eq)]
            pub enum Type {
                $(
                    [<$module:camel>],
                )+
            }

            impl std::fmt::Display for Type {
                fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    match self {
                        $(
                            Self::[<$module:camel>] => write!(formatter, stringify!($module)),
                        )+
                    }
                }
            }

            impl Type {
                pub fn name(self) -> &'static str  {
                    match self {
                        $(
                            Type::[<$module:camel>] => $module::PROPERTIES.name,
                        )+
                    }
                }
            }

            #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
            #[serde(tag = "type", content = "configuration")]
            pub enum Configuration {
                $(
                    #[serde(rename = "" $module)]
                    [<$module:camel>]($module::Configuration),
                )+
            }

            impl Configuration {
                pub fn deserialize_bincode(
                    device_type: Type,
                    data: &[u8]
                ) -> bincode::Result<Configuration> {
                    match device_type {
                        $(
                            Type::[<$module:camel>] => Ok(
                                Configuration::[<$module:camel>](bincode::deserialize(data)?)
                            ),
                        )+
                    }
                }

                pub fn type_name(&self) -> &'static str {
                    match self {
                        $(
                            Configuration::[<$module:camel>](_) => Type::[<$module:camel>].name(),
                        )+
                    }
                }
            }

            pub enum Device<Transport, Delay> {
                $(
                    [<$module:camel>]($module::Device<Transport, Delay>),
                )+
            }

            /// Opens the bridge behind `transport`
            ///
            /// Without a configuration, every registered type is probed by chip identifier
            /// and the first match is opened with its default configuration.
            pub fn open<Transport, Delay>(
                transport: Transport,
                delay: Delay,
                configuration: Option<Configuration>,
                transport_configuration: Option<transport::Configuration>,
            ) -> Result<Device<Transport, Delay>, Error>
            where
                Transport: transport::Transport,
                Delay: embedded_hal::blocking::delay::DelayMs<u32>,
            {
                match configuration {
                    Some(configuration) => {
                        match configuration {
                            $(
                                Configuration::[<$module:camel>](configuration) => Ok(
                                    $module::Device::open(
                                        transport,
                                        delay,
                                        configuration,
                                        transport_configuration
                                            .as_ref()
                                            .unwrap_or(&$module::DEFAULT_TRANSPORT_CONFIGURATION),
                                    )
                                    .map(Device::[<$module:camel>])?
                                ),
                            )+
                        }
                    },
                    None => {
                        let mut transport = transport;
                        $(
                            let module_transport_configuration = transport_configuration
                                .clone()
                                .unwrap_or($module::DEFAULT_TRANSPORT_CONFIGURATION);
                            if <$module::Device<Transport, Delay> as Bridge>::probe(
                                &mut transport,
                                &module_transport_configuration,
                            )? {
                                return Ok(Device::[<$module:camel>]($module::Device::open(
                                    transport,
                                    delay,
                                    $module::PROPERTIES.default_configuration.clone(),
                                    &module_transport_configuration,
                                )?));
                            }
                        )+
                        Err(Error::NoDevice)
                    }
                }
            }

            #[derive(Debug, serde::Serialize)]
            pub enum Properties {
                $(
                    #[serde(rename = "" $module)]
                    [<$module:camel>](properties::Bridge<$module::Configuration>),
                )+
            }

            impl<Transport, Delay> Device<Transport, Delay>
            where
                Transport: transport::Transport,
                Delay: embedded_hal::blocking::delay::DelayMs<u32>,
            {
                pub fn properties(&self) -> Properties {
                    match self {
                        $(
                            Self::[<$module:camel>](_) => Properties::[<$module:camel>]($module::PROPERTIES),
                        )+
                    }
                }

                pub fn name(&self) -> &'static str {
                    match self {
                        $(
                            Self::[<$module:camel>](_) => $module::PROPERTIES.name,
                        )+
                    }
                }

                pub fn set_format(
                    &mut self,
                    width: u32,
                    height: u32,
                    encoding: types::PixelEncoding,
                ) -> Result<types::Format, Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => Ok(device.set_format(width, height, encoding)?),
                        )+
                    }
                }

                pub fn set_streaming(&mut self, enabled: bool) -> Result<(), Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => Ok(device.set_streaming(enabled)?),
                        )+
                    }
                }

                pub fn detected_standard(&self) -> Option<types::Standard> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.detected_standard(),
                        )+
                    }
                }

                pub fn signal_status(&self) -> types::SignalStatus {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => device.signal_status(),
                        )+
                    }
                }

                pub fn reset(&mut self) -> Result<(), Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => Ok(device.reset()?),
                        )+
                    }
                }

                pub fn publish_edid(&mut self, edid: &[u8]) -> Result<(), Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => Ok(device.publish_edid(edid)?),
                        )+
                    }
                }

                pub fn show_test_pattern(&mut self, standard: types::Standard) -> Result<(), Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => Ok(device.show_test_pattern(standard)?),
                        )+
                    }
                }

                pub fn update_configuration(&mut self, configuration: Configuration) -> Result<(), Error> {
                    match self {
                        $(
                            Self::[<$module:camel>](device) => match configuration {
                                Configuration::[<$module:camel>](configuration) => {
                                    device.update_configuration(configuration);
                                    Ok(())
                                },
                                #[allow(unreachable_patterns)]
                                configuration => Err(Error::UpdateMismatch {
                                    configuration: configuration.type_name().to_owned(),
                                    device: $module::PROPERTIES.name.to_owned(),
                                })
                            },
                        )+
                    }
                }
            }

            #[derive(Debug, PartialEq, Eq)]
            pub struct ParseTypeError {
                on: String
            }

            impl std::fmt::Display for ParseTypeError {
                fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    write!(formatter, "unknown device type \"{}\"", self.on)
                }
            }

            impl std::str::FromStr for Type {
                type Err = ParseTypeError;

                fn from_str(string: &str) -> Result<Self, Self::Err> {
                    match string {
                        $(
                            stringify!($module) => Ok(Self::[<$module:camel>]),
                        )+
                        _ => Err(Self::Err {on: string.to_owned()}),
                    }
                }
            }

            #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
            pub enum Error {
                #[error(transparent)]
                Bridge(#[from] error::Error),

                #[error("no supported bridge answered")]
                NoDevice,

                #[error("configuration for {configuration:?} is not compatible with device {device:?}")]
                UpdateMismatch {
                    configuration: String,
                    device: String,
                },
            }
        }
    };
}

register! { tc358743 }
