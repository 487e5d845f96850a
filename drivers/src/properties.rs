use crate::types;

#[derive(Debug, serde::Serialize)]
pub struct Bridge<Configuration> {
    pub name: &'static str,
    pub frame_sizes: &'static [types::FrameSize],
    pub default_configuration: Configuration,
}
