use std::{fs, path::Path, path::PathBuf};

use serde::Deserialize;

use crate::error::MappingError;

pub const DEFAULT_PORT_HINT: &str = "amx";
pub const MAX_CHANNEL: u8 = 15;

/// Bridge configuration, read from an optional YAML file.
///
/// ```yaml
/// midi:
///   input_port: amx
///   output_port: amx
///   channel: 0
/// layout: ./my-layout.yml
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub midi: MidiConfig,
    /// Layout file replacing the embedded AMX layout.
    pub layout: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MidiConfig {
    pub input_port: String,
    /// Defaults to the input port hint.
    pub output_port: Option<String>,
    /// Zero-based, 0 to 15.
    pub channel: u8,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            input_port: DEFAULT_PORT_HINT.to_string(),
            output_port: None,
            channel: 0,
        }
    }
}

impl MidiConfig {
    pub fn output_hint(&self) -> &str {
        self.output_port.as_deref().unwrap_or(&self.input_port)
    }
}

impl Config {
    pub fn from_yaml(source: &str) -> Result<Self, MappingError> {
        let config: Self = serde_yaml::from_str(source)?;
        if config.midi.channel > MAX_CHANNEL {
            return Err(MappingError::InvalidChannel(config.midi.channel));
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MappingError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }
}
