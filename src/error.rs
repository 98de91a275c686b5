use thiserror::Error;

use crate::midi::ControlAddress;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("no valid midi number found for control name: {name}{}", .index.map(|i| format!("[{i}]")).unwrap_or_default())]
    MissingMapping { name: String, index: Option<usize> },

    #[error("address {address} is already claimed by {owner}")]
    AddressInUse {
        address: ControlAddress,
        owner: String,
    },

    #[error("adding {child} to {parent} would create a container cycle")]
    ContainerCycle { parent: String, child: String },

    #[error("MIDI channel {0} is out of range (0-15)")]
    InvalidChannel(u8),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum MidiIoError {
    #[error("failed to initialise MIDI: {0}")]
    MidiInit(String),
    #[error("no MIDI port matching \"{0}\" was found")]
    PortNotFound(String),
    #[error("failed to open MIDI connection: {0}")]
    Connection(String),
    #[error("failed to send MIDI message: {0}")]
    Send(String),
    #[error("midi output thread error: {0}")]
    Thread(String),
}
