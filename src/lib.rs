//! Layered MIDI mapping for DJ controllers.
//!
//! A [`ControlRegistry`] names the controller's MIDI data bytes, components
//! on a [`ControlSurface`] bind them to host parameters, and shift and layer
//! controllers remap or swap groups of components at runtime. [`amx`] holds
//! the mapping for the Akai AMX.

pub mod amx;
pub mod config;
pub mod error;
pub mod host;
pub mod midi;
pub mod midi_bridge;
pub mod registry;
pub mod surface;

#[cfg(test)]
mod test_log;

pub use amx::AmxMapping;
pub use config::Config;
pub use error::{MappingError, MidiIoError};
pub use host::{Host, MemoryHost};
pub use midi::{Channel, ControlAddress, MidiMessage};
pub use registry::{ControlRegistry, DeckMapping, RegistryEntry};
pub use surface::ControlSurface;
