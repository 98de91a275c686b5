use std::{collections::BTreeMap, fs, path::Path};

use log::warn;
use serde::Deserialize;

use crate::error::MappingError;

/// Layout shipped with the bridge.
pub const DEFAULT_LAYOUT: &str = include_str!("../amx-fv.yml");

/// One entry of the layout table.
///
/// A scalar is a global control shared by both units, an indexed entry holds
/// one data byte per unit (0 = left, 1 = right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RegistryEntry {
    Scalar(u8),
    Indexed(u8, u8),
}

impl RegistryEntry {
    fn get(&self, index: Option<usize>) -> Option<u8> {
        match (*self, index) {
            (RegistryEntry::Scalar(value), _) => Some(value),
            (RegistryEntry::Indexed(left, _), Some(0)) => Some(left),
            (RegistryEntry::Indexed(_, right), Some(1)) => Some(right),
            (RegistryEntry::Indexed(..), _) => None,
        }
    }
}

/// Static table from symbolic control names to MIDI data bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ControlRegistry {
    layout: BTreeMap<String, RegistryEntry>,
}

impl ControlRegistry {
    pub fn from_yaml(source: &str) -> Result<Self, MappingError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MappingError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// The embedded Akai AMX layout.
    pub fn amx() -> Result<Self, MappingError> {
        Self::from_yaml(DEFAULT_LAYOUT)
    }

    pub fn entry(&self, name: &str) -> Option<RegistryEntry> {
        self.layout.get(name).copied()
    }

    /// Look up a data byte without reporting anything.
    pub fn try_resolve(&self, name: &str, index: Option<usize>) -> Result<u8, MappingError> {
        self.layout
            .get(name)
            .and_then(|entry| entry.get(index))
            .ok_or_else(|| MappingError::MissingMapping {
                name: name.to_string(),
                index,
            })
    }

    /// Look up a data byte. A missing name or index is reported once as a
    /// warning and yields `None`; callers bind nothing in that case.
    pub fn resolve(&self, name: &str, index: Option<usize>) -> Option<u8> {
        match self.try_resolve(name, index) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("{err}");
                None
            }
        }
    }
}

/// One physical deck unit of the controller.
///
/// `index` selects the element of indexed registry entries, `group_number`
/// is the host's deck number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckMapping {
    index: usize,
    group_number: u8,
}

impl DeckMapping {
    pub fn new(index: usize, group_number: u8) -> Self {
        Self {
            index,
            group_number,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn group_number(&self) -> u8 {
        self.group_number
    }

    /// Host group of the deck, e.g. `[Channel1]`.
    pub fn group(&self) -> String {
        format!("[Channel{}]", self.group_number)
    }

    pub fn control(&self, registry: &ControlRegistry, name: &str) -> Option<u8> {
        registry.resolve(name, Some(self.index))
    }

    pub fn control_at(&self, registry: &ControlRegistry, name: &str, index: usize) -> Option<u8> {
        registry.resolve(name, Some(index))
    }
}
