use std::collections::HashMap;

use log::info;

/// The DJ application the mapping drives.
///
/// Values are normalized parameters addressed by a group such as
/// `[Channel1]` and a key such as `play`.
pub trait Host {
    fn get_parameter(&self, group: &str, key: &str) -> f64;
    fn set_parameter(&mut self, group: &str, key: &str, value: f64);
}

/// A host write, as recorded by [`MemoryHost`].
#[derive(Debug, Clone, PartialEq)]
pub struct HostWrite {
    pub group: String,
    pub key: String,
    pub value: f64,
}

/// In-memory host used by the bridge binary and by tests.
#[derive(Debug, Default)]
pub struct MemoryHost {
    values: HashMap<(String, String), f64>,
    writes: Vec<HostWrite>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without recording a write.
    pub fn preset(&mut self, group: &str, key: &str, value: f64) {
        self.values
            .insert((group.to_string(), key.to_string()), value);
    }

    pub fn writes(&self) -> &[HostWrite] {
        &self.writes
    }

    pub fn last_write(&self) -> Option<&HostWrite> {
        self.writes.last()
    }

}

impl Host for MemoryHost {
    fn get_parameter(&self, group: &str, key: &str) -> f64 {
        self.values
            .get(&(group.to_string(), key.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    fn set_parameter(&mut self, group: &str, key: &str, value: f64) {
        info!("{group} {key} = {value:.4}");
        self.values
            .insert((group.to_string(), key.to_string()), value);
        self.writes.push(HostWrite {
            group: group.to_string(),
            key: key.to_string(),
            value,
        });
    }
}
