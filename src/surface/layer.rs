use super::ContainerId;
use crate::midi::Sentinel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayerMode {
    #[default]
    DefaultActive,
    AlternateActive,
}

/// Momentary layer button.
///
/// While held, the default layer is disconnected and the alternate layer
/// connected; releasing it swaps them back. When several layer buttons are
/// held, the surface keeps a default container disconnected as long as any
/// held layer lists it.
#[derive(Debug, Clone)]
pub struct LayerController {
    name: String,
    default_layer: Vec<ContainerId>,
    alternate_layer: Vec<ContainerId>,
    mode: LayerMode,
}

impl LayerController {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_layer: Vec::new(),
            alternate_layer: Vec::new(),
            mode: LayerMode::DefaultActive,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> LayerMode {
        self.mode
    }

    pub fn default_layer(&self) -> &[ContainerId] {
        &self.default_layer
    }

    pub fn alternate_layer(&self) -> &[ContainerId] {
        &self.alternate_layer
    }

    pub(crate) fn push_default(&mut self, container: ContainerId) {
        if !self.default_layer.contains(&container) {
            self.default_layer.push(container);
        }
    }

    pub(crate) fn push_alternate(&mut self, container: ContainerId) {
        if !self.alternate_layer.contains(&container) {
            self.alternate_layer.push(container);
        }
    }

    /// Apply a sentinel. Returns the new mode only when it changed.
    pub(crate) fn transition(&mut self, sentinel: Sentinel) -> Option<LayerMode> {
        let next = match sentinel {
            Sentinel::On => LayerMode::AlternateActive,
            Sentinel::Off => LayerMode::DefaultActive,
        };
        if next == self.mode {
            return None;
        }
        self.mode = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_are_sets() {
        let mut layer = LayerController::new("layer1");
        layer.push_default(ContainerId(0));
        layer.push_default(ContainerId(1));
        layer.push_default(ContainerId(0));
        layer.push_alternate(ContainerId(2));
        layer.push_alternate(ContainerId(2));

        assert_eq!(layer.default_layer(), &[ContainerId(0), ContainerId(1)]);
        assert_eq!(layer.alternate_layer(), &[ContainerId(2)]);
    }

    #[test]
    fn transitions_only_on_change() {
        let mut layer = LayerController::new("layer1");
        assert_eq!(layer.transition(Sentinel::Off), None);
        assert_eq!(layer.transition(Sentinel::On), Some(LayerMode::AlternateActive));
        assert_eq!(layer.transition(Sentinel::On), None);
        assert_eq!(layer.transition(Sentinel::Off), Some(LayerMode::DefaultActive));
        assert_eq!(layer.mode(), LayerMode::DefaultActive);
    }
}
