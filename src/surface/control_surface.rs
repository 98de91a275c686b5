use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use super::{Component, Container, LayerController, LayerMode, Member, ShiftController, ShiftMode};
use crate::error::MappingError;
use crate::host::Host;
use crate::midi::{ControlAddress, MidiMessage, Sentinel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShiftId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControllerRef {
    Shift(ShiftId),
    Layer(LayerId),
}

/// Collects LED messages produced while handling an event.
///
/// A second write to the same address replaces the pending value, so each
/// drain sends at most one message per LED.
pub struct LedHandle<'a> {
    pending: &'a mut Vec<MidiMessage>,
}

impl<'a> LedHandle<'a> {
    pub(crate) fn new(pending: &'a mut Vec<MidiMessage>) -> Self {
        Self { pending }
    }

    pub fn set(&mut self, address: ControlAddress, value: u8) {
        let message = MidiMessage::new(address.status, address.data, value);
        match self
            .pending
            .iter_mut()
            .find(|slot| slot.address() == address)
        {
            Some(slot) => *slot = message,
            None => self.pending.push(message),
        }
    }
}

/// Runtime of a mapping.
///
/// Owns every component and container, the shift and layer controllers, the
/// table of which component listens on which address, and the host. Raw
/// messages enter through [`handle_message`](Self::handle_message); LED
/// updates queue up until [`take_output`](Self::take_output).
pub struct ControlSurface<H: Host> {
    host: H,
    components: Vec<Component>,
    containers: Vec<Container>,
    shifts: Vec<ShiftController>,
    layers: Vec<LayerController>,
    controllers: HashMap<ControlAddress, ControllerRef>,
    routes: HashMap<ControlAddress, ComponentId>,
    held_layers: Vec<LayerId>,
    pending: Vec<MidiMessage>,
}

impl<H: Host> ControlSurface<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            components: Vec::new(),
            containers: Vec::new(),
            shifts: Vec::new(),
            layers: Vec::new(),
            controllers: HashMap::new(),
            routes: HashMap::new(),
            held_layers: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Add a component. It starts disconnected.
    pub fn add_component(&mut self, component: Component) -> ComponentId {
        self.components.push(component);
        ComponentId(self.components.len() - 1)
    }

    pub fn add_container(&mut self, container: Container) -> ContainerId {
        self.containers.push(container);
        ContainerId(self.containers.len() - 1)
    }

    /// Add a component and append it to `container`.
    pub fn attach(&mut self, container: ContainerId, component: Component) -> ComponentId {
        let id = self.add_component(component);
        if let Err(err) = self.insert(container, id) {
            warn!("{err}");
        }
        id
    }

    /// Append a member to a container. Duplicates are ignored, cycles are
    /// refused. Components below the new member that have no group yet take
    /// the container's group.
    pub fn insert(
        &mut self,
        parent: ContainerId,
        member: impl Into<Member>,
    ) -> Result<(), MappingError> {
        let member = member.into();
        let Some(container) = self.containers.get(parent.0) else {
            warn!("unknown container {parent:?}");
            return Ok(());
        };

        if let Member::Container(child) = member {
            if child == parent || self.contains(child, Member::Container(parent)) {
                return Err(MappingError::ContainerCycle {
                    parent: container.name().to_string(),
                    child: self
                        .containers
                        .get(child.0)
                        .map(|c| c.name().to_string())
                        .unwrap_or_default(),
                });
            }
        }

        let group = container.group().map(str::to_string);
        if !self.containers[parent.0].push(member) {
            return Ok(());
        }

        if let Some(group) = group {
            for id in self.member_components(member) {
                if let Some(component) = self.components.get_mut(id.0) {
                    component.assign_default_group(&group);
                }
            }
        }
        Ok(())
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.0)
    }

    /// Whether `member` is reachable from `container`.
    pub fn contains(&self, container: ContainerId, member: Member) -> bool {
        self.containers
            .get(container.0)
            .map(|c| {
                c.members().iter().any(|m| {
                    *m == member
                        || matches!(m, Member::Container(inner) if self.contains(*inner, member))
                })
            })
            .unwrap_or(false)
    }

    /// Every component below `container`, depth first in insertion order.
    pub fn component_ids(&self, container: ContainerId) -> Vec<ComponentId> {
        self.member_components(Member::Container(container))
    }

    fn member_components(&self, member: Member) -> Vec<ComponentId> {
        let mut ids = Vec::new();
        self.collect(member, &mut ids);
        ids
    }

    fn collect(&self, member: Member, ids: &mut Vec<ComponentId>) {
        match member {
            Member::Component(id) => ids.push(id),
            Member::Container(id) => {
                if let Some(container) = self.containers.get(id.0) {
                    for inner in container.members() {
                        self.collect(*inner, ids);
                    }
                }
            }
        }
    }

    pub fn for_each_component<F>(&self, container: ContainerId, mut f: F)
    where
        F: FnMut(ComponentId, &Component),
    {
        for id in self.component_ids(container) {
            if let Some(component) = self.components.get(id.0) {
                f(id, component);
            }
        }
    }

    /// Start routing the component's addresses to it and re-drive its LED.
    /// Connecting a connected component does nothing.
    pub fn connect(&mut self, id: ComponentId) -> Result<(), MappingError> {
        let Some(component) = self.components.get(id.0) else {
            return Ok(());
        };
        if component.is_connected() {
            return Ok(());
        }

        for address in component.inputs() {
            if let Some(owner) = self.routes.get(address).filter(|owner| **owner != id) {
                return Err(MappingError::AddressInUse {
                    address: *address,
                    owner: self.components[owner.0].name().to_string(),
                });
            }
            if let Some(controller) = self.controllers.get(address) {
                return Err(MappingError::AddressInUse {
                    address: *address,
                    owner: self.controller_name(*controller).to_string(),
                });
            }
        }

        for address in component.inputs() {
            self.routes.insert(*address, id);
        }
        debug!("connect {}", component.name());

        let component = &mut self.components[id.0];
        component.set_connected(true);
        component.drive_output(&self.host, &mut LedHandle::new(&mut self.pending));
        Ok(())
    }

    /// Stop routing to the component. Safe to call when disconnected.
    pub fn disconnect(&mut self, id: ComponentId) {
        let Some(component) = self.components.get_mut(id.0) else {
            return;
        };
        if !component.is_connected() {
            return;
        }
        for address in component.inputs() {
            if self.routes.get(address) == Some(&id) {
                self.routes.remove(address);
            }
        }
        component.set_connected(false);
        debug!("disconnect {}", component.name());
    }

    pub fn shift(&mut self, id: ComponentId) {
        if let Some(component) = self.components.get_mut(id.0) {
            component.shift();
            debug!("shift {}", component.name());
        }
    }

    pub fn unshift(&mut self, id: ComponentId) {
        if let Some(component) = self.components.get_mut(id.0) {
            component.unshift();
            debug!("unshift {}", component.name());
        }
    }

    /// Connect every component below `container`. A component that cannot
    /// connect is logged and skipped. Returns how many failed.
    pub fn connect_all(&mut self, container: ContainerId) -> usize {
        let mut failed = 0;
        for id in self.component_ids(container) {
            if let Err(err) = self.connect(id) {
                warn!("{err}");
                failed += 1;
            }
        }
        failed
    }

    pub fn disconnect_all(&mut self, container: ContainerId) {
        for id in self.component_ids(container) {
            self.disconnect(id);
        }
    }

    pub fn shift_all(&mut self, container: ContainerId) {
        for id in self.component_ids(container) {
            self.shift(id);
        }
    }

    pub fn unshift_all(&mut self, container: ContainerId) {
        for id in self.component_ids(container) {
            self.unshift(id);
        }
    }

    /// Disconnect everything below `container` and turn its LEDs off.
    pub fn shutdown(&mut self, container: ContainerId) {
        for id in self.component_ids(container) {
            self.disconnect(id);
            if let Some(component) = self.components.get(id.0) {
                component.clear_output(&mut LedHandle::new(&mut self.pending));
            }
        }
    }

    /// True when every component below `container` is connected.
    pub fn is_connected(&self, container: ContainerId) -> bool {
        self.component_ids(container)
            .iter()
            .all(|id| self.components[id.0].is_connected())
    }

    /// True when no component below `container` is connected.
    pub fn is_disconnected(&self, container: ContainerId) -> bool {
        self.component_ids(container)
            .iter()
            .all(|id| !self.components[id.0].is_connected())
    }

    /// Component currently listening on `address`.
    pub fn route(&self, address: ControlAddress) -> Option<ComponentId> {
        self.routes.get(&address).copied()
    }

    /// Create a shift button listening on the given addresses. Missing
    /// addresses are skipped.
    pub fn add_shift_controller<I>(&mut self, name: &str, inputs: I) -> ShiftId
    where
        I: IntoIterator<Item = Option<ControlAddress>>,
    {
        let id = ShiftId(self.shifts.len());
        self.claim_controller_inputs(name, inputs, ControllerRef::Shift(id));
        self.shifts.push(ShiftController::new(name));
        id
    }

    pub fn shift_controller(&self, id: ShiftId) -> Option<&ShiftController> {
        self.shifts.get(id.0)
    }

    pub fn register_shift_subscriber(&mut self, id: ShiftId, member: impl Into<Member>) {
        if let Some(shift) = self.shifts.get_mut(id.0) {
            shift.register(member.into());
        }
    }

    /// Create a layer button listening on the given addresses. Missing
    /// addresses are skipped.
    pub fn add_layer_controller<I>(&mut self, name: &str, inputs: I) -> LayerId
    where
        I: IntoIterator<Item = Option<ControlAddress>>,
    {
        let id = LayerId(self.layers.len());
        self.claim_controller_inputs(name, inputs, ControllerRef::Layer(id));
        self.layers.push(LayerController::new(name));
        id
    }

    pub fn layer_controller(&self, id: LayerId) -> Option<&LayerController> {
        self.layers.get(id.0)
    }

    pub fn register_default_layer(&mut self, id: LayerId, container: ContainerId) {
        if let Some(layer) = self.layers.get_mut(id.0) {
            layer.push_default(container);
        }
    }

    /// Add a container to the alternate layer and disconnect the whole
    /// alternate layer, so it is inert until the layer button is held.
    pub fn register_alternate_layer(&mut self, id: LayerId, container: ContainerId) {
        let Some(layer) = self.layers.get_mut(id.0) else {
            return;
        };
        layer.push_alternate(container);
        for container in layer.alternate_layer().to_vec() {
            self.disconnect_all(container);
        }
    }

    fn claim_controller_inputs<I>(
        &mut self,
        name: &str,
        inputs: I,
        controller: ControllerRef,
    ) where
        I: IntoIterator<Item = Option<ControlAddress>>,
    {
        for address in inputs.into_iter().flatten() {
            match self.controllers.get(&address) {
                Some(other) if *other == controller => {}
                Some(other) => warn!(
                    "{name}: address {address} is already claimed by {}",
                    self.controller_name(*other)
                ),
                None => {
                    self.controllers.insert(address, controller);
                }
            }
        }
    }

    fn controller_name(&self, controller: ControllerRef) -> &str {
        let name = match controller {
            ControllerRef::Shift(id) => self.shifts.get(id.0).map(ShiftController::name),
            ControllerRef::Layer(id) => self.layers.get(id.0).map(LayerController::name),
        };
        name.unwrap_or("<controller>")
    }

    /// Handle one raw MIDI message. Returns whether anything consumed it.
    pub fn handle_message(&mut self, bytes: &[u8]) -> bool {
        match MidiMessage::from_bytes(bytes) {
            Some(message) => self.handle(message),
            None => false,
        }
    }

    pub fn handle(&mut self, message: MidiMessage) -> bool {
        let address = message.address();

        if let Some(controller) = self.controllers.get(&address).copied() {
            match controller {
                ControllerRef::Shift(id) => self.on_shift(id, &message),
                ControllerRef::Layer(id) => self.on_layer(id, &message),
            }
            return true;
        }

        match self.routes.get(&address).copied() {
            Some(id) => {
                let component = &mut self.components[id.0];
                component.handle_input(
                    &message,
                    &mut self.host,
                    &mut LedHandle::new(&mut self.pending),
                );
                true
            }
            None => {
                debug!("no component listening on {address}");
                false
            }
        }
    }

    fn on_shift(&mut self, id: ShiftId, message: &MidiMessage) {
        let Some(shift) = self.shifts.get_mut(id.0) else {
            return;
        };
        let Some(mode) = Sentinel::from_message(message).and_then(|s| shift.transition(s))
        else {
            return;
        };
        debug!("{} -> {mode:?}", shift.name());

        for member in shift.subscribers().to_vec() {
            for component in self.member_components(member) {
                match mode {
                    ShiftMode::Shifted => self.shift(component),
                    ShiftMode::Unshifted => self.unshift(component),
                }
            }
        }
    }

    fn on_layer(&mut self, id: LayerId, message: &MidiMessage) {
        let Some(layer) = self.layers.get_mut(id.0) else {
            return;
        };
        let Some(mode) = Sentinel::from_message(message).and_then(|s| layer.transition(s))
        else {
            return;
        };
        debug!("{} -> {mode:?}", layer.name());

        match mode {
            LayerMode::AlternateActive => self.held_layers.push(id),
            LayerMode::DefaultActive => self.held_layers.retain(|held| *held != id),
        }
        self.apply_layers(id);
    }

    /// Bring connections in line with the held layer buttons after `changed`
    /// toggled. A default container stays disconnected while any held layer
    /// lists it. Alternate layers connect newest first; an older held layer
    /// only gets the components whose addresses are still free.
    fn apply_layers(&mut self, changed: LayerId) {
        let mut alternates = self.layers[changed.0].alternate_layer().to_vec();
        for held in &self.held_layers {
            alternates.extend_from_slice(self.layers[held.0].alternate_layer());
        }
        for container in alternates {
            self.disconnect_all(container);
        }

        let held_defaults: HashSet<ContainerId> = self
            .held_layers
            .iter()
            .flat_map(|held| self.layers[held.0].default_layer().iter().copied())
            .collect();
        let (held, released): (Vec<ContainerId>, Vec<ContainerId>) = self.layers[changed.0]
            .default_layer()
            .iter()
            .copied()
            .partition(|container| held_defaults.contains(container));
        for container in held {
            self.disconnect_all(container);
        }
        for container in released {
            self.connect_all(container);
        }

        let newest_first: Vec<LayerId> = self.held_layers.iter().rev().copied().collect();
        for (depth, layer) in newest_first.into_iter().enumerate() {
            for container in self.layers[layer.0].alternate_layer().to_vec() {
                if depth == 0 {
                    self.connect_all(container);
                } else {
                    self.connect_available(container);
                }
            }
        }
    }

    /// Connect what can be connected below `container`, quietly skipping
    /// components whose addresses are taken.
    fn connect_available(&mut self, container: ContainerId) {
        for id in self.component_ids(container) {
            if let Err(err) = self.connect(id) {
                debug!("{err}");
            }
        }
    }

    pub fn shift_mode(&self, id: ShiftId) -> Option<ShiftMode> {
        self.shifts.get(id.0).map(ShiftController::mode)
    }

    pub fn layer_mode(&self, id: LayerId) -> Option<LayerMode> {
        self.layers.get(id.0).map(LayerController::mode)
    }

    /// Re-drive every connected LED from the host, e.g. after the host
    /// changed state on its own.
    pub fn refresh_outputs(&mut self) {
        let mut leds = LedHandle::new(&mut self.pending);
        for component in &self.components {
            component.drive_output(&self.host, &mut leds);
        }
    }

    /// Drain queued LED messages.
    pub fn take_output(&mut self) -> Vec<MidiMessage> {
        std::mem::take(&mut self.pending)
    }
}
