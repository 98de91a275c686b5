use log::debug;

use super::LedHandle;
use crate::host::Host;
use crate::midi::{ControlAddress, MidiMessage, ENCODER_LEFT, ENCODER_RIGHT, VALUE_OFF, VALUE_ON};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    /// Writes 1 on press and 0 on release.
    Push,
    /// Flips the value on press, ignores release.
    Toggle,
}

/// How a relative encoder turns one detent into a new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncoderStyle {
    /// Add or subtract the target's step.
    Step,
    /// Write +1 or -1, for host controls that are themselves relative.
    Move,
    /// Multiply or divide by a factor.
    Scale(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentKind {
    Button(ButtonKind),
    Pot,
    Encoder(EncoderStyle),
}

/// What a component currently drives on the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Target {
    pub key: String,
    pub group: String,
    pub step: f64,
}

impl Target {
    fn with_mode(&self, mode: &Mode) -> Self {
        Self {
            key: mode.key.clone().unwrap_or_else(|| self.key.clone()),
            group: mode.group.clone().unwrap_or_else(|| self.group.clone()),
            step: mode.step.unwrap_or(self.step),
        }
    }
}

/// Overrides applied on top of a component's base target. `None` keeps the
/// base value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mode {
    pub key: Option<String>,
    pub group: Option<String>,
    pub step: Option<f64>,
}

impl Mode {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn step(step: f64) -> Self {
        Self {
            step: Some(step),
            ..Self::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeTable {
    pub unshifted: Mode,
    pub shifted: Mode,
}

/// A single bindable control: one or more input addresses, an optional LED
/// address, and the host target it currently drives.
///
/// Components are plain data. Connection state is owned by the
/// [`ControlSurface`](super::ControlSurface) routing table; the surface keeps
/// `connected` in sync with it.
#[derive(Debug, Clone)]
pub struct Component {
    name: String,
    kind: ComponentKind,
    inputs: Vec<ControlAddress>,
    fine: Option<ControlAddress>,
    output: Option<ControlAddress>,
    out_key: Option<String>,
    base: Target,
    modes: Option<ModeTable>,
    target: Target,
    shifted: bool,
    connected: bool,
    coarse: u8,
}

impl Component {
    fn new(name: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            inputs: Vec::new(),
            fine: None,
            output: None,
            out_key: None,
            base: Target::default(),
            modes: None,
            target: Target::default(),
            shifted: false,
            connected: false,
            coarse: 0,
        }
    }

    pub fn button(name: impl Into<String>, kind: ButtonKind) -> Self {
        Self::new(name, ComponentKind::Button(kind))
    }

    pub fn pot(name: impl Into<String>) -> Self {
        Self::new(name, ComponentKind::Pot)
    }

    pub fn encoder(name: impl Into<String>, style: EncoderStyle) -> Self {
        Self::new(name, ComponentKind::Encoder(style))
    }

    /// Listen on an address. `None` comes from a missing registry entry and
    /// leaves the component without that input.
    pub fn input(mut self, address: Option<ControlAddress>) -> Self {
        if let Some(address) = address {
            if !self.inputs.contains(&address) {
                self.inputs.push(address);
            }
        }
        self
    }

    /// Second address of a 14-bit pot, carrying the low seven bits.
    ///
    /// The coarse byte is held until the fine byte arrives, and only the fine
    /// byte writes the host.
    pub fn fine(mut self, address: Option<ControlAddress>) -> Self {
        if let Some(address) = address {
            if !self.inputs.contains(&address) {
                self.fine = Some(address);
                self.inputs.push(address);
            }
        }
        self
    }

    pub fn output(mut self, address: Option<ControlAddress>) -> Self {
        self.output = address;
        self
    }

    /// Host key read for LED feedback when it differs from the input key.
    pub fn out_key(mut self, key: impl Into<String>) -> Self {
        self.out_key = Some(key.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.base.key = key.into();
        self.refresh_target();
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.base.group = group.into();
        self.refresh_target();
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.base.step = step;
        self.refresh_target();
        self
    }

    /// Install the shift table. The component starts unshifted.
    pub fn modes(mut self, unshifted: Mode, shifted: Mode) -> Self {
        self.modes = Some(ModeTable { unshifted, shifted });
        self.shifted = false;
        self.refresh_target();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[ControlAddress] {
        &self.inputs
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Use `group` unless the component was given one explicitly.
    pub(crate) fn assign_default_group(&mut self, group: &str) {
        if self.base.group.is_empty() {
            self.base.group = group.to_string();
            self.refresh_target();
        }
    }

    pub fn shift(&mut self) {
        self.shifted = true;
        self.refresh_target();
    }

    pub fn unshift(&mut self) {
        self.shifted = false;
        self.refresh_target();
    }

    fn refresh_target(&mut self) {
        self.target = match &self.modes {
            Some(table) if self.shifted => self.base.with_mode(&table.shifted),
            Some(table) => self.base.with_mode(&table.unshifted),
            None => self.base.clone(),
        };
    }

    /// Interpret one routed message and write the result to the host.
    pub(crate) fn handle_input(
        &mut self,
        message: &MidiMessage,
        host: &mut dyn Host,
        leds: &mut LedHandle,
    ) {
        if self.target.key.is_empty() {
            debug!("{} has no target key, ignoring input", self.name);
            return;
        }

        let Target { key, group, step } = &self.target;
        let value = match self.kind {
            ComponentKind::Button(ButtonKind::Push) => {
                if message.is_press() {
                    1.0
                } else {
                    0.0
                }
            }
            ComponentKind::Button(ButtonKind::Toggle) => {
                if !message.is_press() {
                    return;
                }
                if host.get_parameter(group, key) > 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
            ComponentKind::Pot => match self.fine {
                Some(fine) if fine == message.address() => {
                    let raw = (u16::from(self.coarse) << 7) | u16::from(message.value);
                    f64::from(raw) / 16383.0
                }
                Some(_) => {
                    // The host is written once the fine byte completes the pair.
                    self.coarse = message.value;
                    return;
                }
                None => f64::from(message.value) / 127.0,
            },
            ComponentKind::Encoder(style) => {
                let direction = match message.value {
                    ENCODER_RIGHT => 1.0,
                    ENCODER_LEFT => -1.0,
                    _ => return,
                };
                let current = host.get_parameter(group, key);
                match style {
                    EncoderStyle::Step => current + direction * step,
                    EncoderStyle::Move => direction,
                    EncoderStyle::Scale(factor) if direction > 0.0 => current * factor,
                    EncoderStyle::Scale(factor) => current / factor,
                }
            }
        };

        host.set_parameter(group, key, value);
        self.drive_output(host, leds);
    }

    /// Re-send the LED state from the host's current value.
    pub(crate) fn drive_output(&self, host: &dyn Host, leds: &mut LedHandle) {
        if !self.connected {
            return;
        }
        if let Some(address) = self.output {
            let key = self.out_key.as_deref().unwrap_or(&self.target.key);
            let lit = host.get_parameter(&self.target.group, key) > 0.0;
            leds.set(address, if lit { VALUE_ON } else { VALUE_OFF });
        }
    }

    /// Turn the LED off regardless of connection state.
    pub(crate) fn clear_output(&self, leds: &mut LedHandle) {
        if let Some(address) = self.output {
            leds.set(address, VALUE_OFF);
        }
    }
}
