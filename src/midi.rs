use std::fmt;

pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const CONTROL_CHANGE: u8 = 0xB0;

/// Data byte of a pressed button, also the "on" sentinel for shift and layer buttons.
pub const VALUE_ON: u8 = 0x7F;
pub const VALUE_OFF: u8 = 0x00;
pub const ENCODER_RIGHT: u8 = 0x01;
pub const ENCODER_LEFT: u8 = 0x7F;

/// Raw endpoint of one physical control: a status byte and the first data byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlAddress {
    pub status: u8,
    pub data: u8,
}

impl ControlAddress {
    pub const fn new(status: u8, data: u8) -> Self {
        Self { status, data }
    }
}

impl fmt::Display for ControlAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04X}/{:#04X}", self.status, self.data)
    }
}

/// Status bytes for one MIDI channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Channel(u8);

impl Channel {
    pub const fn new(channel: u8) -> Self {
        Self(channel & 0x0F)
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    pub const fn note_on(self, data: u8) -> ControlAddress {
        ControlAddress::new(NOTE_ON | self.0, data)
    }

    pub const fn note_off(self, data: u8) -> ControlAddress {
        ControlAddress::new(NOTE_OFF | self.0, data)
    }

    pub const fn control_change(self, data: u8) -> ControlAddress {
        ControlAddress::new(CONTROL_CHANGE | self.0, data)
    }
}

/// A three byte channel voice message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiMessage {
    pub status: u8,
    pub data: u8,
    pub value: u8,
}

impl MidiMessage {
    pub const fn new(status: u8, data: u8, value: u8) -> Self {
        Self {
            status,
            data,
            value,
        }
    }

    /// Parse a raw message. Anything shorter than three bytes (clock, active
    /// sensing, program change) is not a control message and yields `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [status, data, value, ..] if status & 0x80 != 0 => Some(Self {
                status: *status,
                data: *data & 0x7F,
                value: *value & 0x7F,
            }),
            _ => None,
        }
    }

    pub fn address(&self) -> ControlAddress {
        ControlAddress::new(self.status, self.data)
    }

    pub fn is_note_off(&self) -> bool {
        self.status & 0xF0 == NOTE_OFF
    }

    /// A press is a non-zero value on anything other than a note-off.
    pub fn is_press(&self) -> bool {
        self.value > 0 && !self.is_note_off()
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        [self.status, self.data, self.value]
    }
}

/// Reserved meaning of a momentary control's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    On,
    Off,
}

impl Sentinel {
    pub fn from_message(message: &MidiMessage) -> Option<Self> {
        if message.is_note_off() {
            return Some(Sentinel::Off);
        }
        match message.value {
            VALUE_ON => Some(Sentinel::On),
            VALUE_OFF => Some(Sentinel::Off),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_channel_messages() {
        let msg = MidiMessage::from_bytes(&[0x91, 0x0B, 0x7F]).unwrap();
        assert_eq!(msg.address(), ControlAddress::new(0x91, 0x0B));
        assert!(msg.is_press());

        assert!(MidiMessage::from_bytes(&[0xF8]).is_none());
        assert!(MidiMessage::from_bytes(&[0x0B, 0x7F, 0x00]).is_none());
    }

    #[test]
    fn note_off_is_never_a_press() {
        let msg = MidiMessage::new(0x80, 0x08, 0x40);
        assert!(!msg.is_press());
        assert_eq!(Sentinel::from_message(&msg), Some(Sentinel::Off));
    }

    #[test]
    fn sentinels() {
        assert_eq!(
            Sentinel::from_message(&MidiMessage::new(0x90, 0, VALUE_ON)),
            Some(Sentinel::On)
        );
        assert_eq!(
            Sentinel::from_message(&MidiMessage::new(0x90, 0, VALUE_OFF)),
            Some(Sentinel::Off)
        );
        assert_eq!(Sentinel::from_message(&MidiMessage::new(0x90, 0, 0x40)), None);
    }

    #[test]
    fn channel_status_bytes() {
        let ch = Channel::new(2);
        assert_eq!(ch.note_on(5), ControlAddress::new(0x92, 5));
        assert_eq!(ch.note_off(5), ControlAddress::new(0x82, 5));
        assert_eq!(ch.control_change(5), ControlAddress::new(0xB2, 5));
        assert_eq!(Channel::new(0x13).number(), 3);
    }
}
