use super::Member;
use crate::midi::Sentinel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShiftMode {
    #[default]
    Unshifted,
    Shifted,
}

/// Momentary modifier button.
///
/// Holding it shifts every subscriber, releasing it unshifts them. The
/// subscriber list belongs to this instance; subscribers are ids into the
/// surface and are not owned here.
#[derive(Debug, Clone)]
pub struct ShiftController {
    name: String,
    subscribers: Vec<Member>,
    mode: ShiftMode,
}

impl ShiftController {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subscribers: Vec::new(),
            mode: ShiftMode::Unshifted,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> ShiftMode {
        self.mode
    }

    pub fn subscribers(&self) -> &[Member] {
        &self.subscribers
    }

    /// Additive registration. A subscriber registered twice is notified once.
    pub(crate) fn register(&mut self, member: Member) -> bool {
        if self.subscribers.contains(&member) {
            return false;
        }
        self.subscribers.push(member);
        true
    }

    /// Apply a sentinel. Returns the new mode only when it changed.
    pub(crate) fn transition(&mut self, sentinel: Sentinel) -> Option<ShiftMode> {
        let next = match sentinel {
            Sentinel::On => ShiftMode::Shifted,
            Sentinel::Off => ShiftMode::Unshifted,
        };
        if next == self.mode {
            return None;
        }
        self.mode = next;
        Some(next)
    }
}
