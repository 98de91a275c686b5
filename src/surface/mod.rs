mod component;
mod container;
mod control_surface;
mod layer;
mod shift;

pub use component::{ButtonKind, Component, ComponentKind, EncoderStyle, Mode, ModeTable, Target};
pub use container::{Container, Member};
pub use control_surface::{
    ComponentId, ContainerId, ControlSurface, LayerId, LedHandle, ShiftId,
};
pub use layer::{LayerController, LayerMode};
pub use shift::{ShiftController, ShiftMode};
