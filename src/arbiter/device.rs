//! The output-device seam: immediate-effect primitives, no scheduling.

use core::fmt::Debug;

use crate::error::ActuatorError;

/// A physical actuator with a payload-shaped "set" and an idle state.
///
/// Implementations write straight to hardware.  Ownership and timing live
/// in [`ResourceManager`](super::ResourceManager), never here.
pub trait OutputDevice {
    /// Device-specific state (colour, two text lines, servo position, ...).
    type Payload: Clone + Debug;

    /// Drive the device to `payload`.
    fn apply(&mut self, payload: &Self::Payload) -> Result<(), ActuatorError>;

    /// Drive the device to its idle/off state.
    fn apply_idle(&mut self) -> Result<(), ActuatorError>;
}

impl<D: OutputDevice + ?Sized> OutputDevice for Box<D> {
    type Payload = D::Payload;

    fn apply(&mut self, payload: &Self::Payload) -> Result<(), ActuatorError> {
        (**self).apply(payload)
    }

    fn apply_idle(&mut self) -> Result<(), ActuatorError> {
        (**self).apply_idle()
    }
}

/// Type-erased device, so the bundle of outputs doesn't carry one generic
/// parameter per pin.
pub type DynDevice<P> = Box<dyn OutputDevice<Payload = P>>;
