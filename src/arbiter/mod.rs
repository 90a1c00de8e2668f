//! Shared-output arbitration.
//!
//! Several handlers compete for a handful of exclusive outputs (one RGB
//! strip, one display, one door servo, one buzzer, one fan).  Each output
//! sits behind a [`ResourceManager`] that grants it to one [`Owner`] at a
//! time, by static priority, for a countdown of scheduler ticks.
//!
//! ```text
//!  handlers ──request(owner, payload, ticks)──▶ ResourceManager ──▶ OutputDevice
//!                                                   ▲
//!  scheduler ────────────── tick() ─────────────────┘
//! ```
//!
//! The window servo and the night lamp each have a single writer, so they
//! sit in [`Outputs`] unmanaged.

mod device;
pub mod owner;
mod resource;

pub use device::{DynDevice, OutputDevice};
pub use owner::{Owner, PriorityTable};
pub use resource::{Claim, ResourceManager};

use smart_leds::RGB8;

use crate::drivers::buzzer::Tone;
use crate::drivers::fan::FanSpeed;
use crate::drivers::lcd::TextFrame;
use crate::drivers::servo::ServoPosition;

/// Every output in the house, built once at bring-up.
pub struct Outputs {
    pub rgb: ResourceManager<DynDevice<RGB8>>,
    pub display: ResourceManager<DynDevice<TextFrame>>,
    pub door: ResourceManager<DynDevice<ServoPosition>>,
    pub buzzer: ResourceManager<DynDevice<Tone>>,
    pub fan: ResourceManager<DynDevice<FanSpeed>>,
    /// Driven by the steam handler and remote window commands only.
    pub window: DynDevice<ServoPosition>,
    /// Driven by the lighting handler only.
    pub lamp: DynDevice<bool>,
}

impl Outputs {
    pub fn new(
        rgb: DynDevice<RGB8>,
        display: DynDevice<TextFrame>,
        door: DynDevice<ServoPosition>,
        buzzer: DynDevice<Tone>,
        fan: DynDevice<FanSpeed>,
        window: DynDevice<ServoPosition>,
        lamp: DynDevice<bool>,
    ) -> Self {
        Self {
            rgb: ResourceManager::new("rgb", rgb, owner::rgb_priority),
            display: ResourceManager::new("display", display, owner::display_priority),
            door: ResourceManager::new("door", door, owner::door_priority),
            buzzer: ResourceManager::new("buzzer", buzzer, owner::buzzer_priority),
            fan: ResourceManager::new("fan", fan, owner::fan_priority),
            window,
            lamp,
        }
    }

    /// Advance every manager one tick.  Returns how many holds expired.
    pub fn tick_all(&mut self) -> usize {
        [
            self.rgb.tick(),
            self.display.tick(),
            self.door.tick(),
            self.buzzer.tick(),
            self.fan.tick(),
        ]
        .iter()
        .flatten()
        .count()
    }

    /// Drop every hold `owner` has, leaving other owners' holds alone.
    pub fn release_all(&mut self, owner: Owner) {
        self.rgb.release(owner);
        self.display.release(owner);
        self.door.release(owner);
        self.buzzer.release(owner);
        self.fan.release(owner);
    }

    /// Owners of the five managed outputs, in field order.
    pub fn owners(&self) -> [Option<Owner>; 5] {
        [
            self.rgb.owner(),
            self.display.owner(),
            self.door.owner(),
            self.buzzer.owner(),
            self.fan.owner(),
        ]
    }
}
