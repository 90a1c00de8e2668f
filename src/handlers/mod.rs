//! Event handlers: one per sensor or condition.
//!
//! Each handler owns its sensor port and whatever edge/latch state it needs,
//! and reaches the shared outputs only through the [`HandlerContext`] it is
//! polled with.  Edge-triggered handlers (motion, RFID, buttons) make one
//! short grant per event.  Level-latched handlers (gas, steam) re-assert
//! their claims on every tick while the condition holds; they report
//! [`Handler::is_latched`] so the scheduler polls them between cadences.
//!
//! | Handler       | Owner         | Kind          |
//! |---------------|---------------|---------------|
//! | `buttons`     | `Button`      | edge          |
//! | `motion`      | `Motion`      | edge          |
//! | `rfid`        | `Rfid`        | edge          |
//! | `gas`         | `Gas`         | level-latched |
//! | `steam`       | `Steam`       | level-latched |
//! | `environment` | `Environment` | periodic      |
//! | `lighting`    | `Lighting`    | periodic      |
//! | `sensor_log`  | -             | periodic      |
//!
//! Inbound MQTT commands do not go through a cadence: the scheduler hands
//! each routed message to [`ControlHandler::dispatch`].

mod buttons;
mod control;
mod environment;
mod gas;
mod lighting;
mod motion;
mod rfid;
mod sensor_log;
mod steam;

pub use buttons::ButtonHandler;
pub use control::ControlHandler;
pub use environment::EnvironmentHandler;
pub use gas::GasHandler;
pub use lighting::LightingHandler;
pub use motion::MotionHandler;
pub use rfid::RfidHandler;
pub use sensor_log::SensorLogHandler;
pub use steam::SteamHandler;

use crate::app::context::HandlerContext;
use crate::error::Result;

pub trait Handler {
    /// Stable name used in logs and tick reports.
    fn name(&self) -> &'static str;

    /// Run once.  Errors are contained by the scheduler.
    fn poll(&mut self, ctx: &mut HandlerContext<'_>) -> Result<()>;

    /// `true` while the handler must run every tick regardless of cadence.
    fn is_latched(&self) -> bool {
        false
    }
}
