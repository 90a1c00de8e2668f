//! Gas alarm.
//!
//! ```text
//!            detected                         clear / disabled
//!   Idle ─────────────────▶ Active ───────────────────────────▶ Idle
//!                             │ every tick: re-request RGB red,
//!                             │ display, fan, buzzer
//! ```
//!
//! On clear the fan and buzzer are released at once; the RGB and display
//! holds are left to run out.  When the alarm is disabled from the button
//! every gas hold is released immediately.

use log::{info, warn};

use super::Handler;
use crate::app::context::HandlerContext;
use crate::app::ports::DetectorPort;
use crate::arbiter::Owner;
use crate::drivers::buzzer::Tone;
use crate::drivers::fan::FanSpeed;
use crate::drivers::lcd::TextFrame;
use crate::drivers::rgb_strip::colour;
use crate::error::Result;

pub struct GasHandler<S> {
    sensor: S,
    active: bool,
}

impl<S: DetectorPort> GasHandler<S> {
    pub fn new(sensor: S) -> Self {
        Self {
            sensor,
            active: false,
        }
    }

    /// Re-request every gas output.  Fan status is published whenever the
    /// fan comes (back) under the alarm.
    fn assert_claims(&self, ctx: &mut HandlerContext<'_>) {
        let hold = ctx.holds.gas;
        let out = &mut *ctx.outputs;
        out.rgb.request(Owner::Gas, colour::RED, hold);
        out.display
            .request(Owner::Gas, TextFrame::new("GAS DETECTED!", "Ventilating..."), hold);
        let had_fan = out.fan.owner() == Some(Owner::Gas);
        let has_fan = out.fan.request(Owner::Gas, FanSpeed::VENT, hold).is_granted();
        out.buzzer.request(Owner::Gas, Tone::default(), hold);

        if has_fan && !had_fan {
            let topics = ctx.topics;
            ctx.publish_status(&topics.status_fan, "on");
        }
    }

    fn clear(&mut self, ctx: &mut HandlerContext<'_>) {
        self.active = false;
        ctx.snapshot.gas_active = false;
        let fan_released = ctx.outputs.fan.release(Owner::Gas);
        ctx.outputs.buzzer.release(Owner::Gas);
        ctx.publish_detection("gas", false);
        // A remote "on" may have taken the fan; leave its status alone.
        if fan_released {
            let topics = ctx.topics;
            ctx.publish_status(&topics.status_fan, "off");
        }
    }
}

impl<S: DetectorPort> Handler for GasHandler<S> {
    fn name(&self) -> &'static str {
        "gas"
    }

    fn poll(&mut self, ctx: &mut HandlerContext<'_>) -> Result<()> {
        if !ctx.switches.gas_alarm_enabled {
            if self.active {
                info!("gas: alarm disabled while active");
                self.clear(ctx);
            }
            ctx.outputs.release_all(Owner::Gas);
            return Ok(());
        }

        let reading = self.sensor.detect();
        if let Err(e) = reading {
            warn!("gas: read failed: {}", e);
        }

        match reading {
            Ok(true) if !self.active => {
                info!("gas: detected at tick {}", ctx.tick);
                self.active = true;
                ctx.snapshot.gas_active = true;
                ctx.publish_detection("gas", true);
                self.assert_claims(ctx);
            }
            Ok(false) if self.active => {
                info!("gas: cleared at tick {}", ctx.tick);
                self.clear(ctx);
            }
            // Still detected, or an unreadable sensor while latched.
            _ if self.active => self.assert_claims(ctx),
            _ => {}
        }

        reading.map(|_| ()).map_err(Into::into)
    }

    fn is_latched(&self) -> bool {
        self.active
    }
}
