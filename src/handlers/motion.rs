//! PIR motion: one orange flash and one backend row per rising edge.

use log::{info, warn};

use super::Handler;
use crate::app::context::HandlerContext;
use crate::app::ports::DetectorPort;
use crate::arbiter::Owner;
use crate::drivers::rgb_strip::colour;
use crate::error::Result;

pub struct MotionHandler<S> {
    sensor: S,
    last: bool,
}

impl<S: DetectorPort> MotionHandler<S> {
    pub fn new(sensor: S) -> Self {
        Self {
            sensor,
            last: false,
        }
    }
}

impl<S: DetectorPort> Handler for MotionHandler<S> {
    fn name(&self) -> &'static str {
        "motion"
    }

    fn poll(&mut self, ctx: &mut HandlerContext<'_>) -> Result<()> {
        if !ctx.switches.motion_enabled {
            self.last = false;
            return Ok(());
        }

        let moving = self.sensor.detect()?;
        let rising = moving && !self.last;
        self.last = moving;
        if !rising {
            return Ok(());
        }

        info!("motion: detected at tick {}", ctx.tick);
        ctx.outputs
            .rgb
            .request(Owner::Motion, colour::ORANGE, ctx.holds.motion);
        ctx.publish_detection("motion", true);
        if let Err(e) = ctx.backend.insert_motion_event() {
            warn!("motion: backend insert failed: {}", e);
        }
        Ok(())
    }
}
