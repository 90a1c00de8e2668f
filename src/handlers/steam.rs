//! Steam / rain on the window sill.
//!
//! On detection the window is closed once.  While steam persists the RGB
//! strip flashes blue, alternating with black on every tick, and the
//! display explains why.  When it clears both holds are dropped.

use log::{info, warn};

use super::Handler;
use crate::app::context::HandlerContext;
use crate::app::ports::DetectorPort;
use crate::arbiter::{OutputDevice as _, Owner};
use crate::drivers::lcd::TextFrame;
use crate::drivers::rgb_strip::colour;
use crate::drivers::servo::ServoPosition;
use crate::error::Result;

pub struct SteamHandler<S> {
    sensor: S,
    active: bool,
}

impl<S: DetectorPort> SteamHandler<S> {
    pub fn new(sensor: S) -> Self {
        Self {
            sensor,
            active: false,
        }
    }

    fn assert_claims(ctx: &mut HandlerContext<'_>) {
        let hold = ctx.holds.steam;
        let flash = if ctx.tick % 2 == 0 {
            colour::BLUE
        } else {
            colour::OFF
        };
        ctx.outputs.rgb.request(Owner::Steam, flash, hold);
        ctx.outputs.display.request(
            Owner::Steam,
            TextFrame::new("STEAM DETECTED", "Window closed"),
            hold,
        );
    }
}

impl<S: DetectorPort> Handler for SteamHandler<S> {
    fn name(&self) -> &'static str {
        "steam"
    }

    fn poll(&mut self, ctx: &mut HandlerContext<'_>) -> Result<()> {
        let reading = self.sensor.detect();
        match reading {
            Ok(true) if !self.active => {
                info!("steam: detected at tick {}", ctx.tick);
                self.active = true;
                ctx.snapshot.steam_active = true;
                if let Err(e) = ctx.outputs.window.apply(&ServoPosition::Closed) {
                    warn!("steam: window close failed: {}", e);
                }
                ctx.publish_detection("steam", true);
                let topics = ctx.topics;
                ctx.publish_status(&topics.status_window, ServoPosition::Closed.as_state());
                Self::assert_claims(ctx);
            }
            Ok(false) if self.active => {
                info!("steam: cleared at tick {}", ctx.tick);
                self.active = false;
                ctx.snapshot.steam_active = false;
                ctx.outputs.rgb.release(Owner::Steam);
                ctx.outputs.display.release(Owner::Steam);
                ctx.publish_detection("steam", false);
            }
            _ if self.active => Self::assert_claims(ctx),
            _ => {}
        }
        reading.map(|_| ()).map_err(Into::into)
    }

    fn is_latched(&self) -> bool {
        self.active
    }
}
