//! Night light.  Acts only when day/night flips; an unsynced clock is day.

use log::info;

use super::Handler;
use crate::app::context::HandlerContext;
use crate::arbiter::{OutputDevice as _, Owner};
use crate::clock::NightHours;
use crate::drivers::lcd::TextFrame;
use crate::error::Result;

pub struct LightingHandler {
    night: NightHours,
    last: Option<bool>,
}

impl LightingHandler {
    pub fn new(night: NightHours) -> Self {
        Self { night, last: None }
    }
}

impl Handler for LightingHandler {
    fn name(&self) -> &'static str {
        "lighting"
    }

    fn poll(&mut self, ctx: &mut HandlerContext<'_>) -> Result<()> {
        let night = ctx.now.is_some_and(|t| self.night.contains(t.hour));
        if self.last == Some(night) {
            return Ok(());
        }

        // Left unrecorded on failure so the next run retries.
        ctx.outputs.lamp.apply(&night)?;
        self.last = Some(night);
        info!("lighting: lamp {}", if night { "on" } else { "off" });

        if night {
            ctx.outputs.display.request(
                Owner::Lighting,
                TextFrame::new("Good evening", "Lights on"),
                ctx.holds.lighting_greeting,
            );
        }
        Ok(())
    }
}
