//! Temperature and humidity.
//!
//! Publishes every reading and keeps the latest one in the shared snapshot
//! for the sensor log.  The display only changes when the reading does.

use core::fmt::Write as _;

use super::Handler;
use crate::app::context::HandlerContext;
use crate::app::ports::{ClimatePort, ClimateReading};
use crate::arbiter::Owner;
use crate::drivers::lcd::{Line, TextFrame};
use crate::error::Result;

pub struct EnvironmentHandler<C> {
    sensor: C,
    last: Option<ClimateReading>,
}

impl<C: ClimatePort> EnvironmentHandler<C> {
    pub fn new(sensor: C) -> Self {
        Self { sensor, last: None }
    }
}

/// `Temp: 23.0C` / `Humidity: 45%`.
fn frame(r: &ClimateReading) -> TextFrame {
    let mut top = Line::new();
    let mut bottom = Line::new();
    // Overflow only truncates the line.
    let _ = write!(top, "Temp: {:.1}C", r.temperature_c);
    let _ = write!(bottom, "Humidity: {:.0}%", r.humidity_pct);
    TextFrame { top, bottom }
}

impl<C: ClimatePort> Handler for EnvironmentHandler<C> {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn poll(&mut self, ctx: &mut HandlerContext<'_>) -> Result<()> {
        let reading = self.sensor.read_climate()?;
        ctx.snapshot.climate = Some(reading);

        ctx.publish_measurement("temperature", reading.temperature_c, "C");
        ctx.publish_measurement("humidity", reading.humidity_pct, "%");

        if self.last != Some(reading) {
            ctx.outputs.display.request(
                Owner::Environment,
                frame(&reading),
                ctx.holds.environment_display,
            );
            self.last = Some(reading);
        }
        Ok(())
    }
}
