//! Slow climate log to the REST backend.

use log::debug;

use super::Handler;
use crate::app::context::HandlerContext;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct SensorLogHandler;

impl Handler for SensorLogHandler {
    fn name(&self) -> &'static str {
        "sensor_log"
    }

    fn poll(&mut self, ctx: &mut HandlerContext<'_>) -> Result<()> {
        let Some(climate) = ctx.snapshot.climate else {
            debug!("sensor_log: no climate reading yet");
            return Ok(());
        };
        ctx.backend
            .insert_sensor_log("temperature", climate.temperature_c, "C")?;
        ctx.backend
            .insert_sensor_log("humidity", climate.humidity_pct, "%")?;
        Ok(())
    }
}
