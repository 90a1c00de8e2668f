//! MQ-2 gas sensor, digital comparator output.
//!
//! The module's DO pin pulls LOW while the gas concentration is above the
//! threshold set on its potentiometer.  Pull-up configured in hw_init.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the GPIO via hw_init.
//! On host/test: hw_init's simulated pin levels (idle HIGH = clear).

use crate::app::ports::DetectorPort;
use crate::drivers::hw_init;
use crate::error::SensorError;
use crate::pins;

pub struct GasSensor {
    gpio: i32,
}

impl Default for GasSensor {
    fn default() -> Self {
        Self::new(pins::GAS_GPIO)
    }
}

impl GasSensor {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl DetectorPort for GasSensor {
    fn detect(&mut self) -> Result<bool, SensorError> {
        Ok(!hw_init::gpio_read(self.gpio))
    }
}
