//! HC-SR501 passive infrared motion sensor.  HIGH while motion is seen.

use crate::app::ports::DetectorPort;
use crate::drivers::hw_init;
use crate::error::SensorError;
use crate::pins;

pub struct PirSensor {
    gpio: i32,
}

impl Default for PirSensor {
    fn default() -> Self {
        Self::new(pins::PIR_GPIO)
    }
}

impl PirSensor {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl DetectorPort for PirSensor {
    fn detect(&mut self) -> Result<bool, SensorError> {
        Ok(hw_init::gpio_read(self.gpio))
    }
}
