//! Steam / water-drop sensor on an ADC channel.
//!
//! The analog output rises with surface moisture.  Readings above
//! [`MOISTURE_THRESHOLD`] (10-bit counts) count as "steam".

use crate::app::ports::DetectorPort;
use crate::drivers::hw_init;
use crate::error::SensorError;

pub const MOISTURE_THRESHOLD: u16 = 746;

pub struct SteamSensor {
    channel: u32,
    threshold: u16,
    last_raw: Option<u16>,
}

impl Default for SteamSensor {
    fn default() -> Self {
        Self::new(hw_init::ADC1_CH_STEAM, MOISTURE_THRESHOLD)
    }
}

impl SteamSensor {
    pub fn new(channel: u32, threshold: u16) -> Self {
        Self {
            channel,
            threshold,
            last_raw: None,
        }
    }

    /// Most recent raw sample, for diagnostics.
    pub fn last_raw(&self) -> Option<u16> {
        self.last_raw
    }
}

impl DetectorPort for SteamSensor {
    fn detect(&mut self) -> Result<bool, SensorError> {
        let raw = hw_init::adc1_read(self.channel).ok_or(SensorError::AdcReadFailed)?;
        self.last_raw = Some(raw);
        Ok(raw > self.threshold)
    }
}
