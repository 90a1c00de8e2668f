//! Passive buzzer on a 1 kHz LEDC channel.
//!
//! Loudness is the PWM duty; 10 % is plenty for a piezo and keeps the
//! current draw low.

use crate::arbiter::OutputDevice;
use crate::drivers::hw_init;
use crate::error::ActuatorError;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub duty_percent: u8,
}

impl Default for Tone {
    fn default() -> Self {
        Self { duty_percent: 10 }
    }
}

impl Tone {
    fn duty(self) -> u32 {
        u32::from(self.duty_percent.min(100)) * pins::PWM_MAX_DUTY / 100
    }
}

pub struct Buzzer {
    channel: u32,
    sounding: Option<Tone>,
}

impl Default for Buzzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buzzer {
    pub fn new() -> Self {
        Self {
            channel: hw_init::LEDC_CH_BUZZER,
            sounding: None,
        }
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding.is_some()
    }

    fn write(&self, duty: u32) -> Result<(), ActuatorError> {
        if hw_init::ledc_set(self.channel, duty) {
            Ok(())
        } else {
            Err(ActuatorError::PwmWriteFailed)
        }
    }
}

impl OutputDevice for Buzzer {
    type Payload = Tone;

    fn apply(&mut self, tone: &Tone) -> Result<(), ActuatorError> {
        self.write(tone.duty())?;
        self.sounding = Some(*tone);
        Ok(())
    }

    fn apply_idle(&mut self) -> Result<(), ActuatorError> {
        self.write(0)?;
        self.sounding = None;
        Ok(())
    }
}
