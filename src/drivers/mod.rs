//! Output drivers, hardware initialisation, and peripheral helpers.
//!
//! Every output implements [`OutputDevice`](crate::arbiter::OutputDevice)
//! and is handed to the arbiter at bring-up.

pub mod button;
pub mod buzzer;
pub mod fan;
pub mod hw_init;
pub mod i2c_bus;
pub mod lamp;
pub mod lcd;
pub mod rgb_strip;
pub mod servo;
pub mod watchdog;
#[cfg(target_os = "espidf")]
pub mod ws2812;
