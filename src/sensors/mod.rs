//! Sensor drivers implementing the detector, climate and card-reader ports.
//!
//! Every driver is polled synchronously by its handler.  A failed read is
//! returned as a [`SensorError`](crate::error::SensorError) and treated as
//! "no new data this tick".

pub mod dht11;
pub mod gas;
pub mod pir;
pub mod rfid;
pub mod steam;

pub use dht11::Dht11;
pub use gas::GasSensor;
pub use pir::PirSensor;
pub use rfid::Mfrc522;
pub use steam::SteamSensor;
