//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter   | Implements    | Connects to                   |
//! |-----------|---------------|-------------------------------|
//! | `backend` | BackendPort   | REST data-logging API (HTTPS) |
//! | `mqtt`    | MessagePort   | MQTT broker                   |
//! | `nvs`     | ConfigPort    | NVS / in-memory store         |
//! | `time`    | ClockPort     | System clock, SNTP            |
//! | `wifi`    |               | ESP-IDF WiFi STA              |

pub mod backend;
pub mod mqtt;
pub mod nvs;
pub mod time;
pub mod wifi;
