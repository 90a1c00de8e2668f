//! Application core: ports, per-tick context and the message schema.
//!
//! Nothing here touches hardware.  Handlers see sensors, the broker, the
//! backend and the clock only through the **port traits** in [`ports`], so
//! the whole loop is testable on the host.

pub mod context;
pub mod messages;
pub mod ports;
pub mod router;
