//! Priority-arbitrated ownership of one shared output with countdown release.
//!
//! ```text
//!            request(owner, payload, d)           tick() x d
//!   ┌──────┐ ─────────────────────────▶ ┌───────┐ ───────────▶ ┌──────┐
//!   │ Idle │                            │ Held  │              │ Idle │
//!   └──────┘ ◀───────────────────────── └───────┘              └──────┘
//!            release(owner) / force_release()   ▲   │
//!                                               └───┘ request by same owner
//!                                                     or higher priority
//! ```
//!
//! `owner.is_some()` holds exactly when `countdown > 0`.  The device is
//! driven idle exactly once per hold, on the transition back to `Idle`.

use log::{debug, info, warn};

use super::device::OutputDevice;
use super::owner::{Owner, PriorityTable};
use crate::error::ActuatorError;

/// Outcome of [`ResourceManager::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// Ownership recorded and payload applied.
    Granted,
    /// Held by a different owner of equal or higher priority.  Nothing changed.
    Rejected { holder: Owner },
    /// Ownership recorded, but the device write failed.
    GrantedWithFault(ActuatorError),
}

impl Claim {
    /// Whether the requester now owns the resource.
    pub fn is_granted(self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

/// Wraps one [`OutputDevice`] and arbitrates competing owners for it.
pub struct ResourceManager<D: OutputDevice> {
    name: &'static str,
    device: D,
    priority: PriorityTable,
    owner: Option<Owner>,
    countdown: u32,
    applied: Option<D::Payload>,
}

impl<D: OutputDevice> ResourceManager<D> {
    /// Construct an idle manager.  The device is not touched.
    pub fn new(name: &'static str, device: D, priority: PriorityTable) -> Self {
        Self {
            name,
            device,
            priority,
            owner: None,
            countdown: 0,
            applied: None,
        }
    }

    /// Claim the output for `duration` ticks and apply `payload` now.
    ///
    /// Rejected when a *different* owner with priority >= the requester's
    /// holds it.  A request by the current holder always succeeds and
    /// resets the countdown.  `duration == 0` holds for a single tick.
    pub fn request(&mut self, owner: Owner, payload: D::Payload, duration: u32) -> Claim {
        if let Some(holder) = self.owner {
            if holder != owner {
                if (self.priority)(holder) >= (self.priority)(owner) {
                    debug!("{}: {} rejected, held by {}", self.name, owner, holder);
                    return Claim::Rejected { holder };
                }
                info!("{}: {} preempts {}", self.name, owner, holder);
            }
        }
        self.grant(owner, payload, duration)
    }

    /// Grant regardless of priority.  Used for remote control commands.
    pub fn override_with(&mut self, owner: Owner, payload: D::Payload, duration: u32) -> Claim {
        if let Some(holder) = self.owner.filter(|&h| h != owner) {
            info!("{}: {} overrides {}", self.name, owner, holder);
        }
        self.grant(owner, payload, duration)
    }

    /// Release early if `owner` holds the output.  Returns whether it did.
    pub fn release(&mut self, owner: Owner) -> bool {
        if self.owner != Some(owner) {
            return false;
        }
        debug!("{}: released by {}", self.name, owner);
        self.go_idle();
        true
    }

    /// Drive idle regardless of who holds the output.
    ///
    /// Returns the previous holder.  When nobody holds it the device is still
    /// driven idle, since a remote "off" must take effect either way.
    pub fn force_release(&mut self) -> Option<Owner> {
        let previous = self.owner;
        if let Some(holder) = previous {
            info!("{}: force-released from {}", self.name, holder);
        }
        self.go_idle();
        previous
    }

    /// Advance one scheduler tick.
    ///
    /// Returns the owner whose hold expired on this tick, if any.  An idle
    /// manager does nothing and never writes to the device.
    pub fn tick(&mut self) -> Option<Owner> {
        if self.countdown == 0 {
            return None;
        }
        self.countdown -= 1;
        if self.countdown > 0 {
            return None;
        }
        let expired = self.owner;
        if let Some(owner) = expired {
            debug!("{}: hold by {} expired", self.name, owner);
        }
        self.go_idle();
        expired
    }

    pub fn owner(&self) -> Option<Owner> {
        self.owner
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn is_idle(&self) -> bool {
        self.owner.is_none()
    }

    /// The payload most recently applied by the current owner.
    pub fn applied(&self) -> Option<&D::Payload> {
        self.applied.as_ref()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    // ── Internals ─────────────────────────────────────────────

    fn grant(&mut self, owner: Owner, payload: D::Payload, duration: u32) -> Claim {
        self.owner = Some(owner);
        self.countdown = duration.max(1);
        let written = self.device.apply(&payload);
        self.applied = Some(payload);
        match written {
            Ok(()) => Claim::Granted,
            Err(e) => {
                warn!("{}: write for {} failed: {}", self.name, owner, e);
                Claim::GrantedWithFault(e)
            }
        }
    }

    fn go_idle(&mut self) {
        self.owner = None;
        self.countdown = 0;
        self.applied = None;
        if let Err(e) = self.device.apply_idle() {
            warn!("{}: idle write failed: {}", self.name, e);
        }
    }
}
