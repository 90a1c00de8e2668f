//! Owner tags and the static priority table of every shared output.
//!
//! Priorities are plain `match` expressions with no wildcard arm, so adding
//! an [`Owner`] variant fails to compile until every table ranks it.

use core::fmt;

/// Identity of the handler holding (or requesting) a shared output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Gas,
    Rfid,
    Steam,
    Motion,
    Environment,
    Lighting,
    Button,
    /// Commands arriving over the messaging facade.
    Remote,
}

impl Owner {
    /// Every owner tag, in declaration order.
    pub const ALL: [Owner; 8] = [
        Owner::Gas,
        Owner::Rfid,
        Owner::Steam,
        Owner::Motion,
        Owner::Environment,
        Owner::Lighting,
        Owner::Button,
        Owner::Remote,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gas => "gas",
            Self::Rfid => "rfid",
            Self::Steam => "steam",
            Self::Motion => "motion",
            Self::Environment => "environment",
            Self::Lighting => "lighting",
            Self::Button => "button",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps an owner to its rank on one output.  Higher wins.
pub type PriorityTable = fn(Owner) -> u8;

// ── Per-output tables ─────────────────────────────────────────

/// RGB strip: life-safety colours beat access feedback beat ambience.
pub fn rgb_priority(owner: Owner) -> u8 {
    match owner {
        Owner::Gas => 4,
        Owner::Rfid => 3,
        Owner::Steam => 2,
        Owner::Motion => 1,
        Owner::Environment | Owner::Lighting | Owner::Button | Owner::Remote => 0,
    }
}

/// Two-line display.
pub fn display_priority(owner: Owner) -> u8 {
    match owner {
        Owner::Gas => 7,
        Owner::Rfid => 6,
        Owner::Steam => 5,
        Owner::Button => 4,
        Owner::Remote => 3,
        Owner::Environment => 2,
        Owner::Lighting => 1,
        Owner::Motion => 0,
    }
}

/// Door servo.
pub fn door_priority(owner: Owner) -> u8 {
    match owner {
        Owner::Remote => 2,
        Owner::Rfid => 1,
        Owner::Gas
        | Owner::Steam
        | Owner::Motion
        | Owner::Environment
        | Owner::Lighting
        | Owner::Button => 0,
    }
}

pub fn buzzer_priority(owner: Owner) -> u8 {
    match owner {
        Owner::Gas => 3,
        Owner::Rfid => 2,
        Owner::Remote => 1,
        Owner::Steam
        | Owner::Motion
        | Owner::Environment
        | Owner::Lighting
        | Owner::Button => 0,
    }
}

pub fn fan_priority(owner: Owner) -> u8 {
    match owner {
        Owner::Gas => 3,
        Owner::Remote => 2,
        Owner::Environment => 1,
        Owner::Rfid
        | Owner::Steam
        | Owner::Motion
        | Owner::Lighting
        | Owner::Button => 0,
    }
}
