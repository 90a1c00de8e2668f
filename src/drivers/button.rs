//! ISR-latched push buttons.
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups.  The GPIO fires on the
//! falling edge; the ISR debounces against the previous edge timestamp and
//! sets a per-button "pressed" flag.  The scheduler consumes the flag on its
//! next tick, so a press between ticks is never lost and each press is seen
//! exactly once.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::app::ports::ButtonPort;

const DEBOUNCE_MS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    /// Enables / disables the gas alarm.
    GasAlarm,
    /// Enables / disables motion detection.
    Motion,
}

impl ButtonId {
    const fn index(self) -> usize {
        match self {
            Self::GasAlarm => 0,
            Self::Motion => 1,
        }
    }
}

struct Latch {
    pressed: AtomicBool,
    last_edge_ms: AtomicU32,
}

impl Latch {
    const fn new() -> Self {
        Self {
            pressed: AtomicBool::new(false),
            last_edge_ms: AtomicU32::new(0),
        }
    }
}

/// Written by the ISRs, drained by the main loop.
static LATCHES: [Latch; 2] = [Latch::new(), Latch::new()];

/// ISR handler: register on the button GPIO falling edge.
/// Safe to call from interrupt context (lock-free atomics only).
pub fn button_isr_handler(button: ButtonId, now_ms: u32) {
    let latch = &LATCHES[button.index()];
    let last = latch.last_edge_ms.swap(now_ms, Ordering::AcqRel);
    // A zero timestamp means no previous edge.
    if last != 0 && now_ms.wrapping_sub(last) < DEBOUNCE_MS {
        return;
    }
    latch.pressed.store(true, Ordering::Release);
}

/// Main-loop side of the latches.
#[derive(Debug, Default)]
pub struct IsrButtons;

impl ButtonPort for IsrButtons {
    fn take_press(&mut self, button: ButtonId) -> bool {
        LATCHES[button.index()].pressed.swap(false, Ordering::AcqRel)
    }
}

/// Inject a press on host builds (simulation and tests).
#[cfg(not(target_os = "espidf"))]
pub fn sim_press(button: ButtonId) {
    LATCHES[button.index()].pressed.store(true, Ordering::Release);
}
