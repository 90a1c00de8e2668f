//! Fixed-tick cooperative scheduler.
//!
//! One call to [`Scheduler::tick`] is one loop iteration.  The binary calls
//! it once a second and sleeps the remainder with a [`Pacer`].
//!
//! ```text
//! ┌──────────────────────── tick N ─────────────────────────┐
//! │ 1. outputs.tick_all()        expiries visible below      │
//! │ 2. drain inbound             Router ─▶ ControlHandler    │
//! │ 3. handlers                  cadence due, or latched     │
//! │ 4. memory reclaim            on its own cadence          │
//! │ 5. N += 1                                                │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Handlers run in registration order.  A handler error is logged and
//! counted; it never stops the loop or the other handlers.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::context::{HandlerContext, Snapshot, Switches};
use crate::app::messages::Topics;
use crate::app::ports::{BackendPort, ClockPort, MemoryPort, MessagePort};
use crate::app::router::Router;
use crate::arbiter::Outputs;
use crate::clock::LocalClock;
use crate::config::{HoldTimes, SystemConfig};
use crate::error::{Error, Result};
use crate::handlers::{ControlHandler, Handler};

// ═══════════════════════════════════════════════════════════════
//  Cadence
// ═══════════════════════════════════════════════════════════════

/// Which ticks a handler runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cadence {
    EveryTick,
    /// Ticks where `tick % period == offset`.
    Every { period: u32, offset: u32 },
}

impl Cadence {
    pub const fn every(period: u32, offset: u32) -> Self {
        Self::Every { period, offset }
    }

    pub fn is_due(self, tick: u32) -> bool {
        match self {
            Self::EveryTick => true,
            Self::Every { period: 0, .. } => false,
            Self::Every { period, offset } => tick % period == offset,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// Handler slots (stack-allocated).
pub const MAX_HANDLERS: usize = 12;

struct Slot {
    cadence: Cadence,
    handler: Box<dyn Handler>,
}

/// The outbound ports a tick needs, borrowed from the caller.
pub struct Ports<'a> {
    pub messages: &'a mut dyn MessagePort,
    pub backend: &'a mut dyn BackendPort,
    pub memory: &'a mut dyn MemoryPort,
    pub clock: &'a dyn ClockPort,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u32,
    /// Handlers invoked, in order.
    pub ran: heapless::Vec<&'static str, MAX_HANDLERS>,
    /// Holds that expired at the start of the tick.
    pub expired: usize,
    /// Inbound messages drained.
    pub inbound: usize,
    /// Handler and dispatch errors contained.
    pub errors: usize,
    /// Free heap reported by the reclaim step, if it ran.
    pub free_heap: Option<u32>,
}

pub struct Scheduler {
    tick: u32,
    outputs: Outputs,
    switches: Switches,
    snapshot: Snapshot,
    topics: Topics,
    holds: HoldTimes,
    clock: LocalClock,
    router: Router,
    control: ControlHandler,
    memory: Cadence,
    slots: heapless::Vec<Slot, MAX_HANDLERS>,
}

impl Scheduler {
    /// All outputs start idle; the first tick is tick 1.
    pub fn new(outputs: Outputs, config: &SystemConfig) -> Self {
        let topics = Topics::for_device(&config.device_id);
        let router = Router::new(&topics);
        Self {
            tick: 1,
            outputs,
            switches: Switches::default(),
            snapshot: Snapshot::default(),
            topics,
            holds: config.holds,
            clock: LocalClock::from_config(&config.time),
            router,
            control: ControlHandler::default(),
            memory: config.cadences.memory,
            slots: heapless::Vec::new(),
        }
    }

    /// Register a handler.  Handlers due on the same tick run in the
    /// order they were added.
    pub fn add_handler(&mut self, cadence: Cadence, handler: Box<dyn Handler>) -> Result<()> {
        let name = handler.name();
        self.slots
            .push(Slot { cadence, handler })
            .map_err(|_| Error::Init("handler table full"))?;
        info!("Scheduler: '{}' registered ({:?})", name, cadence);
        Ok(())
    }

    /// Subscribe to every routed topic.  Returns how many subscriptions
    /// the transport accepted.
    pub fn subscribe(&self, messages: &mut dyn MessagePort) -> usize {
        let mut accepted = 0;
        for topic in self.router.topics() {
            if messages.subscribe(topic) {
                accepted += 1;
            } else {
                warn!("Scheduler: subscribe to {} failed", topic);
            }
        }
        accepted
    }

    /// Run one loop iteration.
    pub fn tick(&mut self, ports: &mut Ports<'_>) -> TickReport {
        let tick = self.tick;
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        report.expired = self.outputs.tick_all();

        let mut ctx = HandlerContext {
            tick,
            now: self.clock.local(ports.clock.epoch_secs()),
            outputs: &mut self.outputs,
            switches: &mut self.switches,
            snapshot: &mut self.snapshot,
            messages: &mut *ports.messages,
            backend: &mut *ports.backend,
            topics: &self.topics,
            holds: &self.holds,
        };

        while let Some(msg) = ctx.messages.poll_inbound() {
            report.inbound += 1;
            let Some(route) = self.router.route(&msg.topic) else {
                debug!("Scheduler: no route for {}", msg.topic);
                continue;
            };
            if let Err(e) = self.control.dispatch(route, &msg.payload, &mut ctx) {
                warn!("control: tick {}: {} on {}", tick, e, msg.topic);
                report.errors += 1;
            }
        }

        for slot in self.slots.iter_mut() {
            if !slot.cadence.is_due(tick) && !slot.handler.is_latched() {
                continue;
            }
            let name = slot.handler.name();
            // Capacity matches the slot table.
            let _ = report.ran.push(name);
            if let Err(e) = slot.handler.poll(&mut ctx) {
                warn!("{}: tick {}: {}", name, tick, e);
                report.errors += 1;
            }
        }

        if self.memory.is_due(tick) {
            let free = ports.memory.reclaim("periodic");
            debug!("Scheduler: tick {} free heap {} B", tick, free);
            report.free_heap = Some(free);
        }

        self.tick = self.tick.checked_add(1).unwrap_or(1);
        report
    }

    /// The tick the next call to [`tick`](Self::tick) will run.
    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut Outputs {
        &mut self.outputs
    }

    pub fn switches(&self) -> Switches {
        self.switches
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    pub fn handler_count(&self) -> usize {
        self.slots.len()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Pacer
// ═══════════════════════════════════════════════════════════════

/// Sleeps to the next tick boundary.  An overrun tick is not made up:
/// the next boundary is measured from when the overrun was noticed.
pub struct Pacer {
    period: Duration,
    next: Instant,
}

impl Pacer {
    pub fn new(period_ms: u32) -> Self {
        let period = Duration::from_millis(u64::from(period_ms));
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    pub fn wait(&mut self) {
        let now = Instant::now();
        if now < self.next {
            std::thread::sleep(self.next - now);
            self.next += self.period;
        } else {
            warn!("Pacer: tick overran by {} ms", (now - self.next).as_millis());
            self.next = now + self.period;
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
