//! Mock board for integration tests.
//!
//! Every output records its writes into a shared log, every sensor reads a
//! shared cell the test controls, and the broker, backend and clock are
//! in-memory stand-ins.  Nothing here touches the `hw_init` simulation
//! statics, so tests can run in parallel.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt::Debug;
use std::rc::Rc;

use smart_leds::RGB8;

use smarthome::app::ports::{
    BackendPort, ButtonPort, CardId, CardReaderPort, ClimatePort, ClimateReading, ClockPort,
    DetectorPort, Inbound, MemoryPort, MessagePort,
};
use smarthome::arbiter::{OutputDevice, Outputs};
use smarthome::config::SystemConfig;
use smarthome::drivers::button::ButtonId;
use smarthome::drivers::buzzer::Tone;
use smarthome::drivers::fan::FanSpeed;
use smarthome::drivers::lcd::TextFrame;
use smarthome::drivers::servo::ServoPosition;
use smarthome::error::{ActuatorError, CommsError, SensorError};
use smarthome::handlers::Handler;
use smarthome::scheduler::{Cadence, Ports, Scheduler, TickReport};

// ── Outputs ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Write<P> {
    Set(P),
    Idle,
}

pub type WriteLog<P> = Rc<RefCell<Vec<Write<P>>>>;

pub struct Recording<P> {
    log: WriteLog<P>,
    fail: Rc<Cell<bool>>,
}

impl<P: Clone + Debug> OutputDevice for Recording<P> {
    type Payload = P;

    fn apply(&mut self, payload: &P) -> Result<(), ActuatorError> {
        if self.fail.get() {
            return Err(ActuatorError::BusWriteFailed);
        }
        self.log.borrow_mut().push(Write::Set(payload.clone()));
        Ok(())
    }

    fn apply_idle(&mut self) -> Result<(), ActuatorError> {
        if self.fail.get() {
            return Err(ActuatorError::BusWriteFailed);
        }
        self.log.borrow_mut().push(Write::Idle);
        Ok(())
    }
}

fn recording<P: Clone + Debug + 'static>(
    fail: &Rc<Cell<bool>>,
) -> (WriteLog<P>, Box<dyn OutputDevice<Payload = P>>) {
    let log = WriteLog::default();
    let dev = Recording {
        log: Rc::clone(&log),
        fail: Rc::clone(fail),
    };
    (log, Box::new(dev))
}

/// Write logs of every output, in [`Outputs`] field order.
pub struct Board {
    pub rgb: WriteLog<RGB8>,
    pub display: WriteLog<TextFrame>,
    pub door: WriteLog<ServoPosition>,
    pub buzzer: WriteLog<Tone>,
    pub fan: WriteLog<FanSpeed>,
    pub window: WriteLog<ServoPosition>,
    pub lamp: WriteLog<bool>,
    /// Makes every device write fail while set.
    pub faulty: Rc<Cell<bool>>,
}

impl Board {
    pub fn new() -> (Self, Outputs) {
        let faulty = Rc::new(Cell::new(false));
        let (rgb, rgb_dev) = recording(&faulty);
        let (display, display_dev) = recording(&faulty);
        let (door, door_dev) = recording(&faulty);
        let (buzzer, buzzer_dev) = recording(&faulty);
        let (fan, fan_dev) = recording(&faulty);
        let (window, window_dev) = recording(&faulty);
        let (lamp, lamp_dev) = recording(&faulty);
        let outputs = Outputs::new(
            rgb_dev, display_dev, door_dev, buzzer_dev, fan_dev, window_dev, lamp_dev,
        );
        let board = Self {
            rgb,
            display,
            door,
            buzzer,
            fan,
            window,
            lamp,
            faulty,
        };
        (board, outputs)
    }
}

pub fn last<P: Clone>(log: &WriteLog<P>) -> Option<Write<P>> {
    log.borrow().last().cloned()
}

pub fn idle_writes<P>(log: &WriteLog<P>) -> usize {
    log.borrow().iter().filter(|w| matches!(w, Write::Idle)).count()
}

// ── Sensors ───────────────────────────────────────────────────

/// Binary detector.  `None` makes the next reads fail.
#[derive(Clone, Default)]
pub struct Detector(pub Rc<Cell<Option<bool>>>);

impl Detector {
    pub fn set(&self, level: Option<bool>) {
        self.0.set(level);
    }
}

impl DetectorPort for Detector {
    fn detect(&mut self) -> Result<bool, SensorError> {
        self.0.get().ok_or(SensorError::GpioReadFailed)
    }
}

#[derive(Clone, Default)]
pub struct Climate(pub Rc<Cell<Option<ClimateReading>>>);

impl Climate {
    pub fn set(&self, temperature_c: f32, humidity_pct: f32) {
        self.0.set(Some(ClimateReading {
            temperature_c,
            humidity_pct,
        }));
    }
}

impl ClimatePort for Climate {
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.0.get().ok_or(SensorError::ChecksumMismatch)
    }
}

/// Card held over the reader, if any.
#[derive(Clone, Default)]
pub struct Reader(pub Rc<RefCell<Option<CardId>>>);

impl Reader {
    pub fn present(&self, card: &str) {
        let mut id = CardId::new();
        id.push_str(card).unwrap();
        *self.0.borrow_mut() = Some(id);
    }

    pub fn remove(&self) {
        *self.0.borrow_mut() = None;
    }
}

impl CardReaderPort for Reader {
    fn poll_card(&mut self) -> Result<Option<CardId>, SensorError> {
        Ok(self.0.borrow().clone())
    }
}

/// Presses waiting to be consumed.
#[derive(Clone, Default)]
pub struct Buttons(pub Rc<RefCell<Vec<ButtonId>>>);

impl Buttons {
    pub fn press(&self, button: ButtonId) {
        self.0.borrow_mut().push(button);
    }
}

impl ButtonPort for Buttons {
    fn take_press(&mut self, button: ButtonId) -> bool {
        let mut pending = self.0.borrow_mut();
        match pending.iter().position(|&b| b == button) {
            Some(i) => {
                pending.remove(i);
                true
            }
            None => false,
        }
    }
}

// ── Ports ─────────────────────────────────────────────────────

/// In-memory broker: publishes are recorded, deliveries are queued.
#[derive(Default)]
pub struct Loopback {
    pub inbox: VecDeque<Inbound>,
    pub published: Vec<(String, String)>,
    pub subscribed: Vec<String>,
    pub offline: bool,
}

impl Loopback {
    pub fn deliver(&mut self, topic: &str, payload: &str) {
        self.inbox
            .push_back(Inbound::new(topic, payload.as_bytes()).unwrap());
    }

    /// Payloads published on `topic`, oldest first.
    pub fn on(&self, topic: &str) -> Vec<serde_json::Value> {
        self.published
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| serde_json::from_str(p).unwrap())
            .collect()
    }
}

impl MessagePort for Loopback {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> bool {
        if self.offline {
            return false;
        }
        let body = String::from_utf8(payload.to_vec()).unwrap();
        self.published.push((topic.to_string(), body));
        true
    }

    fn subscribe(&mut self, topic: &str) -> bool {
        self.subscribed.push(topic.to_string());
        !self.offline
    }

    fn poll_inbound(&mut self) -> Option<Inbound> {
        self.inbox.pop_front()
    }
}

#[derive(Default)]
pub struct RecordingBackend {
    pub sensor_logs: Vec<(String, f32, String)>,
    pub motion_events: u32,
    pub down: bool,
}

impl BackendPort for RecordingBackend {
    fn insert_sensor_log(&mut self, kind: &str, value: f32, unit: &str) -> Result<(), CommsError> {
        if self.down {
            return Err(CommsError::HttpStatus(503));
        }
        self.sensor_logs.push((kind.to_string(), value, unit.to_string()));
        Ok(())
    }

    fn insert_motion_event(&mut self) -> Result<(), CommsError> {
        if self.down {
            return Err(CommsError::HttpStatus(503));
        }
        self.motion_events += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct Heap {
    pub reclaims: u32,
}

impl MemoryPort for Heap {
    fn reclaim(&mut self, _reason: &str) -> u32 {
        self.reclaims += 1;
        200_000
    }
}

/// UTC epoch seconds; 0 means never synced.
#[derive(Default)]
pub struct FixedClock(pub Cell<u64>);

impl ClockPort for FixedClock {
    fn epoch_secs(&self) -> u64 {
        self.0.get()
    }
}

/// 2024-06-01T12:00:00Z.
pub const NOON_UTC: u64 = 1_717_243_200;
/// 2024-06-01T22:00:00Z.
pub const NIGHT_UTC: u64 = 1_717_279_200;

// ── Rig ───────────────────────────────────────────────────────

/// Config with device id `lab`, UTC local time and the default cadences.
pub fn lab_config() -> SystemConfig {
    let mut cfg = SystemConfig::default();
    cfg.device_id = "lab".into();
    cfg.time.utc_offset_hours = 0;
    cfg
}

/// A scheduler wired to the mock board and ports.
pub struct Rig {
    pub scheduler: Scheduler,
    pub board: Board,
    pub bus: Loopback,
    pub backend: RecordingBackend,
    pub heap: Heap,
    pub clock: FixedClock,
}

impl Rig {
    pub fn new(config: &SystemConfig) -> Self {
        let (board, outputs) = Board::new();
        Self {
            scheduler: Scheduler::new(outputs, config),
            board,
            bus: Loopback::default(),
            backend: RecordingBackend::default(),
            heap: Heap::default(),
            clock: FixedClock::default(),
        }
    }

    pub fn lab() -> Self {
        Self::new(&lab_config())
    }

    pub fn add(&mut self, cadence: Cadence, handler: impl Handler + 'static) {
        self.scheduler.add_handler(cadence, Box::new(handler)).unwrap();
    }

    pub fn tick(&mut self) -> TickReport {
        self.scheduler.tick(&mut Ports {
            messages: &mut self.bus,
            backend: &mut self.backend,
            memory: &mut self.heap,
            clock: &self.clock,
        })
    }

    /// Run ticks until (and including) tick `n`.
    pub fn run_to(&mut self, n: u32) -> Vec<TickReport> {
        let mut reports = Vec::new();
        while self.scheduler.current_tick() <= n {
            reports.push(self.tick());
        }
        reports
    }

    pub fn topic(&self, suffix: &str) -> String {
        format!("devices/lab/{suffix}")
    }
}
