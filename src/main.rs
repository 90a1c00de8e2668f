//! Smart home controller firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  MqttAdapter     HttpBackend     NvsConfigStore   SystemClock  │
//! │  (MessagePort)   (BackendPort)   (ConfigPort)     (ClockPort)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  Scheduler · Handlers · ResourceManagers (pure logic)  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Drivers: RGB strip · LCD · servos · buzzer · fan · lamp       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::rmt::TxRmtDriver;
use esp_idf_hal::rmt::config::TransmitConfig;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use smarthome::adapters::backend::HttpBackend;
use smarthome::adapters::mqtt::MqttAdapter;
use smarthome::adapters::nvs::NvsConfigStore;
use smarthome::adapters::time::{self, SystemClock};
use smarthome::adapters::wifi;
use smarthome::arbiter::{OutputDevice as _, Outputs};
use smarthome::clock::LocalClock;
use smarthome::diagnostics::{self, HeapProbe};
use smarthome::drivers::button::IsrButtons;
use smarthome::drivers::buzzer::Buzzer;
use smarthome::drivers::fan::Fan;
use smarthome::drivers::hw_init;
use smarthome::drivers::i2c_bus::SharedI2c;
use smarthome::drivers::lamp::Lamp;
use smarthome::drivers::lcd::{Lcd1602, TextFrame};
use smarthome::drivers::rgb_strip::RgbStrip;
use smarthome::drivers::servo::Servo;
use smarthome::drivers::watchdog::Watchdog;
use smarthome::drivers::ws2812::Ws2812Rmt;
use smarthome::error::Error;
use smarthome::handlers::{
    ButtonHandler, EnvironmentHandler, GasHandler, LightingHandler, MotionHandler, RfidHandler,
    SensorLogHandler, SteamHandler,
};
use smarthome::pins;
use smarthome::scheduler::{Pacer, Ports, Scheduler};
use smarthome::sensors::{Dht11, GasSensor, Mfrc522, PirSensor, SteamSensor};

/// A stalled tick reboots the board after this long.
const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Smart Home v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    diagnostics::install_panic_handler();

    // ── 2. Config ─────────────────────────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let config = match NvsConfigStore::new() {
        Ok(store) => store.load_or_default(),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults", e);
            smarthome::config::SystemConfig::default()
        }
    };
    info!("Device '{}', tick {} ms", config.device_id, config.tick_interval_ms);

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {}, buttons disabled", e);
    }

    let p = Peripherals::take()?;

    let i2c_cfg = I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ));
    let i2c = I2cDriver::new(p.i2c0, p.pins.gpio21, p.pins.gpio22, &i2c_cfg)?;
    let bus = SharedI2c::new(i2c);

    let lcd = Lcd1602::new(bus.clone(), Ets, pins::LCD_I2C_ADDR).map_err(Error::from)?;
    let rfid = Mfrc522::new(bus, pins::RFID_I2C_ADDR).map_err(Error::from)?;

    let rmt = TxRmtDriver::new(p.rmt.channel0, p.pins.gpio26, &TransmitConfig::new().clock_divider(1))?;
    let strip = RgbStrip::new(Ws2812Rmt::new(rmt)?, pins::RGB_PIXELS);

    let dht_pin = PinDriver::input_output_od(p.pins.gpio17)?;
    let dht = Dht11::new(dht_pin, Ets);

    let mut outputs = Outputs::new(
        Box::new(strip),
        Box::new(lcd),
        Box::new(Servo::door()),
        Box::new(Buzzer::new()),
        Box::new(Fan::new()),
        Box::new(Servo::window()),
        Box::new(Lamp::new(pins::LAMP_GPIO)),
    );

    // ── 4. Network ────────────────────────────────────────────
    let _wifi = wifi::connect(p.modem, sysloop, nvs_partition, &config.wifi).map_err(Error::from)?;
    let _sntp = time::start_sntp(&config.time.sntp_server);
    let mut mqtt = MqttAdapter::connect(&config.mqtt, &config.device_id).map_err(Error::from)?;
    let mut backend = HttpBackend::new(config.backend.clone());

    // ── 5. Scheduler ──────────────────────────────────────────
    if let Err(e) = outputs.display.device_mut().apply(&TextFrame::new("Smart Home", "Ready")) {
        warn!("Welcome text failed: {}", e);
    }

    let cadences = config.cadences;
    let night = LocalClock::from_config(&config.time).night();
    let mut scheduler = Scheduler::new(outputs, &config);
    scheduler.add_handler(cadences.buttons, Box::new(ButtonHandler::new(IsrButtons)))?;
    scheduler.add_handler(cadences.gas, Box::new(GasHandler::new(GasSensor::default())))?;
    scheduler.add_handler(cadences.steam, Box::new(SteamHandler::new(SteamSensor::default())))?;
    scheduler.add_handler(cadences.rfid, Box::new(RfidHandler::new(rfid)))?;
    scheduler.add_handler(cadences.motion, Box::new(MotionHandler::new(PirSensor::default())))?;
    scheduler.add_handler(cadences.environment, Box::new(EnvironmentHandler::new(dht)))?;
    scheduler.add_handler(cadences.lighting, Box::new(LightingHandler::new(night)))?;
    scheduler.add_handler(cadences.sensor_log, Box::new(SensorLogHandler))?;

    let subscribed = scheduler.subscribe(&mut mqtt);
    info!("Subscribed to {} control topics", subscribed);

    let watchdog = Watchdog::subscribe(WATCHDOG_TIMEOUT_MS);
    let mut heap = HeapProbe::new();
    let clock = SystemClock;
    let mut pacer = Pacer::new(config.tick_interval_ms);

    info!("System ready. Entering scheduler loop.");

    // ── 6. Loop ───────────────────────────────────────────────
    loop {
        let report = scheduler.tick(&mut Ports {
            messages: &mut mqtt,
            backend: &mut backend,
            memory: &mut heap,
            clock: &clock,
        });
        if report.errors > 0 {
            warn!("tick {}: {} error(s)", report.tick, report.errors);
        }
        watchdog.feed();
        pacer.wait();
    }
}
