//! Handlers running under the scheduler against the mock board.

use serde_json::json;

use smarthome::arbiter::Owner;
use smarthome::clock::NightHours;
use smarthome::drivers::button::ButtonId;
use smarthome::drivers::fan::FanSpeed;
use smarthome::drivers::lcd::TextFrame;
use smarthome::drivers::rgb_strip::colour;
use smarthome::drivers::servo::ServoPosition;
use smarthome::handlers::{
    ButtonHandler, EnvironmentHandler, GasHandler, LightingHandler, MotionHandler, RfidHandler,
    SensorLogHandler, SteamHandler,
};
use smarthome::scheduler::Cadence;

use super::mock_board::{
    Buttons, Climate, Detector, NIGHT_UTC, NOON_UTC, Reader, Rig, Write, last,
};

// ── Gas ───────────────────────────────────────────────────────

#[test]
fn gas_alarm_latches_then_lets_the_strip_fade() {
    let mut rig = Rig::lab();
    let gas = Detector::default();
    gas.set(Some(false));
    rig.add(Cadence::every(10, 0), GasHandler::new(gas.clone()));

    rig.run_to(9);
    gas.set(Some(true));
    let report = rig.tick();
    assert_eq!(report.tick, 10);
    assert_eq!(report.ran.as_slice(), ["gas"]);

    let out = rig.scheduler.outputs();
    assert_eq!(out.rgb.owner(), Some(Owner::Gas));
    assert_eq!(out.fan.owner(), Some(Owner::Gas));
    assert_eq!(out.buzzer.owner(), Some(Owner::Gas));
    assert_eq!(last(&rig.board.fan), Some(Write::Set(FanSpeed::VENT)));
    assert!(rig.scheduler.snapshot().gas_active);

    // Latched: runs between cadences and keeps the hold fresh.
    for tick in 11..=19 {
        let report = rig.tick();
        assert_eq!(report.ran.as_slice(), ["gas"], "tick {tick}");
        assert_eq!(rig.scheduler.outputs().rgb.countdown(), 10);
    }

    gas.set(Some(false));
    rig.tick();
    let out = rig.scheduler.outputs();
    assert!(out.fan.is_idle());
    assert!(out.buzzer.is_idle());
    assert_eq!(out.rgb.owner(), Some(Owner::Gas));
    assert!(!rig.scheduler.snapshot().gas_active);

    // Last refresh was on tick 19, so the hold runs out on tick 29.
    rig.run_to(28);
    assert_eq!(rig.scheduler.outputs().rgb.owner(), Some(Owner::Gas));
    let report = rig.tick();
    assert_eq!(report.expired, 2);
    assert!(rig.scheduler.outputs().rgb.is_idle());
    assert_eq!(last(&rig.board.rgb), Some(Write::Idle));

    let fan_status = rig.bus.on(&rig.topic("status/fan"));
    assert_eq!(fan_status.len(), 2);
    assert_eq!(fan_status[0]["state"], "on");
    assert_eq!(fan_status[1]["state"], "off");
}

#[test]
fn disabling_the_gas_alarm_drops_every_gas_hold() {
    let mut rig = Rig::lab();
    let buttons = Buttons::default();
    let gas = Detector::default();
    gas.set(Some(true));
    rig.add(Cadence::EveryTick, ButtonHandler::new(buttons.clone()));
    rig.add(Cadence::EveryTick, GasHandler::new(gas.clone()));

    rig.tick();
    assert_eq!(rig.scheduler.outputs().owners(), [Some(Owner::Gas), Some(Owner::Gas), None, Some(Owner::Gas), Some(Owner::Gas)]);

    buttons.press(ButtonId::GasAlarm);
    let report = rig.tick();
    assert_eq!(report.errors, 0);
    assert!(!rig.scheduler.switches().gas_alarm_enabled);
    assert_eq!(rig.scheduler.outputs().owners(), [None; 5]);
    assert_eq!(last(&rig.board.rgb), Some(Write::Idle));
    assert_eq!(last(&rig.board.fan), Some(Write::Idle));

    // Gas still present, but the alarm stays off.
    rig.run_to(5);
    assert!(rig.scheduler.outputs().rgb.is_idle());
    assert_eq!(rig.bus.on(&rig.topic("status/fan")).last().unwrap()["state"], "off");
}

#[test]
fn unreadable_gas_sensor_keeps_the_latch() {
    let mut rig = Rig::lab();
    let gas = Detector::default();
    gas.set(Some(true));
    rig.add(Cadence::EveryTick, GasHandler::new(gas.clone()));
    rig.tick();

    gas.set(None);
    let report = rig.tick();
    assert_eq!(report.errors, 1);
    assert_eq!(rig.scheduler.outputs().fan.owner(), Some(Owner::Gas));
    assert_eq!(rig.scheduler.outputs().rgb.countdown(), 10);
}

// ── Steam ─────────────────────────────────────────────────────

#[test]
fn steam_closes_the_window_and_flashes_blue() {
    let mut rig = Rig::lab();
    let steam = Detector::default();
    steam.set(Some(true));
    rig.add(Cadence::EveryTick, SteamHandler::new(steam.clone()));

    rig.tick();
    assert_eq!(*rig.board.window.borrow(), vec![Write::Set(ServoPosition::Closed)]);
    assert_eq!(last(&rig.board.rgb), Some(Write::Set(colour::OFF)));
    rig.tick();
    assert_eq!(last(&rig.board.rgb), Some(Write::Set(colour::BLUE)));
    assert_eq!(
        last(&rig.board.display),
        Some(Write::Set(TextFrame::new("STEAM DETECTED", "Window closed")))
    );
    // Closed once, not on every tick.
    assert_eq!(rig.board.window.borrow().len(), 1);

    steam.set(Some(false));
    rig.tick();
    assert!(rig.scheduler.outputs().rgb.is_idle());
    assert!(rig.scheduler.outputs().display.is_idle());

    let window = rig.bus.on(&rig.topic("status/window"));
    assert_eq!(window.len(), 1);
    assert_eq!(window[0]["state"], "closed");
    let data = rig.bus.on(&rig.topic("data"));
    assert_eq!(data[0], json!({"sensor_type": "steam", "detected": true}));
    assert_eq!(data[1], json!({"sensor_type": "steam", "detected": false}));
}

#[test]
fn gas_outranks_steam_on_the_strip() {
    let mut rig = Rig::lab();
    let gas = Detector::default();
    let steam = Detector::default();
    gas.set(Some(true));
    steam.set(Some(true));
    rig.add(Cadence::EveryTick, GasHandler::new(gas));
    rig.add(Cadence::EveryTick, SteamHandler::new(steam));

    rig.run_to(4);
    assert_eq!(rig.scheduler.outputs().rgb.owner(), Some(Owner::Gas));
    assert_eq!(rig.scheduler.outputs().display.owner(), Some(Owner::Gas));
    assert!(rig.board.rgb.borrow().iter().all(|w| *w == Write::Set(colour::RED)));
    // The window has no manager, so steam still closes it.
    assert_eq!(last(&rig.board.window), Some(Write::Set(ServoPosition::Closed)));
}

// ── Motion ────────────────────────────────────────────────────

#[test]
fn motion_reports_rising_edges_only() {
    let mut rig = Rig::lab();
    let pir = Detector::default();
    pir.set(Some(true));
    rig.add(Cadence::EveryTick, MotionHandler::new(pir.clone()));

    rig.run_to(3);
    assert_eq!(rig.backend.motion_events, 1);
    assert_eq!(rig.scheduler.outputs().rgb.owner(), Some(Owner::Motion));

    pir.set(Some(false));
    rig.tick();
    pir.set(Some(true));
    rig.tick();
    assert_eq!(rig.backend.motion_events, 2);
    assert_eq!(rig.bus.on(&rig.topic("data")).len(), 2);
}

#[test]
fn motion_survives_a_backend_outage() {
    let mut rig = Rig::lab();
    let pir = Detector::default();
    pir.set(Some(true));
    rig.backend.down = true;
    rig.add(Cadence::EveryTick, MotionHandler::new(pir));

    let report = rig.tick();
    assert_eq!(report.errors, 0);
    assert_eq!(rig.scheduler.outputs().rgb.owner(), Some(Owner::Motion));
    assert_eq!(rig.backend.motion_events, 0);
}

#[test]
fn motion_button_mutes_the_pir() {
    let mut rig = Rig::lab();
    let buttons = Buttons::default();
    let pir = Detector::default();
    pir.set(Some(false));
    rig.add(Cadence::EveryTick, ButtonHandler::new(buttons.clone()));
    rig.add(Cadence::EveryTick, MotionHandler::new(pir.clone()));

    buttons.press(ButtonId::Motion);
    rig.tick();
    assert!(!rig.scheduler.switches().motion_enabled);
    assert_eq!(
        last(&rig.board.display),
        Some(Write::Set(TextFrame::new("Motion detect", "OFF")))
    );

    pir.set(Some(true));
    rig.run_to(4);
    assert_eq!(rig.backend.motion_events, 0);

    buttons.press(ButtonId::Motion);
    rig.tick();
    assert!(rig.scheduler.switches().motion_enabled);
    assert_eq!(rig.backend.motion_events, 1);
}

// ── RFID ──────────────────────────────────────────────────────

#[test]
fn card_is_forwarded_once_per_cooldown() {
    let mut rig = Rig::lab();
    let reader = Reader::default();
    reader.present("1362282077");
    rig.add(Cadence::EveryTick, RfidHandler::new(reader.clone()));

    // Cooldown is 5 ticks: reported on 1 and again on 6.
    rig.run_to(6);
    let checks = rig.bus.on(&rig.topic("rfid/check"));
    assert_eq!(checks.len(), 2);
    assert_eq!(checks[0], json!({"card_id": "1362282077"}));
    assert_eq!(rig.scheduler.outputs().display.owner(), Some(Owner::Rfid));

    reader.present("42");
    rig.tick();
    assert_eq!(rig.bus.on(&rig.topic("rfid/check")).len(), 3);
    assert_eq!(
        last(&rig.board.display),
        Some(Write::Set(TextFrame::new("Card scanned", "42")))
    );
}

#[test]
fn card_check_is_stamped_once_the_clock_syncs() {
    let mut rig = Rig::lab();
    rig.clock.0.set(NOON_UTC);
    let reader = Reader::default();
    reader.present("7");
    rig.add(Cadence::EveryTick, RfidHandler::new(reader));

    rig.tick();
    let checks = rig.bus.on(&rig.topic("rfid/check"));
    assert_eq!(checks[0]["timestamp"], "2024-06-01T12:00:00Z");
}

// ── Environment and logging ───────────────────────────────────

#[test]
fn climate_is_published_and_logged() {
    let mut rig = Rig::lab();
    let climate = Climate::default();
    climate.set(23.0, 45.0);
    rig.add(Cadence::EveryTick, EnvironmentHandler::new(climate.clone()));
    rig.add(Cadence::every(3, 0), SensorLogHandler);

    rig.run_to(3);
    let data = rig.bus.on(&rig.topic("data"));
    assert_eq!(data.len(), 6);
    assert_eq!(data[0], json!({"sensor_type": "temperature", "value": 23.0, "unit": "C"}));
    assert_eq!(data[1], json!({"sensor_type": "humidity", "value": 45.0, "unit": "%"}));

    // Unchanged readings do not rewrite the display.
    let display_writes = rig.board.display.borrow().len();
    assert_eq!(display_writes, 1);
    assert_eq!(
        last(&rig.board.display),
        Some(Write::Set(TextFrame::new("Temp: 23.0C", "Humidity: 45%")))
    );

    assert_eq!(
        rig.backend.sensor_logs,
        vec![
            ("temperature".to_string(), 23.0, "C".to_string()),
            ("humidity".to_string(), 45.0, "%".to_string()),
        ]
    );
}

#[test]
fn sensor_log_waits_for_a_reading() {
    let mut rig = Rig::lab();
    rig.add(Cadence::EveryTick, SensorLogHandler);
    let report = rig.tick();
    assert_eq!(report.errors, 0);
    assert!(rig.backend.sensor_logs.is_empty());
}

#[test]
fn failed_climate_read_is_contained() {
    let mut rig = Rig::lab();
    rig.add(Cadence::EveryTick, EnvironmentHandler::new(Climate::default()));
    let report = rig.tick();
    assert_eq!(report.errors, 1);
    assert!(rig.scheduler.snapshot().climate.is_none());
    assert!(rig.bus.published.is_empty());
}

// ── Lighting ──────────────────────────────────────────────────

fn evening() -> NightHours {
    NightHours {
        start_hour: 20,
        end_hour: 7,
    }
}

#[test]
fn lamp_follows_the_night_window() {
    let mut rig = Rig::lab();
    rig.clock.0.set(NIGHT_UTC);
    rig.add(Cadence::EveryTick, LightingHandler::new(evening()));

    rig.run_to(3);
    assert_eq!(*rig.board.lamp.borrow(), vec![Write::Set(true)]);
    assert_eq!(rig.scheduler.outputs().display.owner(), Some(Owner::Lighting));

    rig.clock.0.set(NOON_UTC);
    rig.tick();
    assert_eq!(last(&rig.board.lamp), Some(Write::Set(false)));
    assert_eq!(rig.board.lamp.borrow().len(), 2);
}

#[test]
fn unsynced_clock_counts_as_day() {
    let mut rig = Rig::lab();
    rig.add(Cadence::EveryTick, LightingHandler::new(evening()));
    rig.tick();
    assert_eq!(*rig.board.lamp.borrow(), vec![Write::Set(false)]);
    assert!(rig.scheduler.outputs().display.is_idle());
}

#[test]
fn lamp_write_failure_is_retried() {
    let mut rig = Rig::lab();
    rig.clock.0.set(NIGHT_UTC);
    rig.add(Cadence::EveryTick, LightingHandler::new(evening()));

    rig.board.faulty.set(true);
    assert_eq!(rig.tick().errors, 1);
    rig.board.faulty.set(false);
    assert_eq!(rig.tick().errors, 0);
    assert_eq!(*rig.board.lamp.borrow(), vec![Write::Set(true)]);
}
