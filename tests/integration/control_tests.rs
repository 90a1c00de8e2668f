//! Inbound broker messages: access decisions and remote commands.

use smarthome::arbiter::Owner;
use smarthome::drivers::buzzer::Tone;
use smarthome::drivers::fan::FanSpeed;
use smarthome::drivers::lcd::TextFrame;
use smarthome::drivers::rgb_strip::colour;
use smarthome::drivers::servo::ServoPosition;
use smarthome::handlers::GasHandler;
use smarthome::scheduler::Cadence;

use super::mock_board::{Detector, Rig, Write, last};

fn send(rig: &mut Rig, suffix: &str, payload: &str) {
    let topic = rig.topic(suffix);
    rig.bus.deliver(&topic, payload);
}

fn fan_states(rig: &Rig) -> Vec<String> {
    rig.bus
        .on(&rig.topic("status/fan"))
        .into_iter()
        .map(|v| v["state"].as_str().unwrap().to_string())
        .collect()
}

// ── Access decisions ──────────────────────────────────────────

#[test]
fn granted_card_opens_the_door_for_its_hold() {
    let mut rig = Rig::lab();
    send(&mut rig, "rfid/response", r#"{"access":"granted","card_id":"1362282077"}"#);

    let report = rig.tick();
    assert_eq!(report.inbound, 1);
    assert_eq!(report.errors, 0);

    let out = rig.scheduler.outputs();
    assert_eq!(out.door.owner(), Some(Owner::Rfid));
    assert_eq!(last(&rig.board.door), Some(Write::Set(ServoPosition::Open)));
    assert_eq!(last(&rig.board.rgb), Some(Write::Set(colour::GREEN)));
    assert_eq!(
        last(&rig.board.display),
        Some(Write::Set(TextFrame::new("ACCESS GRANTED", "1362282077")))
    );
    assert_eq!(rig.bus.on(&rig.topic("status/door"))[0]["state"], "open");

    // door_open hold is 5 ticks.
    rig.run_to(5);
    assert_eq!(rig.scheduler.outputs().door.owner(), Some(Owner::Rfid));
    rig.tick();
    assert!(rig.scheduler.outputs().door.is_idle());
    assert_eq!(last(&rig.board.door), Some(Write::Idle));
}

#[test]
fn denied_card_sounds_the_buzzer() {
    let mut rig = Rig::lab();
    send(&mut rig, "rfid/response", r#"{"access":"denied"}"#);
    rig.tick();

    let out = rig.scheduler.outputs();
    assert!(out.door.is_idle());
    assert_eq!(out.buzzer.owner(), Some(Owner::Rfid));
    assert_eq!(last(&rig.board.buzzer), Some(Write::Set(Tone::default())));
    assert_eq!(last(&rig.board.rgb), Some(Write::Set(colour::RED)));
    assert!(rig.bus.on(&rig.topic("status/door")).is_empty());
}

#[test]
fn access_feedback_yields_to_an_active_gas_alarm() {
    let mut rig = Rig::lab();
    let gas = Detector::default();
    gas.set(Some(true));
    rig.add(Cadence::EveryTick, GasHandler::new(gas));
    rig.tick();

    send(&mut rig, "rfid/response", r#"{"access":"denied"}"#);
    rig.tick();
    let out = rig.scheduler.outputs();
    assert_eq!(out.rgb.owner(), Some(Owner::Gas));
    assert_eq!(out.buzzer.owner(), Some(Owner::Gas));
}

// ── Remote commands ───────────────────────────────────────────

#[test]
fn remote_close_overrides_an_rfid_hold() {
    let mut rig = Rig::lab();
    send(&mut rig, "rfid/response", r#"{"access":"granted"}"#);
    rig.run_to(2);
    assert_eq!(rig.scheduler.outputs().door.owner(), Some(Owner::Rfid));

    send(&mut rig, "control/door", r#"{"action":"close"}"#);
    let report = rig.tick();
    assert_eq!(report.errors, 0);
    assert!(rig.scheduler.outputs().door.is_idle());
    assert_eq!(last(&rig.board.door), Some(Write::Idle));

    let status = rig.bus.on(&rig.topic("status/door"));
    assert_eq!(status.last().unwrap()["state"], "closed");
}

#[test]
fn remote_open_holds_the_door_against_rfid() {
    let mut rig = Rig::lab();
    send(&mut rig, "control/door", r#"{"action":"open"}"#);
    rig.tick();
    assert_eq!(rig.scheduler.outputs().door.owner(), Some(Owner::Remote));

    send(&mut rig, "rfid/response", r#"{"access":"granted"}"#);
    rig.tick();
    assert_eq!(rig.scheduler.outputs().door.owner(), Some(Owner::Remote));
    // Only the remote command reported the door.
    assert_eq!(rig.bus.on(&rig.topic("status/door")).len(), 1);
}

#[test]
fn remote_fan_on_then_off() {
    let mut rig = Rig::lab();
    send(&mut rig, "control/fan", r#"{"action":"on"}"#);
    rig.tick();
    assert_eq!(rig.scheduler.outputs().fan.owner(), Some(Owner::Remote));
    assert_eq!(last(&rig.board.fan), Some(Write::Set(FanSpeed::VENT)));

    send(&mut rig, "control/fan", r#"{"action":"off"}"#);
    rig.tick();
    assert!(rig.scheduler.outputs().fan.is_idle());

    assert_eq!(fan_states(&rig), ["on", "off"]);
}

#[test]
fn gas_reclaims_the_fan_after_a_remote_off() {
    let mut rig = Rig::lab();
    let gas = Detector::default();
    gas.set(Some(true));
    rig.add(Cadence::EveryTick, GasHandler::new(gas));
    rig.tick();

    send(&mut rig, "control/fan", r#"{"action":"off"}"#);
    rig.tick();
    // Dispatch runs before handlers, so the latched alarm takes it back.
    assert_eq!(rig.scheduler.outputs().fan.owner(), Some(Owner::Gas));
    {
        let fan = rig.board.fan.borrow();
        assert_eq!(fan[fan.len() - 2], Write::Idle);
        assert_eq!(fan[fan.len() - 1], Write::Set(FanSpeed::VENT));
    }
    // The reported state follows the fan back on.
    assert_eq!(fan_states(&rig), ["on", "off", "on"]);
}

#[test]
fn gas_clearing_leaves_a_remote_fan_reported_on() {
    let mut rig = Rig::lab();
    let gas = Detector::default();
    gas.set(Some(true));
    rig.add(Cadence::EveryTick, GasHandler::new(gas.clone()));
    rig.tick();

    // Remote "on" is dispatched in the same tick the sensor reads clear.
    gas.set(Some(false));
    send(&mut rig, "control/fan", r#"{"action":"on"}"#);
    rig.tick();
    assert_eq!(rig.scheduler.outputs().fan.owner(), Some(Owner::Remote));
    assert_eq!(last(&rig.board.fan), Some(Write::Set(FanSpeed::VENT)));
    assert_eq!(fan_states(&rig), ["on", "on"]);
}

#[test]
fn window_commands_drive_the_servo_directly() {
    let mut rig = Rig::lab();
    send(&mut rig, "control/window", r#"{"action":"open"}"#);
    send(&mut rig, "control/window", r#"{"action":"close"}"#);
    let report = rig.tick();
    assert_eq!(report.inbound, 2);
    assert_eq!(
        *rig.board.window.borrow(),
        vec![Write::Set(ServoPosition::Open), Write::Set(ServoPosition::Closed)]
    );
    let states: Vec<_> = rig
        .bus
        .on(&rig.topic("status/window"))
        .into_iter()
        .map(|v| v["state"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(states, ["open", "closed"]);
}

// ── Bad input ─────────────────────────────────────────────────

#[test]
fn malformed_and_mismatched_commands_are_counted() {
    let mut rig = Rig::lab();
    send(&mut rig, "control/door", "not json");
    send(&mut rig, "control/fan", r#"{"action":"open"}"#);
    send(&mut rig, "control/window", r#"{"action":"on"}"#);
    send(&mut rig, "rfid/response", r#"{"access":"maybe"}"#);
    send(&mut rig, "control/fan", r#"{"action":"on"}"#);

    let report = rig.tick();
    assert_eq!(report.inbound, 5);
    assert_eq!(report.errors, 4);
    // The valid command after the bad ones still applies.
    assert_eq!(rig.scheduler.outputs().fan.owner(), Some(Owner::Remote));
}

#[test]
fn unrouted_topics_are_ignored() {
    let mut rig = Rig::lab();
    rig.bus.deliver("devices/other/control/fan", r#"{"action":"on"}"#);
    let report = rig.tick();
    assert_eq!(report.inbound, 1);
    assert_eq!(report.errors, 0);
    assert!(rig.scheduler.outputs().fan.is_idle());
}

#[test]
fn offline_broker_does_not_stop_commands() {
    let mut rig = Rig::lab();
    rig.bus.offline = true;
    send(&mut rig, "control/door", r#"{"action":"open"}"#);
    let report = rig.tick();
    assert_eq!(report.errors, 0);
    assert_eq!(rig.scheduler.outputs().door.owner(), Some(Owner::Remote));
    assert!(rig.bus.published.is_empty());
}
