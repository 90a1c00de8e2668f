//! Loop ordering and isolation with the full handler table.

use smarthome::app::context::HandlerContext;
use smarthome::arbiter::Owner;
use smarthome::drivers::rgb_strip::colour;
use smarthome::error::{Error, Result};
use smarthome::handlers::{
    ButtonHandler, EnvironmentHandler, GasHandler, Handler, LightingHandler, MotionHandler,
    RfidHandler, SensorLogHandler, SteamHandler,
};
use smarthome::scheduler::{Cadence, MAX_HANDLERS};

use super::mock_board::{Buttons, Climate, Detector, Reader, Rig, lab_config};

/// Registers the production table with default cadences.
fn full_rig() -> (Rig, Detector) {
    let cfg = lab_config();
    let c = cfg.cadences;
    let mut rig = Rig::new(&cfg);
    let gas = Detector::default();
    gas.set(Some(false));
    let quiet = Detector::default();
    quiet.set(Some(false));
    let climate = Climate::default();
    climate.set(21.0, 40.0);

    rig.add(c.buttons, ButtonHandler::new(Buttons::default()));
    rig.add(c.gas, GasHandler::new(gas.clone()));
    rig.add(c.steam, SteamHandler::new(quiet.clone()));
    rig.add(c.rfid, RfidHandler::new(Reader::default()));
    rig.add(c.motion, MotionHandler::new(quiet));
    rig.add(c.environment, EnvironmentHandler::new(climate));
    rig.add(
        c.lighting,
        LightingHandler::new(smarthome::clock::NightHours {
            start_hour: cfg.time.night_start_hour,
            end_hour: cfg.time.night_end_hour,
        }),
    );
    rig.add(c.sensor_log, SensorLogHandler);
    (rig, gas)
}

#[test]
fn default_table_runs_in_registration_order() {
    let (mut rig, _gas) = full_rig();
    let reports = rig.run_to(60);

    let ran = |tick: u32| reports[tick as usize - 1].ran.to_vec();
    assert_eq!(ran(1), ["buttons", "rfid"]);
    assert_eq!(ran(2), ["buttons", "motion"]);
    assert_eq!(ran(5), ["buttons", "steam", "rfid"]);
    assert_eq!(ran(10), ["buttons", "gas", "motion"]);
    assert_eq!(ran(13), ["buttons", "rfid", "environment"]);
    assert_eq!(ran(17), ["buttons", "rfid", "lighting"]);
    assert!(reports.iter().all(|r| r.errors == 0));

    // Memory reclaim every 10 ticks at offset 7.
    let reclaimed: Vec<u32> = reports
        .iter()
        .filter(|r| r.free_heap.is_some())
        .map(|r| r.tick)
        .collect();
    assert_eq!(reclaimed, [7, 17, 27, 37, 47, 57]);
    assert_eq!(rig.heap.reclaims, 6);
}

#[test]
fn gas_between_cadences_is_caught_on_the_next_gas_tick() {
    let (mut rig, gas) = full_rig();
    rig.run_to(3);
    gas.set(Some(true));
    rig.run_to(9);
    assert!(rig.scheduler.outputs().fan.is_idle());

    rig.tick();
    assert_eq!(rig.scheduler.outputs().fan.owner(), Some(Owner::Gas));
    let report = rig.tick();
    assert!(report.ran.contains(&"gas"));
}

struct Faulty;

impl Handler for Faulty {
    fn name(&self) -> &'static str {
        "faulty"
    }

    fn poll(&mut self, _ctx: &mut HandlerContext<'_>) -> Result<()> {
        Err(Error::Init("broken"))
    }
}

struct Paint;

impl Handler for Paint {
    fn name(&self) -> &'static str {
        "paint"
    }

    fn poll(&mut self, ctx: &mut HandlerContext<'_>) -> Result<()> {
        ctx.outputs.rgb.request(Owner::Motion, colour::ORANGE, 1);
        Ok(())
    }
}

#[test]
fn a_failing_handler_does_not_starve_the_rest() {
    let mut rig = Rig::lab();
    rig.add(Cadence::EveryTick, Faulty);
    rig.add(Cadence::EveryTick, Paint);

    for _ in 0..3 {
        let report = rig.tick();
        assert_eq!(report.errors, 1);
        assert_eq!(report.ran.as_slice(), ["faulty", "paint"]);
        assert_eq!(rig.scheduler.outputs().rgb.owner(), Some(Owner::Motion));
    }
}

#[test]
fn device_faults_do_not_stop_the_loop() {
    let (mut rig, gas) = full_rig();
    rig.board.faulty.set(true);
    gas.set(Some(true));
    rig.run_to(12);
    assert_eq!(rig.scheduler.current_tick(), 13);
    // Ownership is still recorded even though every write failed.
    assert_eq!(rig.scheduler.outputs().rgb.owner(), Some(Owner::Gas));
}

#[test]
fn handler_table_is_bounded() {
    let mut rig = Rig::lab();
    for _ in 0..MAX_HANDLERS {
        rig.scheduler
            .add_handler(Cadence::EveryTick, Box::new(Paint))
            .unwrap();
    }
    assert!(rig
        .scheduler
        .add_handler(Cadence::EveryTick, Box::new(Paint))
        .is_err());
    assert_eq!(rig.scheduler.handler_count(), MAX_HANDLERS);
}

#[test]
fn subscribes_to_every_control_topic() {
    let mut rig = Rig::lab();
    assert_eq!(rig.scheduler.subscribe(&mut rig.bus), 4);
    assert_eq!(
        rig.bus.subscribed,
        [
            "devices/lab/rfid/response",
            "devices/lab/control/door",
            "devices/lab/control/window",
            "devices/lab/control/fan",
        ]
    );
}
