//! Inbound commands from the broker.
//!
//! Remote door and fan commands always win: "open" / "on" take the output
//! with [`ResourceManager::override_with`](crate::arbiter::ResourceManager::override_with)
//! and "close" / "off" drop it with `force_release`, whoever held it.  A
//! higher-priority handler that is still active simply reclaims the output
//! on its next run.  The window servo has no manager and is driven directly.

use log::info;
use serde::de::DeserializeOwned;

use crate::app::context::HandlerContext;
use crate::app::messages::{Access, Action, ControlCommand, RfidResponse};
use crate::app::router::Route;
use crate::arbiter::{OutputDevice as _, Owner};
use crate::drivers::buzzer::Tone;
use crate::drivers::fan::FanSpeed;
use crate::drivers::lcd::TextFrame;
use crate::drivers::rgb_strip::colour;
use crate::drivers::servo::ServoPosition;
use crate::error::{CommsError, Result};

#[derive(Debug, Default)]
pub struct ControlHandler;

fn parse<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    serde_json::from_slice(payload).map_err(|_| CommsError::MalformedPayload.into())
}

fn position(action: Action) -> Result<ServoPosition> {
    match action {
        Action::Open => Ok(ServoPosition::Open),
        Action::Close => Ok(ServoPosition::Closed),
        Action::On | Action::Off => Err(CommsError::MalformedPayload.into()),
    }
}

impl ControlHandler {
    /// Apply one routed message.
    pub fn dispatch(&mut self, route: Route, payload: &[u8], ctx: &mut HandlerContext<'_>) -> Result<()> {
        match route {
            Route::RfidResponse => self.access(parse(payload)?, ctx),
            Route::Door => self.door(parse::<ControlCommand>(payload)?.action, ctx)?,
            Route::Window => self.window(parse::<ControlCommand>(payload)?.action, ctx)?,
            Route::Fan => self.fan(parse::<ControlCommand>(payload)?.action, ctx)?,
        }
        Ok(())
    }

    fn access(&mut self, response: RfidResponse, ctx: &mut HandlerContext<'_>) {
        let card = response.card_id.as_deref().unwrap_or("");
        let fb = ctx.holds.rfid_feedback;
        let out = &mut *ctx.outputs;
        match response.access {
            Access::Granted => {
                info!("control: access granted {}", card);
                out.rgb.request(Owner::Rfid, colour::GREEN, fb);
                out.display
                    .request(Owner::Rfid, TextFrame::new("ACCESS GRANTED", card), fb);
                let opened = out
                    .door
                    .request(Owner::Rfid, ServoPosition::Open, ctx.holds.door_open)
                    .is_granted();
                if opened {
                    let topics = ctx.topics;
                    ctx.publish_status(&topics.status_door, ServoPosition::Open.as_state());
                }
            }
            Access::Denied => {
                info!("control: access denied {}", card);
                out.rgb.request(Owner::Rfid, colour::RED, fb);
                out.display
                    .request(Owner::Rfid, TextFrame::new("ACCESS DENIED", card), fb);
                out.buzzer
                    .request(Owner::Rfid, Tone::default(), ctx.holds.denied_buzzer);
            }
        }
    }

    fn door(&mut self, action: Action, ctx: &mut HandlerContext<'_>) -> Result<()> {
        let target = position(action)?;
        match target {
            ServoPosition::Open => {
                ctx.outputs
                    .door
                    .override_with(Owner::Remote, target, ctx.holds.remote);
            }
            ServoPosition::Closed => {
                ctx.outputs.door.force_release();
            }
        }
        info!("control: door {}", target.as_state());
        let topics = ctx.topics;
        ctx.publish_status(&topics.status_door, target.as_state());
        Ok(())
    }

    fn window(&mut self, action: Action, ctx: &mut HandlerContext<'_>) -> Result<()> {
        let target = position(action)?;
        ctx.outputs.window.apply(&target)?;
        info!("control: window {}", target.as_state());
        let topics = ctx.topics;
        ctx.publish_status(&topics.status_window, target.as_state());
        Ok(())
    }

    fn fan(&mut self, action: Action, ctx: &mut HandlerContext<'_>) -> Result<()> {
        let state = match action {
            Action::On => {
                ctx.outputs
                    .fan
                    .override_with(Owner::Remote, FanSpeed::VENT, ctx.holds.remote);
                "on"
            }
            Action::Off => {
                ctx.outputs.fan.force_release();
                "off"
            }
            Action::Open | Action::Close => return Err(CommsError::MalformedPayload.into()),
        };
        info!("control: fan {}", state);
        let topics = ctx.topics;
        ctx.publish_status(&topics.status_fan, state);
        Ok(())
    }
}
