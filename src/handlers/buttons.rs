//! The two enable/disable buttons.

use log::info;

use super::Handler;
use crate::app::context::HandlerContext;
use crate::app::ports::ButtonPort;
use crate::arbiter::Owner;
use crate::drivers::button::ButtonId;
use crate::drivers::lcd::TextFrame;
use crate::error::Result;

pub struct ButtonHandler<B> {
    buttons: B,
}

impl<B: ButtonPort> ButtonHandler<B> {
    pub fn new(buttons: B) -> Self {
        Self { buttons }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "ON" } else { "OFF" }
}

impl<B: ButtonPort> Handler for ButtonHandler<B> {
    fn name(&self) -> &'static str {
        "buttons"
    }

    fn poll(&mut self, ctx: &mut HandlerContext<'_>) -> Result<()> {
        let hold = ctx.holds.button_status;

        if self.buttons.take_press(ButtonId::GasAlarm) {
            let enabled = !ctx.switches.gas_alarm_enabled;
            ctx.switches.gas_alarm_enabled = enabled;
            info!("buttons: gas alarm {}", on_off(enabled));
            ctx.outputs
                .display
                .request(Owner::Button, TextFrame::new("Gas alarm", on_off(enabled)), hold);
        }

        if self.buttons.take_press(ButtonId::Motion) {
            let enabled = !ctx.switches.motion_enabled;
            ctx.switches.motion_enabled = enabled;
            info!("buttons: motion detection {}", on_off(enabled));
            ctx.outputs.display.request(
                Owner::Button,
                TextFrame::new("Motion detect", on_off(enabled)),
                hold,
            );
        }
        Ok(())
    }
}
