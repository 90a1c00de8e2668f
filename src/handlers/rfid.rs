//! Card scans.
//!
//! A new card is forwarded on `rfid/check` and acknowledged on the display;
//! the access decision arrives later on `rfid/response` and is handled by
//! the control handler.  A card left on the reader is reported once per
//! cooldown window.

use log::info;

use super::Handler;
use crate::app::context::HandlerContext;
use crate::app::messages::RfidCheck;
use crate::app::ports::{CardId, CardReaderPort};
use crate::arbiter::Owner;
use crate::drivers::lcd::TextFrame;
use crate::error::Result;

pub struct RfidHandler<R> {
    reader: R,
    last_card: Option<CardId>,
    /// First tick on which `last_card` is reported again.
    quiet_until: u32,
}

impl<R: CardReaderPort> RfidHandler<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            last_card: None,
            quiet_until: 0,
        }
    }
}

impl<R: CardReaderPort> Handler for RfidHandler<R> {
    fn name(&self) -> &'static str {
        "rfid"
    }

    fn poll(&mut self, ctx: &mut HandlerContext<'_>) -> Result<()> {
        let Some(card) = self.reader.poll_card()? else {
            return Ok(());
        };
        if self.last_card.as_ref() == Some(&card) && ctx.tick < self.quiet_until {
            return Ok(());
        }
        self.quiet_until = ctx.tick.saturating_add(ctx.holds.rfid_cooldown);

        info!("rfid: card {} at tick {}", card, ctx.tick);
        let ts = ctx.timestamp();
        let topics = ctx.topics;
        ctx.publish_json(
            &topics.rfid_check,
            &RfidCheck {
                card_id: &card,
                timestamp: ts.as_deref(),
            },
        );
        ctx.outputs.display.request(
            Owner::Rfid,
            TextFrame::new("Card scanned", &card),
            ctx.holds.rfid_feedback,
        );
        self.last_card = Some(card);
        Ok(())
    }
}
