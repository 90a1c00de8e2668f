//! Maps subscribed topics to the inbound routes the control handler serves.

use super::messages::Topics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    RfidResponse,
    Door,
    Window,
    Fan,
}

pub struct Router {
    table: [(String, Route); 4],
}

impl Router {
    pub fn new(topics: &Topics) -> Self {
        Self {
            table: [
                (topics.rfid_response.clone(), Route::RfidResponse),
                (topics.control_door.clone(), Route::Door),
                (topics.control_window.clone(), Route::Window),
                (topics.control_fan.clone(), Route::Fan),
            ],
        }
    }

    /// `None` for topics nobody subscribed to.
    pub fn route(&self, topic: &str) -> Option<Route> {
        self.table
            .iter()
            .find(|(t, _)| t == topic)
            .map(|&(_, route)| route)
    }

    /// Subscribed topics, in table order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.table.iter().map(|(t, _)| t.as_str())
    }
}
