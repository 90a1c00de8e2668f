//! MQTT messaging adapter.
//!
//! Implements [`MessagePort`].  The ESP-IDF client delivers events on its own
//! task; a receiver thread copies complete messages into a bounded inbox
//! channel, and the scheduler drains that inbox at the start of every tick.
//!
//! ```text
//!  esp-mqtt task ──▶ mqtt-rx thread ──try_send──▶ INBOX ──try_receive──▶ Scheduler::tick
//! ```
//!
//! A full inbox drops the newest message with a warning; the scheduler
//! never waits on the broker.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//! - **all other targets**: an in-process broker stand-in for host tests.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use crate::app::ports::{Inbound, MessagePort};
use crate::config::MqttConfig;
use crate::error::CommsError;

/// Inbound messages buffered between ticks.
pub const INBOX_DEPTH: usize = 8;

type Inbox = Channel<CriticalSectionRawMutex, Inbound, INBOX_DEPTH>;

fn enqueue(inbox: &Inbox, topic: &str, payload: &[u8]) -> bool {
    let Some(msg) = Inbound::new(topic, payload) else {
        warn!("MQTT: dropping oversized message on {} ({} bytes)", topic, payload.len());
        return false;
    };
    if inbox.try_send(msg).is_err() {
        warn!("MQTT: inbox full, dropping message on {}", topic);
        return false;
    }
    true
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static INBOX: Inbox = Channel::new();

#[cfg(target_os = "espidf")]
pub struct MqttAdapter {
    client: esp_idf_svc::mqtt::client::EspMqttClient<'static>,
}

#[cfg(target_os = "espidf")]
impl MqttAdapter {
    pub fn connect(cfg: &MqttConfig, client_id: &str) -> Result<Self, CommsError> {
        use esp_idf_svc::mqtt::client::{EspMqttClient, MqttClientConfiguration};

        let url = format!("mqtt://{}:{}", cfg.host, cfg.port);
        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            username: (!cfg.username.is_empty()).then_some(cfg.username.as_str()),
            password: (!cfg.password.is_empty()).then_some(cfg.password.as_str()),
            ..Default::default()
        };
        let (client, conn) = EspMqttClient::new(&url, &conf).map_err(|e| {
            warn!("MQTT: client init for {} failed: {}", url, e);
            CommsError::MqttConnectFailed
        })?;
        Self::spawn_receiver(conn)?;
        info!("MQTT: client started for {}", url);
        Ok(Self { client })
    }

    fn spawn_receiver(mut conn: esp_idf_svc::mqtt::client::EspMqttConnection) -> Result<(), CommsError> {
        use esp_idf_svc::mqtt::client::{Details, EventPayload};

        std::thread::Builder::new()
            .name("mqtt-rx".into())
            .stack_size(8 * 1024)
            .spawn(move || {
                while let Ok(event) = conn.next() {
                    match event.payload() {
                        EventPayload::Received {
                            topic: Some(topic),
                            data,
                            details: Details::Complete,
                            ..
                        } => {
                            enqueue(&INBOX, topic, data);
                        }
                        EventPayload::Connected(_) => info!("MQTT: connected"),
                        EventPayload::Disconnected => warn!("MQTT: disconnected"),
                        _ => {}
                    }
                }
                warn!("MQTT: connection closed, receiver exiting");
            })
            .map(|_| ())
            .map_err(|_| CommsError::MqttConnectFailed)
    }
}

#[cfg(target_os = "espidf")]
impl MessagePort for MqttAdapter {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> bool {
        use esp_idf_svc::mqtt::client::QoS;
        // enqueue() hands the message to the client task without blocking.
        self.client
            .enqueue(topic, QoS::AtMostOnce, false, payload)
            .is_ok()
    }

    fn subscribe(&mut self, topic: &str) -> bool {
        use esp_idf_svc::mqtt::client::QoS;
        self.client.subscribe(topic, QoS::AtMostOnce).is_ok()
    }

    fn poll_inbound(&mut self) -> Option<Inbound> {
        INBOX.try_receive().ok()
    }
}

// ───────────────────────────────────────────────────────────────
// Host stand-in
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct MqttAdapter {
    inbox: Inbox,
    subscriptions: Vec<String>,
    published: Vec<(String, Vec<u8>)>,
}

#[cfg(not(target_os = "espidf"))]
impl MqttAdapter {
    pub fn connect(cfg: &MqttConfig, client_id: &str) -> Result<Self, CommsError> {
        if cfg.host.is_empty() {
            return Err(CommsError::MqttConnectFailed);
        }
        info!("MQTT(sim): '{}' connected to {}:{}", client_id, cfg.host, cfg.port);
        Ok(Self {
            inbox: Channel::new(),
            subscriptions: Vec::new(),
            published: Vec::new(),
        })
    }

    /// Deliver a message as the broker would.  Dropped unless subscribed.
    pub fn sim_deliver(&self, topic: &str, payload: &[u8]) -> bool {
        if !self.subscriptions.iter().any(|t| t == topic) {
            return false;
        }
        enqueue(&self.inbox, topic, payload)
    }

    pub fn published(&self) -> &[(String, Vec<u8>)] {
        &self.published
    }

    pub fn subscriptions(&self) -> &[String] {
        &self.subscriptions
    }
}

#[cfg(not(target_os = "espidf"))]
impl MessagePort for MqttAdapter {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> bool {
        self.published.push((topic.to_string(), payload.to_vec()));
        true
    }

    fn subscribe(&mut self, topic: &str) -> bool {
        if !self.subscriptions.iter().any(|t| t == topic) {
            self.subscriptions.push(topic.to_string());
        }
        true
    }

    fn poll_inbound(&mut self) -> Option<Inbound> {
        self.inbox.try_receive().ok()
    }
}
