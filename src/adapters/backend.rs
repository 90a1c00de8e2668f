//! REST data-logging backend.
//!
//! Implements [`BackendPort`] against a PostgREST-style API: one JSON row
//! per POST to `{url}/rest/v1/sensor_logs` or `{url}/rest/v1/motion_events`,
//! authenticated with the project API key.  `201 Created` is success.
//!
//! The request blocks the loop for its duration, which is why the sensor
//! log runs on a 30-minute cadence.

use log::{debug, warn};
use serde::Serialize;

use crate::app::ports::BackendPort;
use crate::config::BackendConfig;
use crate::error::CommsError;

const SENSOR_LOGS: &str = "/rest/v1/sensor_logs";
const MOTION_EVENTS: &str = "/rest/v1/motion_events";

#[derive(Debug, Serialize)]
struct SensorLogRow<'a> {
    device_id: u32,
    sensor_type: &'a str,
    value: f32,
    unit: &'a str,
}

#[derive(Debug, Serialize)]
struct MotionEventRow {
    device_id: u32,
    detected: bool,
}

pub struct HttpBackend {
    config: BackendConfig,
    inserted: u32,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Self {
        if config.url.is_empty() {
            warn!("Backend: no URL configured, inserts will fail");
        }
        Self {
            config,
            inserted: 0,
        }
    }

    /// Rows accepted by the backend since boot.
    pub fn inserted(&self) -> u32 {
        self.inserted
    }

    fn insert<T: Serialize>(&mut self, table: &str, row: &T) -> Result<(), CommsError> {
        if self.config.url.is_empty() {
            return Err(CommsError::HttpRequestFailed);
        }
        let body = serde_json::to_vec(row).map_err(|_| CommsError::EncodeFailed)?;
        let url = format!("{}{}", self.config.url.trim_end_matches('/'), table);
        let status = self.post(&url, &body)?;
        if status != 201 {
            warn!("Backend: POST {} returned {}", table, status);
            return Err(CommsError::HttpStatus(status));
        }
        self.inserted += 1;
        debug!("Backend: row inserted into {}", table);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn post(&mut self, url: &str, body: &[u8]) -> Result<u16, CommsError> {
        use esp_idf_svc::http::Method;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let conf = Configuration {
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            timeout: Some(std::time::Duration::from_secs(5)),
            ..Default::default()
        };
        let fail = |e: esp_idf_svc::sys::EspError| {
            warn!("Backend: POST {} failed: {}", url, e);
            CommsError::HttpRequestFailed
        };

        let mut conn = EspHttpConnection::new(&conf).map_err(fail)?;
        let bearer = format!("Bearer {}", self.config.api_key);
        let length = body.len().to_string();
        let headers = [
            ("apikey", self.config.api_key.as_str()),
            ("Authorization", bearer.as_str()),
            ("Content-Type", "application/json"),
            ("Content-Length", length.as_str()),
        ];
        conn.initiate_request(Method::Post, url, &headers).map_err(fail)?;
        let mut sent = 0;
        while sent < body.len() {
            sent += conn.write(&body[sent..]).map_err(fail)?;
        }
        conn.initiate_response().map_err(fail)?;
        Ok(conn.status())
    }

    /// Host builds accept every row without touching the network.
    #[cfg(not(target_os = "espidf"))]
    fn post(&mut self, url: &str, body: &[u8]) -> Result<u16, CommsError> {
        debug!("Backend(sim): POST {} {} bytes", url, body.len());
        Ok(201)
    }
}

impl BackendPort for HttpBackend {
    fn insert_sensor_log(&mut self, kind: &str, value: f32, unit: &str) -> Result<(), CommsError> {
        let row = SensorLogRow {
            device_id: self.config.device_row,
            sensor_type: kind,
            value,
            unit,
        };
        self.insert(SENSOR_LOGS, &row)
    }

    fn insert_motion_event(&mut self) -> Result<(), CommsError> {
        let row = MotionEventRow {
            device_id: self.config.device_row,
            detected: true,
        };
        self.insert(MOTION_EVENTS, &row)
    }
}
