//! HTTP upload adapter.
//!
//! Implements [`UploadPort`] by POSTing one JSON record per call to
//! `<server_url>/sensor/data`:
//!
//! ```json
//! {"temperature": 23.4, "humidity": 41.2, "device_id": "CT-A1B2C3"}
//! ```
//!
//! Every call opens a fresh connection and closes it before returning,
//! bounded by the configured timeout.  Any 2xx status is success.

use log::{debug, info};
use serde::Serialize;

use crate::app::ports::UploadPort;
use crate::error::UploadError;
use crate::sensors::Reading;

#[cfg(target_os = "espidf")]
use embedded_svc::{
    http::{client::Client, Method},
    io::Write,
};
#[cfg(target_os = "espidf")]
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

/// Path of the collection endpoint, appended to the server URL.
pub const SENSOR_PATH: &str = "/sensor/data";

const URL_CAP: usize = 128;

/// Wire format of one upload.
#[derive(Debug, Serialize)]
pub struct UploadRecord<'a> {
    pub temperature: f32,
    pub humidity: f32,
    pub device_id: &'a str,
}

impl<'a> UploadRecord<'a> {
    pub fn new(reading: &Reading, device_id: &'a str) -> Self {
        Self {
            temperature: reading.temperature_c,
            humidity: reading.humidity_pct,
            device_id,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, UploadError> {
        serde_json::to_vec(self).map_err(|_| UploadError::Encode)
    }
}

/// `<server_url>/sensor/data`, or `Encode` if it does not fit.
pub fn endpoint(server_url: &str) -> Result<heapless::String<URL_CAP>, UploadError> {
    let mut url = heapless::String::new();
    url.push_str(server_url).map_err(|_| UploadError::Encode)?;
    url.push_str(SENSOR_PATH).map_err(|_| UploadError::Encode)?;
    Ok(url)
}

/// Map an HTTP status to the upload result.
pub fn check_status(status: u16) -> Result<(), UploadError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(UploadError::HttpStatus(status))
    }
}

pub struct HttpUploader {
    url: heapless::String<URL_CAP>,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    timeout_ms: u32,
    #[cfg(not(target_os = "espidf"))]
    sent: Vec<Vec<u8>>,
}

impl HttpUploader {
    pub fn new(server_url: &str, timeout_ms: u32) -> Result<Self, UploadError> {
        let url = endpoint(server_url)?;
        info!("HttpUploader: posting to {}", url);
        Ok(Self {
            url,
            timeout_ms,
            #[cfg(not(target_os = "espidf"))]
            sent: Vec::new(),
        })
    }

    #[cfg(target_os = "espidf")]
    fn post(&mut self, body: &[u8]) -> Result<u16, UploadError> {
        let config = Configuration {
            timeout: Some(std::time::Duration::from_millis(u64::from(self.timeout_ms))),
            crt_bundle_attach: if self.url.starts_with("https://") {
                Some(esp_idf_svc::sys::esp_crt_bundle_attach)
            } else {
                None
            },
            ..Default::default()
        };
        let connection = EspHttpConnection::new(&config).map_err(|_| UploadError::Connect)?;
        let mut client = Client::wrap(connection);

        let mut len = heapless::String::<8>::new();
        {
            use core::fmt::Write as _;
            write!(len, "{}", body.len()).map_err(|_| UploadError::Encode)?;
        }
        let headers = [
            ("content-type", "application/json"),
            ("content-length", len.as_str()),
        ];

        let mut request = client
            .request(Method::Post, &self.url, &headers)
            .map_err(map_io)?;
        request.write_all(body).map_err(map_io)?;
        request.flush().map_err(map_io)?;
        let response = request.submit().map_err(map_io)?;
        Ok(response.status())
    }

    /// Simulation: record the body and answer 200.
    #[cfg(not(target_os = "espidf"))]
    fn post(&mut self, body: &[u8]) -> Result<u16, UploadError> {
        self.sent.push(body.to_vec());
        Ok(200)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }
}

#[cfg(target_os = "espidf")]
fn map_io(e: esp_idf_svc::io::EspIOError) -> UploadError {
    use esp_idf_svc::sys::{ESP_ERR_HTTP_EAGAIN, ESP_ERR_TIMEOUT};
    let code = e.0.code();
    if code == ESP_ERR_TIMEOUT as i32 || code == ESP_ERR_HTTP_EAGAIN as i32 {
        UploadError::Timeout
    } else {
        UploadError::Connect
    }
}

impl UploadPort for HttpUploader {
    fn send(&mut self, reading: &Reading, device_id: &str) -> Result<(), UploadError> {
        let body = UploadRecord::new(reading, device_id).to_json()?;
        let status = self.post(&body)?;
        debug!("HttpUploader: {} -> {}", self.url, status);
        check_status(status)
    }
}
