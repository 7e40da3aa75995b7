//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements    | Connects to                    |
//! |---------------|---------------|--------------------------------|
//! | `display`     | DisplayPort   | ST7789 via mipidsi / any RGB565 target |
//! | `http_upload` | UploadPort    | ESP-IDF HTTP client            |
//! | `log_sink`    | EventSink     | Serial log output              |
//! | `nvs`         | ConfigPort    | NVS / in-memory store          |
//! | `system`      | SystemPort    | FreeRTOS delay, esp_restart    |
//! | `time`        |               | ESP32 system timer             |
//! | `wifi`        | WifiPort      | ESP-IDF WiFi STA + config AP   |
//! | `device_id`   |               | eFuse MAC                      |

pub mod device_id;
pub mod display;
pub mod http_upload;
pub mod log_sink;
pub mod nvs;
pub mod system;
pub mod time;
pub(crate) mod utils;
pub mod wifi;
