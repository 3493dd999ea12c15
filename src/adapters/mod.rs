//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                 | Connects to               |
//! |-------------|----------------------------|---------------------------|
//! | `log_sink`  | EventSink                  | Serial log output         |
//! | `nvs`       | ConfigPort, StoragePort    | NVS / in-memory store     |
//! | `sim_robot` | RobotPort, KinematicsTick  | Simulated collaborator    |
//! | `time`      | ClockPort                  | ESP32 system timer        |
//! | `uart`      | Transport                  | ESP-IDF UART driver       |

pub mod log_sink;
pub mod nvs;
pub mod sim_robot;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;
