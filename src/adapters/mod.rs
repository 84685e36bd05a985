//! Adapters, concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements      | Connects to                    |
//! |-------------|-----------------|--------------------------------|
//! | `hardware`  | IntakeIo        | beam break, roller motors      |
//! |             | TurntableIo     | limit switches, lift stepper   |
//! |             | PhotoboothIo    | lift motor, turn step, LEDs    |
//! | `log_sink`  | TelemetrySink   | Serial log output              |
//! | `outbox`    | TelemetrySink   | COBS-framed controller link    |
//! | `time`      | Clock           | ESP32 system timer / `Instant` |

pub mod hardware;
pub mod log_sink;
pub mod outbox;
pub mod time;
