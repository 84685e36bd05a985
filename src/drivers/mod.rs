//! Actuator drivers over `embedded-hal` pins.

pub mod motor;
#[cfg(not(target_os = "espidf"))]
pub mod sim;
pub mod status_led;
pub mod stepper;
