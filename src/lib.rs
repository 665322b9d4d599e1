//! Drive four hobby servos from one shared PWM carrier by time-division multiplexing.
//!
//! A single carrier is steered to one servo output per carrier period, round-robin, with a
//! blank period after every round. Each servo therefore sees one pulse per frame. A serial
//! console selects a servo and nudges its pulse width.
//!
//! - [`duty_store`]: per-channel target duties, clamped into per-channel bounds.
//! - [`multiplexer`]: the tick-driven round-robin state machine.
//! - [`command`]: single-symbol commands and their feedback.
//! - [`console`]: the command loop over an async serial transport.
//! - `rp_carrier`: the RP2040/RP2350 carrier and multiplexer task (embedded builds only).
//!
//! # Glossary
//!
//! - **Carrier:** the single PWM generator shared by all channels.
//! - **Sub-period:** one carrier period, carrying one channel's pulse.
//! - **Frame:** one full round, four active sub-periods and one blank.
//! - **Duty unit:** 4 µs of pulse width.
#![cfg_attr(not(feature = "host"), no_std)]
#![cfg_attr(not(feature = "host"), no_main)]

// Compile-time checks: exactly one board must be selected (unless testing with host feature)
#[cfg(all(not(any(feature = "pico1", feature = "pico2")), not(feature = "host")))]
compile_error!("Must enable exactly one board feature: 'pico1' or 'pico2'");

#[cfg(all(feature = "pico1", feature = "pico2"))]
compile_error!("Cannot enable both 'pico1' and 'pico2' features simultaneously");

// The multiplexer task needs the Cortex-M executor and time driver.
#[cfg(all(not(feature = "arm"), not(feature = "host")))]
compile_error!("Must enable the 'arm' architecture feature (or 'host' for testing)");

pub mod command;
pub mod config;
pub mod console;
pub mod duty_store;
mod error;
pub mod multiplexer;
// Requires embassy_rp and is excluded when testing on host
#[cfg(not(feature = "host"))]
pub mod rp_carrier;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};
