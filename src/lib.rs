//! JTAG probe engine for USB debug controllers.
//!
//! The crate tracks the TAP state machine of an attached scan chain, shifts
//! data through it using a hardware byte shifter where possible and bit-banged
//! GPIO otherwise, and serves the host's vendor requests through a
//! [`usb_device`] class.
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

#[macro_use]
mod fmt;

pub mod driver;
pub mod error;
pub mod jtag;
pub mod probe;
pub mod scan;
pub mod tap;
pub mod usb;

#[cfg(test)]
mod mock_device;

pub use error::{Error, Result};
pub use probe::{Config, Probe, BUFFER_SIZE};
pub use tap::TapState;
pub use usb::JtagClass;
