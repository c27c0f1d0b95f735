use usb_device::control;

use super::Command;
use crate::error::{Error, Result};

/// A decoded vendor request.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// The request code.
    pub command: Command,
    /// `wValue` of the setup packet.
    pub value: u16,
    /// `wIndex` of the setup packet.
    pub index: u16,
    /// `wLength` of the setup packet.
    pub length: u16,
}

impl Request {
    /// Build a request without a data stage.
    pub fn new(command: Command, value: u16, index: u16) -> Self {
        Request {
            command,
            value,
            index,
            length: 0,
        }
    }

    /// Set the data stage length.
    pub fn with_length(self, length: u16) -> Self {
        Request { length, ..self }
    }
}

impl TryFrom<&control::Request> for Request {
    type Error = Error;

    fn try_from(setup: &control::Request) -> Result<Self> {
        let command = Command::try_from(setup.request)
            .map_err(|_| Error::UnknownRequest(setup.request))?;

        Ok(Request {
            command,
            value: setup.value,
            index: setup.index,
            length: setup.length,
        })
    }
}
