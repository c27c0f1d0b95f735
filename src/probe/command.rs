use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Vendor request codes understood by the probe.
///
/// Host tooling depends on these values bit-exactly.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug, TryFromPrimitive, IntoPrimitive, PartialEq, Eq)]
#[allow(non_camel_case_types)]
#[repr(u8)]
pub enum Command {
    // General Commands
    DEVICE_GetId = 0xa0,

    // Buffer Commands
    JTAG_ClearOutBuffer = 0xb0,
    JTAG_SetOutBuffer = 0xb1,
    JTAG_GetInBuffer = 0xb2,

    // TAP Commands
    JTAG_Scan = 0xb3,
    JTAG_RunClock = 0xb4,
    JTAG_GotoState = 0xb5,
    JTAG_GetState = 0xb6,
    JTAG_GetInfo = 0xb8,

    // Session Commands
    JTAG_Stop = 0xbe,
    JTAG_Start = 0xbf,
}

impl Command {
    /// If the request carries its data from device to host.
    pub fn is_in(self) -> bool {
        matches!(
            self,
            Command::DEVICE_GetId
                | Command::JTAG_GetInBuffer
                | Command::JTAG_GetState
                | Command::JTAG_GetInfo
        )
    }
}

/// Status reported to the activity indicator.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The chain is not driven.
    Idle,
    /// A host has started a JTAG session.
    JtagConnected,
}
