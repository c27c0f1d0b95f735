/// Errors reported by the JTAG engine and the request dispatcher.
///
/// At the USB boundary every variant is reported the same way, by stalling
/// the control transfer; the variants exist for logging and for tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A request that drives the scan chain arrived while JTAG is not started.
    NotStarted,
    /// More data was offered than the out buffer can hold.
    BufferOverflow {
        /// Number of bytes the host tried to store.
        requested: usize,
        /// Capacity of the buffer.
        capacity: usize,
    },
    /// A scan of zero bits.
    EmptyScan,
    /// A scan that does not fit in the scan buffers.
    ScanTooLong {
        /// Requested number of bits.
        bits: usize,
    },
    /// A state id outside of the 16 TAP states.
    InvalidState(u16),
    /// The byte-serial peripheral never became ready.
    HardwareTimeout,
    /// A vendor request code this device does not implement.
    UnknownRequest(u8),
}

/// The definition of JTAG engine results.
pub type Result<T> = core::result::Result<T, Error>;
