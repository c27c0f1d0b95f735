//! Transport seam between the JTAG engine and the board.
//!
//! A board provides two things: a [`Transport`] that toggles the four JTAG
//! lines one bit at a time, and optionally a [`ByteShifter`], a byte-serial
//! peripheral (SPI/SSP) that can clock whole bytes out of TDI and into TDO
//! while TMS stays low.

use bitflags::bitflags;

pub mod bitbang;

bitflags! {
    /// Implementation quirks of a board's byte-serial peripheral.
    pub struct Quirks: u32 {
        /// The peripheral shifts bytes MSB first while JTAG needs LSB first,
        /// so every whole byte sent through it has to be bit-reversed.
        /// Bits sent through the bit-banged path are unaffected.
        const FLIP_BITS_IN_WHOLE_BYTES = 1 << 0;
    }
}

/// Single-bit access to the JTAG lines.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Drive TMS, TDI and TCK, float TDO as an input, and hold TCK low.
    fn connect(&mut self);

    /// Release all four lines to high impedance, without pulls.
    fn disconnect(&mut self);

    /// Set the TMS level used on the next TCK pulse.
    fn set_tms(&mut self, high: bool);

    /// Set the TDI level used on the next TCK pulse.
    fn set_tdi(&mut self, high: bool);

    /// Pulse TCK low then high, returning TDO as sampled while TCK was low.
    fn clock(&mut self) -> bool;
}

/// A byte-serial shift peripheral that shares the TDI/TCK/TDO pins.
///
/// The peripheral can only be used inside a shift state: it cannot change
/// TMS, which is held low for the whole transfer.
#[cfg_attr(test, mockall::automock)]
pub trait ByteShifter {
    /// If the peripheral exists on this board.
    fn available(&self) -> bool {
        true
    }

    /// Quirks that the scan engine has to compensate for.
    fn quirks(&self) -> Quirks {
        Quirks::empty()
    }

    /// Claim and configure the peripheral for JTAG use.
    ///
    /// The peripheral may be shared with other subsystems (e.g. a debug SPI
    /// channel or a UART bridge), which must not use it until [`release`].
    ///
    /// [`release`]: ByteShifter::release
    fn acquire(&mut self) {}

    /// Hand the peripheral back to its other users.
    fn release(&mut self) {}

    /// Route TDI, TCK and TDO to the peripheral.
    fn attach(&mut self);

    /// Route TDI, TCK and TDO back to GPIO.
    fn detach(&mut self);

    /// If the peripheral can accept another byte.
    fn tx_ready(&mut self) -> bool;

    /// Queue one byte for transmission.
    fn write(&mut self, byte: u8);

    /// If a received byte is waiting.
    fn rx_ready(&mut self) -> bool;

    /// Take the oldest received byte.
    fn read(&mut self) -> u8;
}

/// Per-board setup run when JTAG is started and stopped.
pub trait PlatformHooks {
    /// Runs after the pins were configured for JTAG.
    fn init(&mut self) {}

    /// Runs after the pins were released.
    fn deinit(&mut self) {}
}

impl PlatformHooks for () {}

/// Byte shifter for boards without a usable peripheral.
///
/// All scans go through the bit-banged path.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoShifter;

impl ByteShifter for NoShifter {
    fn available(&self) -> bool {
        false
    }

    fn attach(&mut self) {}

    fn detach(&mut self) {}

    fn tx_ready(&mut self) -> bool {
        false
    }

    fn write(&mut self, _byte: u8) {}

    fn rx_ready(&mut self) -> bool {
        false
    }

    fn read(&mut self) -> u8 {
        0
    }
}
