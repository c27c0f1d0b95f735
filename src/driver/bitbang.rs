//! Bitbanging (GPIO-driven) JTAG transport.

use embedded_hal::delay::DelayNs;

use super::{PlatformHooks, Transport};

/// A trait for a pin that can be used as an input or output.
pub trait InputOutputPin {
    /// Switch the pin to a driven output.
    fn set_as_output(&mut self);
    /// Set the output level.
    fn set_high(&mut self, high: bool);

    /// Switch the pin to a high impedance input, without pull resistors.
    fn set_as_input(&mut self);
    /// Read the pin level.
    fn is_high(&mut self) -> bool;
}

/// JTAG transport that toggles GPIO pins in software.
pub struct BitbangTransport<IO, D, H = ()>
where
    IO: InputOutputPin,
    D: DelayNs,
    H: PlatformHooks,
{
    tms: IO,
    tdi: IO,
    tck: IO,
    tdo: IO,
    delay: D,
    hooks: H,
    half_period_ns: u32,
}

impl<IO, D> BitbangTransport<IO, D>
where
    IO: InputOutputPin,
    D: DelayNs,
{
    /// Create a transport for a board without extra JTAG setup.
    ///
    /// `half_period_ns` is the time TCK spends low and high during one pulse.
    pub fn new(tms: IO, tdi: IO, tck: IO, tdo: IO, delay: D, half_period_ns: u32) -> Self {
        Self::with_hooks(tms, tdi, tck, tdo, delay, half_period_ns, ())
    }
}

impl<IO, D, H> BitbangTransport<IO, D, H>
where
    IO: InputOutputPin,
    D: DelayNs,
    H: PlatformHooks,
{
    /// Create a transport that runs board specific hooks on connect and disconnect.
    pub fn with_hooks(
        tms: IO,
        tdi: IO,
        tck: IO,
        tdo: IO,
        delay: D,
        half_period_ns: u32,
        hooks: H,
    ) -> Self {
        Self {
            tms,
            tdi,
            tck,
            tdo,
            delay,
            hooks,
            half_period_ns,
        }
    }

    /// Change the TCK half period used by later pulses.
    pub fn set_half_period(&mut self, half_period_ns: u32) {
        self.half_period_ns = half_period_ns;
    }

    #[inline(always)]
    fn wait(&mut self) {
        if self.half_period_ns != 0 {
            self.delay.delay_ns(self.half_period_ns);
        }
    }
}

impl<IO, D, H> Transport for BitbangTransport<IO, D, H>
where
    IO: InputOutputPin,
    D: DelayNs,
    H: PlatformHooks,
{
    fn connect(&mut self) {
        self.tck.set_high(false);

        self.tdo.set_as_input();
        self.tdi.set_as_output();
        self.tck.set_as_output();
        self.tms.set_as_output();

        self.hooks.init();
    }

    fn disconnect(&mut self) {
        self.tdo.set_as_input();
        self.tdi.set_as_input();
        self.tck.set_as_input();
        self.tms.set_as_input();

        self.hooks.deinit();
    }

    #[inline(always)]
    fn set_tms(&mut self, high: bool) {
        self.tms.set_high(high);
    }

    #[inline(always)]
    fn set_tdi(&mut self, high: bool) {
        self.tdi.set_high(high);
    }

    #[inline(always)]
    fn clock(&mut self) -> bool {
        self.tck.set_high(false);
        self.wait();
        let tdo = self.tdo.is_high();
        self.tck.set_high(true);
        self.wait();
        tdo
    }
}
