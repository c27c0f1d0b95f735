//! Bidirectional scans through the TAP's selected shift register.
//!
//! A scan is split between two paths. Whole bytes go through the board's
//! byte-serial peripheral, which is fast but can only clock with TMS low.
//! Everything else, including the bit that has to leave the shift state,
//! is bit-banged.

use crate::{
    driver::{ByteShifter, Quirks, Transport},
    error::{Error, Result},
    jtag::TapController,
};

/// How a scan request is divided between the two paths.
///
/// The fast part always comes first, and only the slow tail may end with
/// TMS high.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanPlan {
    /// Whole bytes sent through the byte-serial peripheral.
    pub fast_bytes: usize,
    /// Bits bit-banged after the fast bytes.
    pub slow_bits: usize,
    /// If the last slow bit is sent with TMS high.
    pub slow_advances: bool,
}

impl ScanPlan {
    /// Plan a scan of `bits` bits.
    ///
    /// With `advance` set, the final bit has to move the TAP out of its
    /// shift state. If the scan is byte aligned, the last whole byte is
    /// moved to the slow path so that TMS can rise on its last bit.
    pub fn new(bits: usize, advance: bool, fast_path: bool) -> Self {
        let (mut fast_bytes, mut slow_bits) = if fast_path {
            (bits / 8, bits % 8)
        } else {
            (0, bits)
        };

        if advance && slow_bits == 0 && fast_bytes > 0 {
            fast_bytes -= 1;
            slow_bits = 8;
        }

        Self {
            fast_bytes,
            slow_bits,
            slow_advances: advance && slow_bits > 0,
        }
    }

    /// Number of bits covered by the plan.
    pub fn total_bits(&self) -> usize {
        self.fast_bytes * 8 + self.slow_bits
    }
}

/// Scan engine owning the byte-serial peripheral.
pub struct ScanEngine<S> {
    shifter: S,
    ready_spin_limit: u32,
}

impl<S: ByteShifter> ScanEngine<S> {
    /// `ready_spin_limit` bounds how often the peripheral's ready flags are
    /// polled for a single byte before the scan fails with
    /// [`Error::HardwareTimeout`].
    pub fn new(shifter: S, ready_spin_limit: u32) -> Self {
        Self {
            shifter,
            ready_spin_limit,
        }
    }

    /// Direct access to the byte-serial peripheral.
    pub fn shifter(&mut self) -> &mut S {
        &mut self.shifter
    }

    /// Quirks of the byte-serial peripheral.
    pub fn quirks(&self) -> Quirks {
        self.shifter.quirks()
    }

    /// Shift `bits` bits of `tdi` into the chain while capturing TDO into
    /// `tdo`, bit 0 of every byte first.
    ///
    /// With `advance` set the last bit is clocked with TMS high. A final
    /// partial byte of `tdo` is right-justified, its unused high bits are
    /// zero.
    pub fn scan<T: Transport>(
        &mut self,
        tap: &mut TapController<T>,
        tdi: &[u8],
        tdo: &mut [u8],
        bits: usize,
        advance: bool,
    ) -> Result<()> {
        if bits == 0 {
            return Err(Error::EmptyScan);
        }
        if bits.div_ceil(8) > tdi.len().min(tdo.len()) {
            return Err(Error::ScanTooLong { bits });
        }

        let plan = ScanPlan::new(bits, advance, self.shifter.available());
        trace!("scan({}, {}) -> {:?}", bits, advance, plan);

        // The peripheral cannot drive TMS, so it has to be low before the
        // first byte goes out.
        tap.transport().set_tms(false);

        let split = plan.fast_bytes;
        if split > 0 {
            self.shifter.attach();
            let (sent, result) = self.shift_bytes(&tdi[..split], &mut tdo[..split]);
            self.shifter.detach();
            tap.advance(false, sent * 8);
            if let Err(e) = result {
                warn!("byte shifter timed out after {} bytes", sent);
                return Err(e);
            }
        }

        if plan.slow_bits > 0 {
            shift_bits(
                tap,
                &tdi[split..],
                &mut tdo[split..],
                plan.slow_bits,
                plan.slow_advances,
            );
        }

        Ok(())
    }

    /// Exchange whole bytes through the peripheral.
    ///
    /// Returns how many bytes were clocked out, together with the result.
    fn shift_bytes(&mut self, tdi: &[u8], tdo: &mut [u8]) -> (usize, Result<()>) {
        let flip = self
            .shifter
            .quirks()
            .contains(Quirks::FLIP_BITS_IN_WHOLE_BYTES);
        let limit = self.ready_spin_limit;

        for (sent, (&out, captured)) in tdi.iter().zip(tdo.iter_mut()).enumerate() {
            let out = if flip { out.reverse_bits() } else { out };

            if let Err(e) = wait_until(limit, || self.shifter.tx_ready()) {
                return (sent, Err(e));
            }
            self.shifter.write(out);

            if let Err(e) = wait_until(limit, || self.shifter.rx_ready()) {
                return (sent + 1, Err(e));
            }
            let received = self.shifter.read();
            *captured = if flip {
                received.reverse_bits()
            } else {
                received
            };
        }

        (tdi.len(), Ok(()))
    }
}

/// Poll `ready` up to `limit` times.
fn wait_until(limit: u32, mut ready: impl FnMut() -> bool) -> Result<()> {
    for _ in 0..limit.max(1) {
        if ready() {
            return Ok(());
        }
    }
    Err(Error::HardwareTimeout)
}

/// Bit-bang `bits` bits, LSB of each byte first.
fn shift_bits<T: Transport>(
    tap: &mut TapController<T>,
    tdi: &[u8],
    tdo: &mut [u8],
    bits: usize,
    advance: bool,
) {
    let mut remaining = bits;

    for (&out, captured) in tdi.iter().zip(tdo.iter_mut()) {
        if remaining == 0 {
            break;
        }
        let count = remaining.min(8);

        let mut out = out;
        let mut byte = 0u8;
        for _ in 0..count {
            remaining -= 1;
            let exit = advance && remaining == 0;
            if exit {
                tap.transport().set_tms(true);
            }

            tap.transport().set_tdi(out & 1 != 0);
            out >>= 1;

            let bit = tap.transport().clock();
            byte = (byte >> 1) | ((bit as u8) << 7);
            tap.acknowledge(exit);
        }

        // Bits arrive at the top of the byte; move a partial byte down.
        *captured = byte >> (8 - count);
    }
}
