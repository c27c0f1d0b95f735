use crate::{
    driver::{ByteShifter, Quirks, Transport},
    error::{Error, Result},
    jtag::TapController,
    scan::ScanEngine,
    tap::TapState,
};

mod command;
mod request;
mod response;
mod state;

pub use command::*;
pub use request::*;
pub use response::*;

use state::State;

/// Capacity of the out and in buffers, in bytes.
pub const BUFFER_SIZE: usize = 256;

/// Activity indicator control trait.
#[cfg_attr(test, mockall::automock)]
pub trait ActivityIndicator {
    /// React to a probe status change, usually by changing an LED pattern.
    fn react_to_probe_status(&mut self, status: ProbeStatus);
}

/// Runtime configuration of the probe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// How often the byte shifter's ready flags are polled per byte before a
    /// scan fails with [`Error::HardwareTimeout`].
    pub ready_spin_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ready_spin_limit: 100_000,
        }
    }
}

/// JTAG probe request handler.
pub struct Probe<'a, T, S, I> {
    state: State<T, S>,
    out_buffer: [u8; BUFFER_SIZE],
    in_buffer: [u8; BUFFER_SIZE],
    reply: [u8; 8],
    indicator: I,
    id_string: &'a str,
}

impl<'a, T, S, I> Probe<'a, T, S, I>
where
    T: Transport,
    S: ByteShifter,
    I: ActivityIndicator,
{
    /// Create a probe handler. The chain is not driven until [`start`](Self::start).
    pub fn new(transport: T, shifter: S, indicator: I, config: Config, id_string: &'a str) -> Self {
        Probe {
            state: State::new(
                TapController::new(transport),
                ScanEngine::new(shifter, config.ready_spin_limit),
            ),
            out_buffer: [0; BUFFER_SIZE],
            in_buffer: [0; BUFFER_SIZE],
            reply: [0; 8],
            indicator,
            id_string,
        }
    }

    /// Process a vendor request with a host-to-device data stage.
    pub fn control_out(&mut self, req: &Request, data: &[u8]) -> Result<()> {
        trace!("Probe request: {:?}", req);

        let result = match req.command {
            Command::JTAG_Start => {
                self.start();
                Ok(())
            }
            Command::JTAG_Stop => {
                self.stop();
                Ok(())
            }
            Command::JTAG_ClearOutBuffer => {
                self.clear_out_buffer();
                Ok(())
            }
            Command::JTAG_SetOutBuffer => self.set_out_buffer(data),
            Command::JTAG_Scan => self.scan(req.value as usize, req.index != 0),
            Command::JTAG_RunClock => self.run_clock(req.value as usize, req.index != 0),
            Command::JTAG_GotoState => {
                TapState::from_wire(req.value).and_then(|target| self.goto_state(target))
            }
            command => Err(Error::UnknownRequest(command.into())),
        };

        if let Err(e) = result {
            warn!("{:?} rejected: {:?}", req.command, e);
        }
        result
    }

    /// Process a vendor request with a device-to-host data stage.
    ///
    /// Returns the reply, at most `req.length` bytes long.
    pub fn control_in(&mut self, req: &Request) -> Result<&[u8]> {
        trace!("Probe request: {:?}", req);

        let requested = req.length as usize;
        let data: &[u8] = match req.command {
            Command::DEVICE_GetId => self.id_string.as_bytes(),
            Command::JTAG_GetInBuffer => self.in_buffer(requested),
            Command::JTAG_GetState => {
                self.reply[0] = self.state() as u8;
                &self.reply[..1]
            }
            Command::JTAG_GetInfo => {
                let quirks = self.quirks();
                let mut resp = ResponseWriter::new(&mut self.reply);
                resp.write_u32(BUFFER_SIZE as u32);
                resp.write_u32(quirks.bits());
                resp.written()
            }
            command => {
                warn!("{:?} rejected: not an IN request", command);
                return Err(Error::UnknownRequest(command.into()));
            }
        };

        Ok(&data[..data.len().min(requested)])
    }

    /// Start driving the chain and claim the byte shifter.
    ///
    /// Starting again while started re-runs the pin setup.
    pub fn start(&mut self) {
        debug!("JTAG start");
        self.indicator
            .react_to_probe_status(ProbeStatus::JtagConnected);
        self.state.to_jtag();
    }

    /// Release the chain and the byte shifter.
    pub fn stop(&mut self) {
        debug!("JTAG stop");
        self.indicator.react_to_probe_status(ProbeStatus::Idle);
        self.state.to_idle();
    }

    /// If a JTAG session is active.
    pub fn is_started(&self) -> bool {
        self.state.is_active()
    }

    /// Zero the out buffer.
    pub fn clear_out_buffer(&mut self) {
        self.out_buffer.fill(0);
    }

    /// Copy `data` to the start of the out buffer.
    ///
    /// Bytes past `data.len()` keep their previous value.
    pub fn set_out_buffer(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > BUFFER_SIZE {
            return Err(Error::BufferOverflow {
                requested: data.len(),
                capacity: BUFFER_SIZE,
            });
        }

        self.out_buffer[..data.len()].copy_from_slice(data);
        Ok(())
    }

    /// The first `len` bytes of the in buffer, truncated to its capacity.
    pub fn in_buffer(&self, len: usize) -> &[u8] {
        &self.in_buffer[..len.min(BUFFER_SIZE)]
    }

    /// Scan `bits` bits from the out buffer into the in buffer.
    pub fn scan(&mut self, bits: usize, advance: bool) -> Result<()> {
        let session = self.state.session()?;
        session.engine.scan(
            &mut session.tap,
            &self.out_buffer,
            &mut self.in_buffer,
            bits,
            advance,
        )
    }

    /// Pulse TCK `cycles` times with TMS held at `tms`.
    pub fn run_clock(&mut self, cycles: usize, tms: bool) -> Result<()> {
        self.state.session()?.tap.run_clock(cycles, tms);
        Ok(())
    }

    /// Walk the TAP to `target`.
    pub fn goto_state(&mut self, target: TapState) -> Result<()> {
        self.state.session()?.tap.goto_state(target);
        Ok(())
    }

    /// The tracked TAP state, frozen while stopped.
    pub fn state(&self) -> TapState {
        self.state.tap_state()
    }

    /// Quirks of the attached byte shifter.
    pub fn quirks(&self) -> Quirks {
        self.state.engine().quirks()
    }
}
