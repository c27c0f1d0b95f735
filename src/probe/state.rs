use crate::{
    driver::{ByteShifter, Transport},
    error::{Error, Result},
    jtag::TapController,
    scan::ScanEngine,
    tap::TapState,
};

/// The JTAG hardware while the chain is not driven.
pub struct Port<T, S> {
    pub tap: TapController<T>,
    pub engine: ScanEngine<S>,
}

/// The JTAG hardware while a host session is active.
pub struct Session<T, S> {
    pub tap: TapController<T>,
    pub engine: ScanEngine<S>,
}

impl<T: Transport, S: ByteShifter> From<Port<T, S>> for Session<T, S> {
    fn from(mut port: Port<T, S>) -> Self {
        port.tap.init();
        port.engine.shifter().acquire();

        Session {
            tap: port.tap,
            engine: port.engine,
        }
    }
}

impl<T: Transport, S: ByteShifter> From<Session<T, S>> for Port<T, S> {
    fn from(mut session: Session<T, S>) -> Self {
        // Pins go back to GPIO before they are floated.
        session.engine.shifter().detach();
        session.engine.shifter().release();
        session.tap.deinit();

        Port {
            tap: session.tap,
            engine: session.engine,
        }
    }
}

/// State machine of the probe handler
pub enum State<T, S> {
    /// State that _should_ never happen.
    ///
    /// Assumption: No one tries to "somehow" catch a panic inside the
    /// `From::from` conversions.
    Invalid,
    /// JTAG stopped, pins floating
    Idle(Port<T, S>),
    /// JTAG started
    Jtag(Session<T, S>),
}

impl<T: Transport, S: ByteShifter> State<T, S> {
    /// Construct an instance of [`State`] object
    pub fn new(tap: TapController<T>, engine: ScanEngine<S>) -> Self {
        State::Idle(Port { tap, engine })
    }

    /// Transition to JTAG, starting to drive the chain.
    ///
    /// Starting again while started re-runs the pin setup and resets the
    /// tracked state.
    pub fn to_jtag(&mut self) {
        match self {
            State::Jtag(session) => session.tap.init(),
            state => state.replace_with(|s| match s {
                State::Idle(port) => State::Jtag(port.into()),
                State::Jtag(_) | State::Invalid => unreachable!(),
            }),
        }
    }

    /// Transition to idle, releasing the chain and the shared peripheral.
    pub fn to_idle(&mut self) {
        match self {
            State::Idle(_) => {}
            state => state.replace_with(|s| match s {
                State::Jtag(session) => State::Idle(session.into()),
                State::Idle(_) | State::Invalid => unreachable!(),
            }),
        }
    }

    /// The active session, if JTAG is started.
    pub fn session(&mut self) -> Result<&mut Session<T, S>> {
        match self {
            State::Jtag(session) => Ok(session),
            State::Idle(_) => Err(Error::NotStarted),
            State::Invalid => unreachable!(),
        }
    }

    /// If JTAG is started.
    pub fn is_active(&self) -> bool {
        matches!(self, State::Jtag(_))
    }

    /// The tracked TAP state, frozen while idle.
    pub fn tap_state(&self) -> TapState {
        match self {
            State::Idle(port) => port.tap.state(),
            State::Jtag(session) => session.tap.state(),
            State::Invalid => unreachable!(),
        }
    }

    /// The scan engine, in either mode.
    pub fn engine(&self) -> &ScanEngine<S> {
        match self {
            State::Idle(port) => &port.engine,
            State::Jtag(session) => &session.engine,
            State::Invalid => unreachable!(),
        }
    }

    #[inline(always)]
    fn replace_with<F: FnOnce(Self) -> Self>(&mut self, f: F) {
        replace_with::replace_with(self, || State::Invalid, f);
    }
}
