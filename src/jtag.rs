use crate::{driver::Transport, tap::TapState};

/// Number of TMS-high clocks that reset a TAP from any state.
pub const RESET_CLOCKS: usize = 5;

/// Drives the TAP state machine and tracks the state it is in.
///
/// The tracked state matches the physical TAP as long as every TCK pulse the
/// chain sees is issued through this controller.
pub struct TapController<T> {
    transport: T,
    state: TapState,
}

impl<T: Transport> TapController<T> {
    /// Wrap a transport. The chain is not driven until [`init`](Self::init).
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: TapState::TestLogicReset,
        }
    }

    /// Start driving the chain.
    ///
    /// Assumes the TAP is in Test-Logic-Reset; hosts normally follow up with
    /// `goto_state(TestLogicReset)` to make sure it is.
    pub fn init(&mut self) {
        self.transport.connect();
        self.state = TapState::TestLogicReset;
    }

    /// Stop driving the chain. The tracked state is kept as it was.
    pub fn deinit(&mut self) {
        self.transport.disconnect();
    }

    /// The tracked TAP state.
    pub fn state(&self) -> TapState {
        self.state
    }

    /// Direct access to the transport.
    pub fn transport(&mut self) -> &mut T {
        &mut self.transport
    }

    /// One TCK pulse with the given TMS level.
    pub fn step(&mut self, tms: bool) {
        self.transport.set_tms(tms);
        self.transport.clock();
        self.state = self.state.next(tms);
    }

    /// Walk the state machine to `target`.
    pub fn goto_state(&mut self, target: TapState) {
        debug!("goto_state({:?} -> {:?})", self.state, target);

        if target == TapState::TestLogicReset {
            // Works from any state, even if tracking was lost.
            for _ in 0..RESET_CLOCKS {
                self.step(true);
            }
        } else {
            while self.state != target {
                self.step(self.state.tms_toward(target));
            }
        }
    }

    /// Pulse TCK `cycles` times with TMS held at `tms`, then leave TMS low.
    pub fn run_clock(&mut self, cycles: usize, tms: bool) {
        self.transport.set_tms(tms);
        for _ in 0..cycles {
            self.transport.clock();
        }
        self.transport.set_tms(false);
        self.advance(tms, cycles);
    }

    /// Account for `clocks` TCK pulses issued with a constant TMS level.
    ///
    /// A run of identical TMS values ends in a self-loop state after at most
    /// five clocks, so the table is consulted at most `COUNT` times.
    pub(crate) fn advance(&mut self, tms: bool, clocks: usize) {
        for _ in 0..clocks.min(TapState::COUNT) {
            self.state = self.state.next(tms);
        }
    }

    /// Account for a single TCK pulse issued by the caller.
    #[inline(always)]
    pub(crate) fn acknowledge(&mut self, tms: bool) {
        self.state = self.state.next(tms);
    }
}
