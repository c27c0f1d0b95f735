//! Simulated JTAG wiring for tests.
//!
//! [`SimWire`] implements both [`Transport`] and [`ByteShifter`] on shared
//! state, with TDO looped back to TDI. Every TCK edge, from either path, is
//! recorded in time order.

use std::{cell::RefCell, rc::Rc, vec::Vec};

use crate::driver::{ByteShifter, Quirks, Transport};

/// Line levels at one rising TCK edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub tms: bool,
    pub tdi: bool,
    pub via_shifter: bool,
}

#[derive(Default)]
struct Wire {
    edges: Vec<Edge>,
    tms: bool,
    tdi: bool,
    connected: bool,
    attached: bool,
    acquired: bool,
    msb_first: bool,
    hide_quirks: bool,
    stuck: bool,
    shifted_bytes: usize,
    rx: Option<u8>,
}

#[derive(Clone, Default)]
pub struct SimWire(Rc<RefCell<Wire>>);

impl SimWire {
    /// A wire whose TDO reads back TDI, with a LSB-first shifter.
    pub fn loopback() -> Self {
        Self::default()
    }

    /// Make the shifter MSB-first and report the matching quirk.
    pub fn with_msb_first_shifter(self) -> Self {
        self.0.borrow_mut().msb_first = true;
        self
    }

    /// Report no quirks even if the shifter needs them.
    pub fn hide_quirks(self) -> Self {
        self.0.borrow_mut().hide_quirks = true;
        self
    }

    /// A shifter that never signals ready.
    pub fn with_stuck_shifter(self) -> Self {
        self.0.borrow_mut().stuck = true;
        self
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.0.borrow().edges.clone()
    }

    pub fn tdi_levels(&self) -> Vec<bool> {
        self.0.borrow().edges.iter().map(|e| e.tdi).collect()
    }

    pub fn clear_edges(&self) {
        self.0.borrow_mut().edges.clear();
    }

    pub fn shifted_bytes(&self) -> usize {
        self.0.borrow().shifted_bytes
    }

    pub fn is_connected(&self) -> bool {
        self.0.borrow().connected
    }

    pub fn is_attached(&self) -> bool {
        self.0.borrow().attached
    }

    pub fn is_acquired(&self) -> bool {
        self.0.borrow().acquired
    }
}

impl Transport for SimWire {
    fn connect(&mut self) {
        self.0.borrow_mut().connected = true;
    }

    fn disconnect(&mut self) {
        self.0.borrow_mut().connected = false;
    }

    fn set_tms(&mut self, high: bool) {
        self.0.borrow_mut().tms = high;
    }

    fn set_tdi(&mut self, high: bool) {
        self.0.borrow_mut().tdi = high;
    }

    fn clock(&mut self) -> bool {
        let mut wire = self.0.borrow_mut();
        assert!(wire.connected, "clocked a disconnected chain");
        assert!(!wire.attached, "bit-banged while pins belong to the shifter");
        let edge = Edge {
            tms: wire.tms,
            tdi: wire.tdi,
            via_shifter: false,
        };
        wire.edges.push(edge);
        wire.tdi
    }
}

impl ByteShifter for SimWire {
    fn quirks(&self) -> Quirks {
        let wire = self.0.borrow();
        if wire.msb_first && !wire.hide_quirks {
            Quirks::FLIP_BITS_IN_WHOLE_BYTES
        } else {
            Quirks::empty()
        }
    }

    fn acquire(&mut self) {
        self.0.borrow_mut().acquired = true;
    }

    fn release(&mut self) {
        self.0.borrow_mut().acquired = false;
    }

    fn attach(&mut self) {
        self.0.borrow_mut().attached = true;
    }

    fn detach(&mut self) {
        self.0.borrow_mut().attached = false;
    }

    fn tx_ready(&mut self) -> bool {
        let wire = self.0.borrow();
        !wire.stuck && wire.rx.is_none()
    }

    fn write(&mut self, byte: u8) {
        let mut wire = self.0.borrow_mut();
        assert!(wire.attached, "wrote to the shifter without its pins");
        for i in 0..8 {
            let bit = if wire.msb_first { 7 - i } else { i };
            let edge = Edge {
                tms: wire.tms,
                tdi: (byte >> bit) & 1 != 0,
                via_shifter: true,
            };
            wire.edges.push(edge);
        }
        wire.shifted_bytes += 1;
        // Looped back bits arrive in the order they were sent.
        wire.rx = Some(byte);
    }

    fn rx_ready(&mut self) -> bool {
        let wire = self.0.borrow();
        !wire.stuck && wire.rx.is_some()
    }

    fn read(&mut self) -> u8 {
        self.0.borrow_mut().rx.take().unwrap_or(0)
    }
}
