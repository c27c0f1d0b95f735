use usb_device::{
    class_prelude::*,
    control::{self, Recipient, RequestType},
};

use crate::{
    driver::{ByteShifter, Transport},
    probe::{ActivityIndicator, Probe, Request},
};

/// USB class that serves the probe's vendor requests on the control endpoint.
///
/// The class claims no interfaces or endpoints; it only answers vendor
/// requests addressed to the device. Every request the probe rejects is
/// stalled.
pub struct JtagClass<'a, T, S, I> {
    probe: Probe<'a, T, S, I>,
}

impl<'a, T, S, I> JtagClass<'a, T, S, I>
where
    T: Transport,
    S: ByteShifter,
    I: ActivityIndicator,
{
    /// Wrap a probe handler.
    pub fn new(probe: Probe<'a, T, S, I>) -> Self {
        JtagClass { probe }
    }

    /// Access the probe handler.
    pub fn probe(&mut self) -> &mut Probe<'a, T, S, I> {
        &mut self.probe
    }
}

fn is_probe_request(req: &control::Request) -> bool {
    req.request_type == RequestType::Vendor && req.recipient == Recipient::Device
}

impl<B, T, S, I> UsbClass<B> for JtagClass<'_, T, S, I>
where
    B: UsbBus,
    T: Transport,
    S: ByteShifter,
    I: ActivityIndicator,
{
    fn control_in(&mut self, xfer: ControlIn<B>) {
        let setup = *xfer.request();
        if !is_probe_request(&setup) {
            return;
        }

        let result = match Request::try_from(&setup).and_then(|req| self.probe.control_in(&req)) {
            Ok(data) => xfer.accept_with(data),
            Err(_) => xfer.reject(),
        };
        if result.is_err() {
            warn!("control IN transfer {} failed", setup.request);
        }
    }

    fn control_out(&mut self, xfer: ControlOut<B>) {
        let setup = *xfer.request();
        if !is_probe_request(&setup) {
            return;
        }

        let outcome =
            Request::try_from(&setup).and_then(|req| self.probe.control_out(&req, xfer.data()));
        let result = match outcome {
            Ok(()) => xfer.accept(),
            Err(_) => xfer.reject(),
        };
        if result.is_err() {
            warn!("control OUT transfer {} failed", setup.request);
        }
    }
}
