//! The driver proper: enumeration, bring-up, and the host-facing API.

use crate::debug;
use crate::delay::DelayMs;
use crate::host_controller::{
    DataPhase, HostController, UsbDevice, UsbError,
};
use crate::output;
use crate::pad::{
    PadDevice, PadModel, PadSlot, PadStatus, LED_PATTERNS, LINK_KEY,
    MAX_BUFFER_SIZE, MAX_PADS, RGB_PATTERNS, SONY_VID,
};
use crate::report::InputReport;
use crate::wire::{
    parse_descriptors, EndpointFinder, SetupPacket, CLASS_REQUEST,
    CONFIGURATION_DESCRIPTOR, DEVICE_TO_HOST, GET_DESCRIPTOR, HID_GET_REPORT,
    HID_SET_REPORT, HOST_TO_DEVICE, RECIPIENT_INTERFACE, REPORT_TYPE_FEATURE,
    REPORT_TYPE_OUTPUT, SET_CONFIGURATION,
};
use core::future::Future;
use futures::future::{self, Either};
use futures::pin_mut;

/// Upper bound on any single transfer wait; also the upper bound on one
/// `get_data` call.
const TRANSFER_TIMEOUT_MS: usize = 200;

// Request types for HID class requests to interface 0
const REQ_OUT: u8 = HOST_TO_DEVICE | CLASS_REQUEST | RECIPIENT_INTERFACE;
const REQ_IN: u8 = DEVICE_TO_HOST | CLASS_REQUEST | RECIPIENT_INTERFACE;

/// The DS3's "enable data reports" feature payload. Without this write
/// the pad enumerates but never produces an input report.
const DS3_ENABLE_REPORTS: [u8; 4] = [0x42, 0x0C, 0x00, 0x00];

/// Why a connect was refused.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "std", derive(Debug))]
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// No free enabled slot; the device stays unbound.
    AllSlotsBusy,
    /// Not a pad this driver speaks.
    UnsupportedDevice,
    /// The configuration lacked an interrupt endpoint in some direction.
    EndpointsMissing,
    /// A bring-up transfer failed.
    Usb(UsbError),
}

impl From<UsbError> for Error {
    fn from(e: UsbError) -> Self {
        Error::Usb(e)
    }
}

/// Up to [`MAX_PADS`] DualShock pads multiplexed over one host stack.
///
/// The host stack calls [`probe`](PadDriver::probe),
/// [`connect`](PadDriver::connect) and
/// [`disconnect`](PadDriver::disconnect) as devices come and go;
/// everything else is the host-facing API. Entry points taking a port
/// index treat an out-of-range port as a no-op.
pub struct PadDriver<HC: HostController, D: DelayMs> {
    hc: HC,
    delay: D,
    pads: [PadSlot; MAX_PADS],
}

impl<HC: HostController, D: DelayMs> PadDriver<HC, D> {
    /// All slots start enabled, as if loaded with the default mask;
    /// [`init`](PadDriver::init) narrows this.
    pub fn new(hc: HC, delay: D) -> Self {
        Self {
            hc,
            delay,
            pads: core::array::from_fn(|_| PadSlot::new()),
        }
    }

    /// Run one transfer with the bounded wait: the result is whichever
    /// of completion or the alarm comes first. No abort is issued on
    /// timeout; the dropped transfer is left to the host stack's own
    /// error handling.
    async fn submit<F>(&self, transfer: F) -> Result<usize, UsbError>
    where
        F: Future<Output = Result<usize, UsbError>>,
    {
        let timeout = self.delay.delay_ms(TRANSFER_TIMEOUT_MS);
        pin_mut!(transfer);
        pin_mut!(timeout);
        match future::select(transfer, timeout).await {
            Either::Left((rc, _)) => rc,
            Either::Right(((), _)) => Err(UsbError::Timeout),
        }
    }

    /// The host stack's probe callback: claim only Sony pads we speak.
    pub fn probe(&self, device: &UsbDevice) -> bool {
        device.vid == SONY_VID
            && PadModel::from_product_id(device.pid).is_some()
    }

    /// The host stack's connect callback. Claims a slot, discovers the
    /// interrupt endpoints, configures the device and brings the pad up
    /// to RUNNING. Returns the slot index it bound.
    pub async fn connect(&self, device: UsbDevice) -> Result<usize, Error> {
        let model = PadModel::from_product_id(device.pid)
            .ok_or(Error::UnsupportedDevice)?;

        let free = self.pads.iter().position(|p| {
            let state = p.state.borrow();
            state.enabled && state.dev.is_none()
        });
        let Some(slot) = free else {
            debug::println!("pad connect: no free slot");
            return Err(Error::AllSlotsBusy);
        };
        let pad = &self.pads[slot];

        // The slot is free, so this never contends; the poll just
        // drains any residual claim.
        let Some(_guard) = pad.pad_lock.try_acquire() else {
            return Err(Error::AllSlotsBusy);
        };

        {
            let mut state = pad.state.borrow_mut();
            state.dev = Some(PadDevice {
                address: device.address,
                packet_size_ep0: device.packet_size_ep0,
                model,
            });
            state.status = PadStatus::AUTHORIZED;
        }

        let mut descriptors = [0u8; 256];
        let rc = self
            .submit(self.hc.control_transfer(
                device.address,
                device.packet_size_ep0,
                SetupPacket {
                    bmRequestType: DEVICE_TO_HOST,
                    bRequest: GET_DESCRIPTOR,
                    wValue: (CONFIGURATION_DESCRIPTOR as u16) << 8,
                    wIndex: 0,
                    wLength: descriptors.len() as u16,
                },
                DataPhase::In(&mut descriptors),
            ))
            .await;
        let sz = match rc {
            Ok(sz) => sz,
            Err(e) => {
                self.release_slot(slot);
                return Err(e.into());
            }
        };

        let mut finder = EndpointFinder::default();
        parse_descriptors(&descriptors[..sz.min(descriptors.len())], &mut finder);

        let endpoints = finder.interrupt_in().zip(finder.interrupt_out());
        let Some((interrupt_in, interrupt_out)) = endpoints else {
            self.release_slot(slot);
            return Err(Error::EndpointsMissing);
        };
        let Some(configuration_value) = finder.configuration_value() else {
            self.release_slot(slot);
            return Err(Error::Usb(UsbError::ProtocolError));
        };

        {
            let mut state = pad.state.borrow_mut();
            state.interrupt_in = Some(interrupt_in);
            state.interrupt_out = Some(interrupt_out);
            state.status |= PadStatus::CONNECTED;
        }

        let rc = self
            .submit(self.hc.control_transfer(
                device.address,
                device.packet_size_ep0,
                SetupPacket {
                    bmRequestType: HOST_TO_DEVICE,
                    bRequest: SET_CONFIGURATION,
                    wValue: configuration_value as u16,
                    wIndex: 0,
                    wLength: 0,
                },
                DataPhase::None,
            ))
            .await;
        if let Err(e) = rc {
            self.release_slot(slot);
            return Err(e.into());
        }

        self.configure_pad(slot, model, device).await;

        Ok(slot)
    }

    /// Configuration is set; run the per-model bring-up and mark the
    /// pad running. The two sleeps cover the pads' internal state
    /// changes after the magic write and the first output report.
    async fn configure_pad(
        &self,
        slot: usize,
        model: PadModel,
        device: UsbDevice,
    ) {
        self.pads[slot].state.borrow_mut().status |= PadStatus::CONFIGURED;

        let led = match model {
            PadModel::Ds3 => {
                let rc = self
                    .submit(self.hc.control_transfer(
                        device.address,
                        device.packet_size_ep0,
                        SetupPacket {
                            bmRequestType: REQ_OUT,
                            bRequest: HID_SET_REPORT,
                            wValue: (REPORT_TYPE_FEATURE as u16) << 8 | 0xF4,
                            wIndex: 0,
                            wLength: DS3_ENABLE_REPORTS.len() as u16,
                        },
                        DataPhase::Out(&DS3_ENABLE_REPORTS),
                    ))
                    .await;
                if rc.is_err() {
                    debug::println!("ds3 enable-reports write failed");
                }
                self.delay.delay_ms(10).await;
                [LED_PATTERNS[slot], 0, 0, 0]
            }
            PadModel::Ds4 => {
                let [r, g, b] = RGB_PATTERNS[slot];
                [r, g, b, 0]
            }
        };

        let _ = self.send_output(slot, led, 0, 0).await;
        self.delay.delay_ms(20).await;

        self.pads[slot].state.borrow_mut().status |= PadStatus::RUNNING;
    }

    /// The host stack's disconnect callback, keyed by device address.
    /// Safe to call for devices that were never bound, or for a slot
    /// already released.
    pub fn disconnect(&self, address: u8) {
        for pad in &self.pads {
            let mut state = pad.state.borrow_mut();
            if state.dev.map(|d| d.address) == Some(address) {
                state.release();
            }
        }
    }

    fn release_slot(&self, slot: usize) {
        self.pads[slot].state.borrow_mut().release();
    }

    /// Set each slot's enable bit from the mask.
    pub fn init(&self, enable_mask: u8) {
        for (slot, pad) in self.pads.iter().enumerate() {
            pad.state.borrow_mut().enabled = (enable_mask >> slot) & 1 != 0;
        }
    }

    /// Release every slot, as if each pad were unplugged.
    pub fn reset(&self) {
        for pad in &self.pads {
            pad.state.borrow_mut().release();
        }
    }

    /// The slot's enumeration status bits.
    pub fn get_status(&self, port: usize) -> u8 {
        match self.pads.get(port) {
            Some(pad) => pad.state.borrow().status.bits(),
            None => 0,
        }
    }

    /// Poll the pad once and copy the freshest unified vector into
    /// `dst`. A failed or timed-out poll leaves the previous vector in
    /// place; at most `dst.len()` bytes are written either way.
    pub async fn get_data(&self, dst: &mut [u8], port: usize) {
        let Some(pad) = self.pads.get(port) else { return };

        let _guard = pad.pad_lock.acquire().await;

        let target = {
            let state = pad.state.borrow();
            state.dev.and_then(|d| state.interrupt_in.map(|ep| (d, ep)))
        };

        if let Some((dev, ep)) = target {
            let mut buf = [0u8; MAX_BUFFER_SIZE];
            let rc = self
                .submit(self.hc.interrupt_in_transfer(
                    dev.address,
                    ep.number,
                    ep.max_packet_size,
                    &mut buf,
                ))
                .await;

            let mut state = pad.state.borrow_mut();
            // The pad may have been unplugged while we waited
            if state.dev.map(|d| d.address) == Some(dev.address) {
                state.last_result = rc;
                if let Ok(n) = state.last_result {
                    let raw = &buf[..n.min(buf.len())];
                    if let Some(report) = InputReport::parse(dev.model, raw) {
                        state.data = report.unified();
                        state.old_led = report.led_state(port);
                    }
                }
            }
        }

        let state = pad.state.borrow();
        let n = dst.len().min(state.data.len());
        dst[..n].copy_from_slice(&state.data[..n]);
    }

    /// Command new rumble magnitudes, keeping the current light state.
    pub async fn set_rumble(&self, lrum: u8, rrum: u8, port: usize) {
        let Some(pad) = self.pads.get(port) else { return };
        let _guard = pad.cmd_lock.acquire().await;

        // While a bdaddr exchange is due, skip the command so the pad
        // only has one control conversation to answer
        if !pad.state.borrow().update_rum {
            return;
        }
        let led = pad.state.borrow().old_led;
        if self.send_output(port, led, lrum, rrum).await.is_err() {
            debug::println!("rumble command failed");
        }
    }

    /// Command a new light state, keeping the current rumble. For the
    /// DS3 only `led[0]` (the player-LED mask) and `led[3]` (blink)
    /// matter; the DS4 takes all four bytes as RGB + blink.
    pub async fn set_led(&self, led: [u8; 4], port: usize) {
        let Some(pad) = self.pads.get(port) else { return };
        let _guard = pad.cmd_lock.acquire().await;

        if !pad.state.borrow().update_rum {
            return;
        }
        let (lrum, rrum) = {
            let state = pad.state.borrow();
            (state.lrum, state.rrum)
        };
        if self.send_output(port, led, lrum, rrum).await.is_err() {
            debug::println!("led command failed");
        }
    }

    /// Build and send one LED/rumble command, then remember what was
    /// commanded. The shadows update even if the transfer fails or
    /// times out: the command is still the intended state.
    async fn send_output(
        &self,
        slot: usize,
        led: [u8; 4],
        lrum: u8,
        rrum: u8,
    ) -> Result<usize, UsbError> {
        let target = {
            let state = self.pads[slot].state.borrow();
            state.dev.map(|dev| (dev, state.interrupt_out))
        };
        let Some((dev, out_ep)) = target else {
            return Ok(0);
        };

        let rc = match dev.model {
            PadModel::Ds3 => {
                let report = output::ds3_output_report(&led, lrum, rrum);
                self.submit(self.hc.control_transfer(
                    dev.address,
                    dev.packet_size_ep0,
                    SetupPacket {
                        bmRequestType: REQ_OUT,
                        bRequest: HID_SET_REPORT,
                        wValue: (REPORT_TYPE_OUTPUT as u16) << 8 | 0x01,
                        wIndex: 0,
                        wLength: report.len() as u16,
                    },
                    DataPhase::Out(&report),
                ))
                .await
            }
            PadModel::Ds4 => {
                let Some(ep) = out_ep else {
                    return Ok(0);
                };
                let report = output::ds4_output_report(&led, lrum, rrum);
                self.submit(self.hc.interrupt_out_transfer(
                    dev.address,
                    ep.number,
                    ep.max_packet_size,
                    &report,
                ))
                .await
            }
        };

        let mut state = self.pads[slot].state.borrow_mut();
        if state.dev.map(|d| d.address) == Some(dev.address) {
            state.old_led = led;
            state.lrum = lrum;
            state.rrum = rrum;
        }

        rc
    }

    /// Read the pad's Bluetooth address, least significant byte first.
    ///
    /// The first call after init or connect consumes the `update_rum`
    /// latch and reports failure without touching the bus: the host
    /// asks for the address immediately, but a freshly configured pad
    /// may not be ready to answer a second control conversation. Every
    /// later call performs the feature read and re-arms the latch.
    pub async fn get_bdaddr(&self, out: &mut [u8; 6], port: usize) -> bool {
        let Some(pad) = self.pads.get(port) else { return false };

        {
            let mut state = pad.state.borrow_mut();
            if state.update_rum {
                state.update_rum = false;
                return false;
            }
        }

        let _guard = pad.cmd_lock.acquire().await;

        let dev = pad.state.borrow().dev;
        let ok = if let Some(dev) = dev {
            let report_id: u8 = match dev.model {
                PadModel::Ds3 => 0xF5,
                PadModel::Ds4 => 0x09,
            };

            let mut buf = [0u8; 8];
            let rc = self
                .submit(self.hc.control_transfer(
                    dev.address,
                    dev.packet_size_ep0,
                    SetupPacket {
                        bmRequestType: REQ_IN,
                        bRequest: HID_GET_REPORT,
                        wValue: (REPORT_TYPE_FEATURE as u16) << 8
                            | report_id as u16,
                        wIndex: 0,
                        wLength: buf.len() as u16,
                    },
                    DataPhase::In(&mut buf),
                ))
                .await;

            if rc.is_ok() {
                // The pad answers most-significant byte first
                for i in 0..6 {
                    out[5 - i] = buf[2 + i];
                }
            }
            rc.is_ok()
        } else {
            false
        };

        pad.state.borrow_mut().update_rum = true;
        ok
    }

    /// Write the address the pad should pair with. The DS4 additionally
    /// needs the fixed link key before it will accept the host.
    pub async fn set_bdaddr(&self, bdaddr: &[u8; 6], port: usize) {
        let Some(pad) = self.pads.get(port) else { return };
        let _guard = pad.cmd_lock.acquire().await;

        let dev = pad.state.borrow().dev;
        let Some(dev) = dev else { return };

        let rc = match dev.model {
            PadModel::Ds3 => {
                let mut buf = [0u8; 8];
                buf[0] = 0x01;
                for i in 0..6 {
                    buf[2 + i] = bdaddr[5 - i];
                }
                self.submit(self.hc.control_transfer(
                    dev.address,
                    dev.packet_size_ep0,
                    SetupPacket {
                        bmRequestType: REQ_OUT,
                        bRequest: HID_SET_REPORT,
                        wValue: (REPORT_TYPE_FEATURE as u16) << 8 | 0xF5,
                        wIndex: 0,
                        wLength: buf.len() as u16,
                    },
                    DataPhase::Out(&buf),
                ))
                .await
            }
            PadModel::Ds4 => {
                let mut buf = [0u8; 24];
                buf[0] = 0x13;
                buf[1..7].copy_from_slice(bdaddr);
                buf[7..23].copy_from_slice(&LINK_KEY);
                self.submit(self.hc.control_transfer(
                    dev.address,
                    dev.packet_size_ep0,
                    SetupPacket {
                        bmRequestType: REQ_OUT,
                        bRequest: HID_SET_REPORT,
                        wValue: (REPORT_TYPE_FEATURE as u16) << 8 | 0x13,
                        wIndex: 0,
                        wLength: buf.len() as u16,
                    },
                    DataPhase::Out(&buf),
                ))
                .await
            }
        };

        if rc.is_err() {
            debug::println!("bdaddr write failed");
        }
    }
}

#[cfg(all(test, feature = "std"))]
#[path = "tests/driver.rs"]
mod tests;
